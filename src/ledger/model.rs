//! Ledger data model
//!
//! The JSON shape matches the cached blob:
//! `{ "totalAmount": 0, "payments": [{ "id", "date", "amount", "memo", "type" }] }`

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Kind of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Money paid back
    Repayment,
    /// Money borrowed on top of the target amount
    Spend,
}

impl EntryType {
    /// Korean label used in listings
    pub fn label(self) -> &'static str {
        match self {
            Self::Repayment => "상환",
            Self::Spend => "추가 대출",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Repayment => "repayment",
            Self::Spend => "spend",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "repayment" => Ok(Self::Repayment),
            "spend" => Ok(Self::Spend),
            other => Err(format!("Unknown entry type: {} (use repayment or spend)", other)),
        }
    }
}

/// Read a JSON number as whole won; fractional values are rounded
pub fn number_to_amount(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.round() as i64))
}

/// Serde helper accepting both integral and float amounts
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    number_to_amount(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid amount: {}", value)))
}

/// [`deserialize_amount`] for nullable columns
pub fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => number_to_amount(&value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid amount: {}", value))),
    }
}

/// A single payment or spend entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEntry {
    /// Client-generated id (see [`super::format::generate_id`])
    pub id: String,

    /// `YYYY-MM-DD`, stored verbatim
    pub date: String,

    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: i64,

    #[serde(default)]
    pub memo: String,

    /// Absent means repayment
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<EntryType>,
}

impl PaymentEntry {
    /// The entry's kind, treating an absent type as repayment
    pub fn kind(&self) -> EntryType {
        self.entry_type.unwrap_or(EntryType::Repayment)
    }
}

/// Everything stored for one user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerData {
    /// Target repayment amount
    pub total_amount: i64,
    pub payments: Vec<PaymentEntry>,
}

impl LedgerData {
    /// Parse a cached blob, falling back to defaults for anything malformed.
    ///
    /// A non-object document yields the default data, a non-array `payments`
    /// becomes empty and a non-number `totalAmount` becomes 0. Entries that
    /// fail to parse are dropped.
    pub fn from_json_lossy(raw: &str) -> Self {
        let json: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Discarding malformed ledger data: {}", e);
                return Self::default();
            }
        };

        let total_amount = json
            .get("totalAmount")
            .and_then(number_to_amount)
            .unwrap_or(0);

        let payments = json
            .get("payments")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|p| match PaymentEntry::deserialize(p) {
                        Ok(entry) => Some(entry),
                        Err(e) => {
                            tracing::warn!("Dropping malformed entry {}: {}", p, e);
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            total_amount,
            payments,
        }
    }

    /// Find an entry by id
    pub fn find(&self, id: &str) -> Option<&PaymentEntry> {
        self.payments.iter().find(|p| p.id == id)
    }

    /// Find an entry by id for editing
    pub fn find_mut(&mut self, id: &str) -> Option<&mut PaymentEntry> {
        self.payments.iter_mut().find(|p| p.id == id)
    }

    /// Remove an entry by id, returning it if it existed
    pub fn remove(&mut self, id: &str) -> Option<PaymentEntry> {
        let index = self.payments.iter().position(|p| p.id == id)?;
        Some(self.payments.remove(index))
    }

    /// Entries ordered newest date first; ties keep insertion order reversed
    pub fn history(&self) -> Vec<&PaymentEntry> {
        let mut entries: Vec<&PaymentEntry> = self.payments.iter().rev().collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        entries
    }
}
