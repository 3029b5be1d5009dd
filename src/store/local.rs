//! Local cache
//!
//! A persistent key/value store in the layout editor state databases use:
//! one SQLite file with `ItemTable(key TEXT PRIMARY KEY, value TEXT)`.
//! Values are strings; ledger data is kept as a JSON blob per user key.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::ledger::LedgerData;

/// Prefix of the per-user data key
pub const STORAGE_KEY_PREFIX: &str = "hyodo_data_v2_";
/// Data key used while nobody is signed in
pub const TEMP_DATA_KEY: &str = "hyodo_temp_data";
/// Email of the last signed-in user
pub const LAST_USER_KEY: &str = "hyodo_last_user";
/// Local-only login history
pub const LOGIN_LOG_KEY: &str = "hyodo_login_log";
/// Persisted backend session
pub const SESSION_KEY: &str = "hyodo_session";

/// Data key for a user, or the temporary key when signed out
pub fn storage_key(user_email: Option<&str>) -> String {
    match user_email {
        Some(email) => format!("{}{}", STORAGE_KEY_PREFIX, email),
        None => TEMP_DATA_KEY.to_string(),
    }
}

/// One login-log record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginLogEntry {
    pub username: String,
    pub action: String,
    /// RFC 3339 timestamp
    pub time: String,
}

/// SQLite-backed key/value store
pub struct LocalStore {
    conn: Connection,
}

impl LocalStore {
    /// Open (creating if needed) the store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::init(conn)
    }

    /// Open a throw-away in-memory store
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS ItemTable (key TEXT PRIMARY KEY, value TEXT)",
            [],
        )?;
        Ok(Self { conn })
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM ItemTable WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO ItemTable (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM ItemTable WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Load ledger data for a key
    ///
    /// Missing or malformed content yields `{ totalAmount: 0, payments: [] }`;
    /// only a failing database read is an error.
    pub fn load_data(&self, key: &str) -> Result<LedgerData> {
        Ok(self
            .get(key)?
            .map(|raw| LedgerData::from_json_lossy(&raw))
            .unwrap_or_default())
    }

    /// Store ledger data under a key
    pub fn save_data(&self, key: &str, data: &LedgerData) -> Result<()> {
        let json = serde_json::to_string(data)?;
        self.set(key, &json)
    }

    /// Append to the local login log. Failures are ignored.
    pub fn add_login_log(&self, username: &str, action: &str) {
        let mut log = self.login_log();
        log.push(LoginLogEntry {
            username: username.to_string(),
            action: action.to_string(),
            time: Utc::now().to_rfc3339(),
        });
        let written = serde_json::to_string(&log)
            .map_err(crate::Error::from)
            .and_then(|json| self.set(LOGIN_LOG_KEY, &json));
        if let Err(e) = written {
            tracing::debug!("Login log not written: {}", e);
        }
    }

    /// Read the login log, oldest first. Unreadable logs read as empty.
    pub fn login_log(&self) -> Vec<LoginLogEntry> {
        self.get(LOGIN_LOG_KEY)
            .ok()
            .flatten()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{EntryType, PaymentEntry};
    use tempfile::TempDir;

    #[test]
    fn test_storage_key() {
        assert_eq!(storage_key(Some("a@b.com")), "hyodo_data_v2_a@b.com");
        assert_eq!(storage_key(None), "hyodo_temp_data");
    }

    #[test]
    fn test_get_set_remove() {
        let store = LocalStore::open_in_memory().unwrap();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));

        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_load_missing_is_default() {
        let store = LocalStore::open_in_memory().unwrap();
        assert_eq!(store.load_data("nobody").unwrap(), LedgerData::default());
    }

    #[test]
    fn test_load_malformed_is_default() {
        let store = LocalStore::open_in_memory().unwrap();
        store.set(TEMP_DATA_KEY, "{{{").unwrap();
        assert_eq!(store.load_data(TEMP_DATA_KEY).unwrap(), LedgerData::default());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hyodo.db");

        let data = LedgerData {
            total_amount: 3_000_000,
            payments: vec![
                PaymentEntry {
                    id: "lq2x9a1b2c".to_string(),
                    date: "2024-04-01".to_string(),
                    amount: 150_000,
                    memo: "4월 상환".to_string(),
                    entry_type: Some(EntryType::Repayment),
                },
                PaymentEntry {
                    id: "lq2x9b3d4e".to_string(),
                    date: "2024-04-10".to_string(),
                    amount: 20_000,
                    memo: String::new(),
                    entry_type: None,
                },
            ],
        };

        {
            let store = LocalStore::open(&path).unwrap();
            store.save_data("hyodo_data_v2_me@x.com", &data).unwrap();
        }

        let store = LocalStore::open(&path).unwrap();
        assert_eq!(store.load_data("hyodo_data_v2_me@x.com").unwrap(), data);
    }

    #[test]
    fn test_login_log_appends() {
        let store = LocalStore::open_in_memory().unwrap();
        assert!(store.login_log().is_empty());

        store.add_login_log("me@x.com", "login");
        store.add_login_log("me@x.com", "logout");

        let log = store.login_log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].action, "login");
        assert_eq!(log[1].action, "logout");
        assert!(chrono::DateTime::parse_from_rfc3339(&log[1].time).is_ok());
    }

    #[test]
    fn test_corrupt_login_log_reads_empty() {
        let store = LocalStore::open_in_memory().unwrap();
        store.set(LOGIN_LOG_KEY, "oops").unwrap();
        assert!(store.login_log().is_empty());
        store.add_login_log("u", "login");
        assert_eq!(store.login_log().len(), 1);
    }
}
