//! Derived totals
//!
//! The effective total is the target amount plus every spend entry, i.e. the
//! current balance basis the repayments are measured against.

use super::model::{EntryType, LedgerData};

/// Sum of repayment entries (entries without a type count as repayments)
pub fn paid_total(data: &LedgerData) -> i64 {
    sum_of(data, EntryType::Repayment)
}

/// Sum of spend entries
pub fn spend_total(data: &LedgerData) -> i64 {
    sum_of(data, EntryType::Spend)
}

/// Target amount plus all spends
pub fn effective_total(data: &LedgerData) -> i64 {
    data.total_amount.saturating_add(spend_total(data))
}

/// Amount still owed; negative when overpaid
pub fn remaining(data: &LedgerData) -> i64 {
    effective_total(data).saturating_sub(paid_total(data))
}

/// Repayment progress in percent, 0..=100
pub fn progress_percent(data: &LedgerData) -> f64 {
    let effective = effective_total(data);
    if effective <= 0 {
        return 0.0;
    }
    (paid_total(data) as f64 / effective as f64 * 100.0).clamp(0.0, 100.0)
}

/// Sums in i128 and clamps, so huge amounts saturate instead of overflowing
fn sum_of(data: &LedgerData, kind: EntryType) -> i64 {
    let sum: i128 = data
        .payments
        .iter()
        .filter(|p| p.kind() == kind)
        .map(|p| i128::from(p.amount))
        .sum();
    sum.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}
