//! Ledger data and the pure helpers derived from it

pub mod format;
pub mod model;
pub mod totals;

pub use format::{format_money, generate_id};
pub use model::{EntryType, LedgerData, PaymentEntry};
pub use totals::{effective_total, paid_total, spend_total};
