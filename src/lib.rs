//! hyodo library
//!
//! Repayment ledger core: the entry model and derived totals, a local
//! key/value cache, and full-overwrite synchronization with a hosted
//! auth + table backend.

pub mod account;
pub mod app;
pub mod config;
pub mod error;
pub mod ledger;
pub mod remote;
pub mod store;
pub mod sync;

pub use app::Hyodo;
pub use error::{Error, Result};
