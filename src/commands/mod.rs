//! CLI commands

pub mod account;
pub mod entries;
pub mod history;
pub mod status;
pub mod sync;
pub mod utils;
