//! Persistent storage

pub mod local;

pub use local::{storage_key, LocalStore, LoginLogEntry};
