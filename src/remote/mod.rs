//! Remote store accessor
//!
//! The hosted service (auth + `profiles`/`payments` tables) sits behind the
//! [`Backend`] trait. [`RestBackend`] talks to a Supabase-compatible HTTP API;
//! [`tables`] holds the full-overwrite pull/push built on top of it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

pub mod rest;
pub mod tables;

#[cfg(test)]
pub(crate) mod memory;

pub use rest::RestBackend;
pub use tables::{pull, push};

/// Seconds before expiry at which a session is treated as expired
const EXPIRY_MARGIN_SECS: i64 = 30;

/// A user as returned by the auth provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub user_metadata: Value,
}

impl AuthUser {
    pub fn nickname(&self) -> Option<&str> {
        self.user_metadata.get("nickname").and_then(|v| v.as_str())
    }

    /// Name used for the local cache key: the email, or the id without one
    pub fn display_name(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.id)
    }
}

/// An authenticated session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Unix seconds
    #[serde(default)]
    pub expires_at: Option<i64>,

    pub user: AuthUser,
}

impl Session {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at
            .map(|at| now + EXPIRY_MARGIN_SECS >= at)
            .unwrap_or(false)
    }
}

/// Result of a signup call. `session` is present when the provider does not
/// require email confirmation.
#[derive(Debug, Clone)]
pub struct SignUp {
    pub user: AuthUser,
    pub session: Option<Session>,
}

/// Attributes changed through the auth provider
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// User metadata, e.g. `{"nickname": "..."}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A `profiles` row; absent columns are left untouched by upserts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::ledger::model::deserialize_optional_amount"
    )]
    pub total_amount: Option<i64>,
}

/// A `payments` row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRow {
    pub id: String,
    pub user_id: String,
    pub date: String,

    /// `numeric` columns arrive as floats
    #[serde(deserialize_with = "crate::ledger::model::deserialize_amount")]
    pub amount: i64,

    #[serde(default)]
    pub memo: Option<String>,

    #[serde(rename = "type", default)]
    pub entry_type: Option<String>,
}

/// Operations the hosted service provides
///
/// Every table call is scoped by the caller's session; row-level security on
/// the service side is expected to enforce the same scoping.
pub trait Backend {
    /// Register a new account; `nickname` goes into user metadata
    fn sign_up(&self, email: &str, password: &str, nickname: Option<&str>) -> Result<SignUp>;

    /// Password login
    fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Exchange a refresh token for a fresh session
    fn refresh(&self, refresh_token: &str) -> Result<Session>;

    fn sign_out(&self, session: &Session) -> Result<()>;

    /// The user behind a session, `None` when the session is no longer valid
    fn get_user(&self, session: &Session) -> Result<Option<AuthUser>>;

    fn update_user(&self, session: &Session, update: &UserUpdate) -> Result<AuthUser>;

    /// Send a password-reset email
    fn reset_password_for_email(&self, email: &str, redirect_to: Option<&str>) -> Result<()>;

    /// Call a stored procedure
    fn rpc(&self, session: Option<&Session>, function: &str, args: Value) -> Result<Value>;

    /// `profiles.total_amount` for a user; `None` when there is no row
    fn select_profile_total(&self, session: &Session, user_id: &str) -> Result<Option<i64>>;

    /// Insert or merge a `profiles` row
    fn upsert_profile(&self, session: Option<&Session>, profile: &ProfileRow) -> Result<()>;

    fn update_profile_nickname(&self, session: &Session, user_id: &str, nickname: &str)
        -> Result<()>;

    fn select_payments(&self, session: &Session, user_id: &str) -> Result<Vec<PaymentRow>>;

    fn delete_payments(&self, session: &Session, user_id: &str) -> Result<()>;

    fn insert_payments(&self, session: &Session, rows: &[PaymentRow]) -> Result<()>;
}
