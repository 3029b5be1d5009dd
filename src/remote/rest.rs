//! Supabase-compatible HTTP backend
//!
//! Auth goes to `<url>/auth/v1/...` (GoTrue), tables and stored procedures to
//! `<url>/rest/v1/...` (PostgREST). Every request carries the anon key as
//! `apikey`; the bearer token is the session's access token when there is
//! one and the anon key otherwise.

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::{AuthUser, Backend, PaymentRow, ProfileRow, SignUp, Session, UserUpdate};
use crate::config::RemoteConfig;
use crate::error::{Error, Result};

/// Message GoTrue returns for a wrong email/password pair
const INVALID_CREDENTIALS: &str = "Invalid login credentials";

/// Backend speaking the hosted service's REST API
pub struct RestBackend {
    client: Client,
    base: Url,
    anon_key: String,
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl From<TokenResponse> for Session {
    fn from(t: TokenResponse) -> Self {
        let expires_at = t.expires_at.or_else(|| {
            t.expires_in
                .map(|secs| chrono::Utc::now().timestamp() + secs)
        });
        Session {
            access_token: t.access_token,
            refresh_token: t.refresh_token,
            expires_at,
            user: t.user,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TotalOnly {
    #[serde(default, deserialize_with = "crate::ledger::model::deserialize_optional_amount")]
    total_amount: Option<i64>,
}

impl RestBackend {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        // join() replaces the last path segment unless the base ends with '/'
        let mut base = config.url.trim_end_matches('/').to_string();
        base.push('/');
        Ok(Self {
            client: Client::new(),
            base: Url::parse(&base)?,
            anon_key: config.anon_key.clone(),
        })
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> Result<RequestBuilder> {
        let url = self.base.join(path)?;
        tracing::debug!("{} {}", method, url);
        Ok(self
            .client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token.unwrap_or(self.anon_key.as_str())))
    }

    /// Send and fail on non-success status, extracting the provider's message
    fn send(request: RequestBuilder) -> Result<Response> {
        let response = request.send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| status.to_string());
        tracing::debug!("Backend error {}: {}", status, message);
        Err(Error::Backend(message))
    }

    fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        Ok(Self::send(request)?.json()?)
    }

    fn token(&self, grant_type: &str, body: Value) -> Result<Session> {
        let request = self
            .request(Method::POST, "auth/v1/token", None)?
            .query(&[("grant_type", grant_type)])
            .json(&body);
        let token: TokenResponse = Self::send_json(request)?;
        Ok(token.into())
    }
}

/// Pull a human-readable message out of an auth or table error body
fn error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| json.get(key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

/// PostgREST equality filter value
fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

impl Backend for RestBackend {
    fn sign_up(&self, email: &str, password: &str, nickname: Option<&str>) -> Result<SignUp> {
        let request = self.request(Method::POST, "auth/v1/signup", None)?.json(&json!({
            "email": email,
            "password": password,
            "data": { "nickname": nickname },
        }));
        let body: Value = Self::send_json(request)?;

        // With email confirmation on, the body is the bare user; otherwise a
        // full token response.
        if body.get("access_token").is_some() {
            let token: TokenResponse = serde_json::from_value(body)?;
            let session: Session = token.into();
            Ok(SignUp {
                user: session.user.clone(),
                session: Some(session),
            })
        } else {
            let user_json = body.get("user").cloned().unwrap_or(body);
            Ok(SignUp {
                user: serde_json::from_value(user_json)?,
                session: None,
            })
        }
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        self.token("password", json!({ "email": email, "password": password }))
            .map_err(|e| match e {
                Error::Backend(msg) if msg.contains(INVALID_CREDENTIALS) => {
                    Error::InvalidCredentials
                }
                other => other,
            })
    }

    fn refresh(&self, refresh_token: &str) -> Result<Session> {
        self.token("refresh_token", json!({ "refresh_token": refresh_token }))
    }

    fn sign_out(&self, session: &Session) -> Result<()> {
        let request = self.request(Method::POST, "auth/v1/logout", Some(&session.access_token))?;
        Self::send(request)?;
        Ok(())
    }

    fn get_user(&self, session: &Session) -> Result<Option<AuthUser>> {
        let response = self
            .request(Method::GET, "auth/v1/user", Some(&session.access_token))?
            .send()?;
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Backend(
                error_message(&body).unwrap_or_else(|| status.to_string()),
            ));
        }
        Ok(Some(response.json()?))
    }

    fn update_user(&self, session: &Session, update: &UserUpdate) -> Result<AuthUser> {
        let request = self
            .request(Method::PUT, "auth/v1/user", Some(&session.access_token))?
            .json(update);
        Self::send_json(request)
    }

    fn reset_password_for_email(&self, email: &str, redirect_to: Option<&str>) -> Result<()> {
        let mut request = self
            .request(Method::POST, "auth/v1/recover", None)?
            .json(&json!({ "email": email }));
        if let Some(redirect) = redirect_to {
            request = request.query(&[("redirect_to", redirect)]);
        }
        Self::send(request)?;
        Ok(())
    }

    fn rpc(&self, session: Option<&Session>, function: &str, args: Value) -> Result<Value> {
        let token = session.map(|s| s.access_token.as_str());
        let request = self
            .request(Method::POST, &format!("rest/v1/rpc/{}", function), token)?
            .json(&args);
        let response = Self::send(request)?;
        // void functions answer 204 with an empty body
        let text = response.text()?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn select_profile_total(&self, session: &Session, user_id: &str) -> Result<Option<i64>> {
        let request = self
            .request(Method::GET, "rest/v1/profiles", Some(&session.access_token))?
            .query(&[("select", "total_amount".to_string()), ("id", eq(user_id))]);
        let rows: Vec<TotalOnly> = Self::send_json(request)?;
        Ok(rows.into_iter().next().map(|r| r.total_amount.unwrap_or(0)))
    }

    fn upsert_profile(&self, session: Option<&Session>, profile: &ProfileRow) -> Result<()> {
        let token = session.map(|s| s.access_token.as_str());
        let request = self
            .request(Method::POST, "rest/v1/profiles", token)?
            .header("Prefer", "resolution=merge-duplicates")
            .json(profile);
        Self::send(request)?;
        Ok(())
    }

    fn update_profile_nickname(
        &self,
        session: &Session,
        user_id: &str,
        nickname: &str,
    ) -> Result<()> {
        let request = self
            .request(Method::PATCH, "rest/v1/profiles", Some(&session.access_token))?
            .query(&[("id", eq(user_id))])
            .json(&json!({ "nickname": nickname }));
        Self::send(request)?;
        Ok(())
    }

    fn select_payments(&self, session: &Session, user_id: &str) -> Result<Vec<PaymentRow>> {
        let request = self
            .request(Method::GET, "rest/v1/payments", Some(&session.access_token))?
            .query(&[("select", "*".to_string()), ("user_id", eq(user_id))]);
        Self::send_json(request)
    }

    fn delete_payments(&self, session: &Session, user_id: &str) -> Result<()> {
        let request = self
            .request(Method::DELETE, "rest/v1/payments", Some(&session.access_token))?
            .query(&[("user_id", eq(user_id))]);
        Self::send(request)?;
        Ok(())
    }

    fn insert_payments(&self, session: &Session, rows: &[PaymentRow]) -> Result<()> {
        let request = self
            .request(Method::POST, "rest/v1/payments", Some(&session.access_token))?
            .json(rows);
        Self::send(request)?;
        Ok(())
    }
}
