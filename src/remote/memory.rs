//! In-process backend used by tests

use serde_json::{json, Value};
use std::cell::{Cell, RefCell};

use super::{AuthUser, Backend, PaymentRow, ProfileRow, SignUp, Session, UserUpdate};
use crate::error::{Error, Result};

struct Account {
    user: AuthUser,
    password: String,
    confirmed: bool,
}

/// Backend keeping accounts and rows in memory
pub struct MemoryBackend {
    accounts: RefCell<Vec<Account>>,
    /// access token -> user id
    tokens: RefCell<Vec<(String, String)>>,
    profiles: RefCell<Vec<ProfileRow>>,
    payments: RefCell<Vec<PaymentRow>>,
    require_confirmation: Cell<bool>,
    fail_writes: Cell<bool>,
    fail_reads: Cell<bool>,
    unreachable: Cell<bool>,
    next_id: Cell<u64>,
    pub reset_emails: RefCell<Vec<(String, Option<String>)>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            accounts: RefCell::new(Vec::new()),
            tokens: RefCell::new(Vec::new()),
            profiles: RefCell::new(Vec::new()),
            payments: RefCell::new(Vec::new()),
            require_confirmation: Cell::new(false),
            fail_writes: Cell::new(false),
            fail_reads: Cell::new(false),
            unreachable: Cell::new(false),
            next_id: Cell::new(1),
            reset_emails: RefCell::new(Vec::new()),
        }
    }

    /// New signups cannot log in until confirmed
    pub fn require_confirmation(&self, on: bool) {
        self.require_confirmation.set(on);
    }

    /// Make every table write fail
    pub fn fail_table_writes(&self, on: bool) {
        self.fail_writes.set(on);
    }

    /// Make every table select fail
    pub fn fail_table_reads(&self, on: bool) {
        self.fail_reads.set(on);
    }

    /// Make sign-in and sign-up fail below the auth layer, as a dropped
    /// connection would
    pub fn set_unreachable(&self, on: bool) {
        self.unreachable.set(on);
    }

    /// Create a confirmed account and return a live session for it
    pub fn register_confirmed(&self, email: &str, password: &str) -> Session {
        let user = self.new_account(email, password, None, true);
        self.issue_session(&user)
    }

    pub fn profile(&self, user_id: &str) -> Option<ProfileRow> {
        self.profiles
            .borrow()
            .iter()
            .find(|p| p.id == user_id)
            .cloned()
    }

    pub fn payment_count(&self) -> usize {
        self.payments.borrow().len()
    }

    pub fn account_exists(&self, email: &str) -> bool {
        self.accounts
            .borrow()
            .iter()
            .any(|a| a.user.email.as_deref() == Some(email))
    }

    pub fn password_of(&self, email: &str) -> Option<String> {
        self.accounts
            .borrow()
            .iter()
            .find(|a| a.user.email.as_deref() == Some(email))
            .map(|a| a.password.clone())
    }

    fn fresh_id(&self, prefix: &str) -> String {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        format!("{}-{}", prefix, id)
    }

    fn new_account(
        &self,
        email: &str,
        password: &str,
        nickname: Option<&str>,
        confirmed: bool,
    ) -> AuthUser {
        let user = AuthUser {
            id: self.fresh_id("user"),
            email: Some(email.to_string()),
            user_metadata: nickname.map(|n| json!({ "nickname": n })).unwrap_or(Value::Null),
        };
        self.accounts.borrow_mut().push(Account {
            user: user.clone(),
            password: password.to_string(),
            confirmed,
        });
        user
    }

    fn issue_session(&self, user: &AuthUser) -> Session {
        let access = self.fresh_id("access");
        let refresh = self.fresh_id("refresh");
        let mut tokens = self.tokens.borrow_mut();
        tokens.push((access.clone(), user.id.clone()));
        tokens.push((refresh.clone(), user.id.clone()));
        Session {
            access_token: access,
            refresh_token: Some(refresh),
            expires_at: Some(chrono::Utc::now().timestamp() + 3600),
            user: user.clone(),
        }
    }

    fn user_for_token(&self, token: &str) -> Option<AuthUser> {
        let user_id = self
            .tokens
            .borrow()
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, id)| id.clone())?;
        self.accounts
            .borrow()
            .iter()
            .find(|a| a.user.id == user_id)
            .map(|a| a.user.clone())
    }

    fn check_writes(&self) -> Result<()> {
        if self.fail_writes.get() {
            return Err(Error::Backend("write rejected".to_string()));
        }
        Ok(())
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads.get() {
            return Err(Error::Backend("read rejected".to_string()));
        }
        Ok(())
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable.get() {
            return Err(Error::Url(url::ParseError::EmptyHost));
        }
        Ok(())
    }

    fn authorize(&self, session: &Session, user_id: &str) -> Result<()> {
        match self.user_for_token(&session.access_token) {
            Some(user) if user.id == user_id => Ok(()),
            _ => Err(Error::Backend("permission denied".to_string())),
        }
    }
}

impl Backend for MemoryBackend {
    fn sign_up(&self, email: &str, password: &str, nickname: Option<&str>) -> Result<SignUp> {
        self.check_reachable()?;
        if self.account_exists(email) {
            return Err(Error::Backend("User already registered".to_string()));
        }
        let confirmed = !self.require_confirmation.get();
        let user = self.new_account(email, password, nickname, confirmed);
        let session = confirmed.then(|| self.issue_session(&user));
        Ok(SignUp { user, session })
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        self.check_reachable()?;
        let user = self
            .accounts
            .borrow()
            .iter()
            .find(|a| a.user.email.as_deref() == Some(email) && a.password == password)
            .map(|a| (a.user.clone(), a.confirmed));
        match user {
            Some((user, true)) => Ok(self.issue_session(&user)),
            Some((_, false)) => Err(Error::Backend("Email not confirmed".to_string())),
            None => Err(Error::InvalidCredentials),
        }
    }

    fn refresh(&self, refresh_token: &str) -> Result<Session> {
        let user = self
            .user_for_token(refresh_token)
            .ok_or_else(|| Error::Backend("Invalid Refresh Token".to_string()))?;
        self.tokens.borrow_mut().retain(|(t, _)| t != refresh_token);
        Ok(self.issue_session(&user))
    }

    fn sign_out(&self, session: &Session) -> Result<()> {
        let user_id = session.user.id.clone();
        self.tokens.borrow_mut().retain(|(_, id)| *id != user_id);
        Ok(())
    }

    fn get_user(&self, session: &Session) -> Result<Option<AuthUser>> {
        Ok(self.user_for_token(&session.access_token))
    }

    fn update_user(&self, session: &Session, update: &UserUpdate) -> Result<AuthUser> {
        let user = self
            .user_for_token(&session.access_token)
            .ok_or_else(|| Error::Backend("invalid JWT".to_string()))?;
        let mut accounts = self.accounts.borrow_mut();
        let account = accounts
            .iter_mut()
            .find(|a| a.user.id == user.id)
            .ok_or_else(|| Error::Backend("User not found".to_string()))?;
        if let Some(password) = &update.password {
            account.password = password.clone();
        }
        if let Some(data) = &update.data {
            account.user.user_metadata = data.clone();
        }
        Ok(account.user.clone())
    }

    fn reset_password_for_email(&self, email: &str, redirect_to: Option<&str>) -> Result<()> {
        self.reset_emails
            .borrow_mut()
            .push((email.to_string(), redirect_to.map(str::to_string)));
        Ok(())
    }

    fn rpc(&self, session: Option<&Session>, function: &str, args: Value) -> Result<Value> {
        match function {
            "find_email_by_nickname" => {
                let nickname = args.get("p_nickname").and_then(|v| v.as_str());
                let found = self
                    .profiles
                    .borrow()
                    .iter()
                    .find(|p| p.nickname.as_deref() == nickname && nickname.is_some())
                    .map(|p| p.id.clone());
                let email = found.and_then(|id| {
                    self.accounts
                        .borrow()
                        .iter()
                        .find(|a| a.user.id == id)
                        .and_then(|a| a.user.email.clone())
                });
                Ok(email.map(Value::String).unwrap_or(Value::Null))
            }
            "delete_own_account" => {
                let user = session
                    .and_then(|s| self.user_for_token(&s.access_token))
                    .ok_or_else(|| Error::Backend("not authenticated".to_string()))?;
                self.accounts.borrow_mut().retain(|a| a.user.id != user.id);
                self.profiles.borrow_mut().retain(|p| p.id != user.id);
                self.payments.borrow_mut().retain(|p| p.user_id != user.id);
                Ok(Value::Null)
            }
            other => Err(Error::Backend(format!("function {} does not exist", other))),
        }
    }

    fn select_profile_total(&self, session: &Session, user_id: &str) -> Result<Option<i64>> {
        self.check_reads()?;
        self.authorize(session, user_id)?;
        Ok(self.profile(user_id).and_then(|p| p.total_amount))
    }

    fn upsert_profile(&self, session: Option<&Session>, profile: &ProfileRow) -> Result<()> {
        self.check_writes()?;
        if let Some(session) = session {
            self.authorize(session, &profile.id)?;
        }
        let mut profiles = self.profiles.borrow_mut();
        match profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => {
                if profile.nickname.is_some() {
                    existing.nickname = profile.nickname.clone();
                }
                if profile.total_amount.is_some() {
                    existing.total_amount = profile.total_amount;
                }
            }
            None => profiles.push(profile.clone()),
        }
        Ok(())
    }

    fn update_profile_nickname(
        &self,
        session: &Session,
        user_id: &str,
        nickname: &str,
    ) -> Result<()> {
        self.check_writes()?;
        self.authorize(session, user_id)?;
        if let Some(p) = self
            .profiles
            .borrow_mut()
            .iter_mut()
            .find(|p| p.id == user_id)
        {
            p.nickname = Some(nickname.to_string());
        }
        Ok(())
    }

    fn select_payments(&self, session: &Session, user_id: &str) -> Result<Vec<PaymentRow>> {
        self.check_reads()?;
        self.authorize(session, user_id)?;
        Ok(self
            .payments
            .borrow()
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    fn delete_payments(&self, session: &Session, user_id: &str) -> Result<()> {
        self.check_writes()?;
        self.authorize(session, user_id)?;
        self.payments.borrow_mut().retain(|p| p.user_id != user_id);
        Ok(())
    }

    fn insert_payments(&self, session: &Session, rows: &[PaymentRow]) -> Result<()> {
        self.check_writes()?;
        for row in rows {
            self.authorize(session, &row.user_id)?;
        }
        self.payments.borrow_mut().extend(rows.iter().cloned());
        Ok(())
    }
}
