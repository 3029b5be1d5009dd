//! Sign-in state and account operations

use serde_json::json;

use crate::app::Hyodo;
use crate::error::{Error, Result};
use crate::ledger::format::mask_email;
use crate::remote::{Backend, ProfileRow, Session, UserUpdate};
use crate::store::local::{LAST_USER_KEY, SESSION_KEY};

/// Minimum password length the auth provider accepts
pub const MIN_PASSWORD_LEN: usize = 6;

/// How a successful signup ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupOutcome {
    /// Account created and signed in
    SignedIn,
    /// Account created; email confirmation is pending, log in afterwards
    ConfirmationPending,
}

impl SignupOutcome {
    pub fn message(self) -> &'static str {
        match self {
            Self::SignedIn => "가입되었습니다.",
            Self::ConfirmationPending => "가입되었습니다. 로그인해주세요.",
        }
    }
}

fn check_credentials(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(Error::MissingCredentials);
    }
    Ok(())
}

fn check_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

impl<B: Backend> Hyodo<B> {
    /// Restore the persisted session, refreshing it when expired
    ///
    /// Returns whether a user is signed in afterwards.
    pub fn init_auth(&mut self) -> bool {
        if self.backend.is_none() {
            return false;
        }

        let stored: Option<Session> = self
            .store
            .get(SESSION_KEY)
            .ok()
            .flatten()
            .and_then(|raw| serde_json::from_str(&raw).ok());
        let Some(session) = stored else {
            return false;
        };

        let now = chrono::Utc::now().timestamp();
        let session = if session.is_expired(now) {
            match self.refresh_session(&session) {
                Some(fresh) => fresh,
                None => {
                    tracing::warn!("Stored session expired and could not be refreshed");
                    self.clear_session();
                    return false;
                }
            }
        } else {
            session
        };

        self.persist_session(&session);
        self.session = Some(session);
        true
    }

    fn refresh_session(&self, session: &Session) -> Option<Session> {
        let backend = self.backend.as_ref()?;
        let token = session.refresh_token.as_deref()?;
        backend
            .refresh(token)
            .map_err(|e| tracing::warn!("Session refresh failed: {}", e))
            .ok()
    }

    /// Password login
    pub fn login(&mut self, email: &str, password: &str) -> Result<()> {
        check_credentials(email, password)?;
        let backend = self.backend()?;

        let session = backend.sign_in(email.trim(), password).map_err(|e| {
            tracing::error!("Login error: {}", e);
            if e.is_transport() {
                Error::LoginFailed
            } else {
                e
            }
        })?;
        self.establish(session);
        Ok(())
    }

    /// Create an account, then try to sign straight in
    pub fn signup(
        &mut self,
        email: &str,
        password: &str,
        nickname: Option<&str>,
    ) -> Result<SignupOutcome> {
        check_credentials(email, password)?;
        check_password(password)?;
        let email = email.trim();
        let backend = self.backend()?;

        let signup = backend.sign_up(email, password, nickname).map_err(|e| {
            tracing::error!("Signup error: {}", e);
            if e.is_transport() {
                Error::SignupFailed
            } else {
                e
            }
        })?;

        if let Some(nickname) = nickname {
            let profile = ProfileRow {
                id: signup.user.id.clone(),
                nickname: Some(nickname.to_string()),
                total_amount: None,
            };
            if let Err(e) = backend.upsert_profile(signup.session.as_ref(), &profile) {
                tracing::warn!("Profile nickname not stored: {}", e);
            }
        }

        match backend.sign_in(email, password) {
            Ok(session) => {
                self.establish(session);
                Ok(SignupOutcome::SignedIn)
            }
            Err(e) => {
                tracing::debug!("Login after signup failed: {}", e);
                Ok(SignupOutcome::ConfirmationPending)
            }
        }
    }

    /// Sign out and forget the session on this device
    pub fn logout(&mut self) -> Result<()> {
        let Some(session) = self.session.take() else {
            self.clear_session();
            return Ok(());
        };
        if let Some(backend) = &self.backend {
            if let Err(e) = backend.sign_out(&session) {
                tracing::warn!("Remote sign-out failed: {}", e);
            }
        }
        self.store.add_login_log(session.user.display_name(), "logout");
        self.clear_session();
        Ok(())
    }

    /// Delete the account and all of its remote data, then sign out
    ///
    /// The local cache for the account is removed as well.
    pub fn delete_account(&mut self) -> Result<()> {
        let (backend, session) = self.authed()?;

        if let Err(e) = backend.rpc(Some(session), "delete_own_account", json!({})) {
            tracing::error!("Account deletion error: {}", e);
            return Err(e);
        }
        if let Err(e) = backend.sign_out(session) {
            tracing::debug!("Sign-out after deletion failed: {}", e);
        }

        let key = self.storage_key();
        self.store.remove(&key)?;
        if let Some(session) = self.session.take() {
            self.store
                .add_login_log(session.user.display_name(), "delete_account");
        }
        self.clear_session();
        Ok(())
    }

    /// Send a password-reset email
    pub fn reset_password(&self, email: &str) -> Result<()> {
        if email.trim().is_empty() {
            return Err(Error::MissingCredentials);
        }
        self.backend()?
            .reset_password_for_email(email.trim(), self.redirect_url.as_deref())
    }

    /// Set a new password for the signed-in user
    pub fn update_password(&self, new_password: &str) -> Result<()> {
        check_password(new_password)?;
        let (backend, session) = self.authed()?;
        let update = UserUpdate {
            password: Some(new_password.to_string()),
            data: None,
        };
        backend.update_user(session, &update)?;
        Ok(())
    }

    /// Change the nickname in user metadata and in the profile row
    pub fn update_nickname(&mut self, nickname: &str) -> Result<()> {
        let (backend, session) = self.authed()?;
        let update = UserUpdate {
            password: None,
            data: Some(json!({ "nickname": nickname })),
        };
        let user = backend.update_user(session, &update)?;

        if let Some(current) = backend.get_user(session)? {
            backend.update_profile_nickname(session, &current.id, nickname)?;
        }

        if let Some(session) = self.session.as_mut() {
            session.user = user;
        }
        if let Some(session) = self.session.clone() {
            self.persist_session(&session);
        }
        Ok(())
    }

    /// Look up the (masked) email registered under a nickname
    pub fn find_email_by_nickname(&self, nickname: &str) -> Result<String> {
        let backend = self.backend()?;
        let found = backend.rpc(
            self.session.as_ref(),
            "find_email_by_nickname",
            json!({ "p_nickname": nickname }),
        )?;
        match found.as_str() {
            Some(email) if email.contains('*') => Ok(email.to_string()),
            Some(email) => Ok(mask_email(email)),
            None => Err(Error::NicknameNotFound),
        }
    }

    fn establish(&mut self, session: Session) {
        let name = session.user.display_name().to_string();
        self.persist_session(&session);
        if let Err(e) = self.store.set(LAST_USER_KEY, &name) {
            tracing::warn!("Could not record last user: {}", e);
        }
        self.store.add_login_log(&name, "login");
        self.session = Some(session);
    }

    fn persist_session(&self, session: &Session) {
        let written = serde_json::to_string(session)
            .map_err(Error::from)
            .and_then(|json| self.store.set(SESSION_KEY, &json));
        if let Err(e) = written {
            tracing::warn!("Session not persisted: {}", e);
        }
    }

    fn clear_session(&mut self) {
        self.session = None;
        for key in [SESSION_KEY, LAST_USER_KEY] {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!("Could not clear {}: {}", key, e);
            }
        }
    }
}
