//! Application state: the local cache, the optional backend and the session
//!
//! The state machine is trivial: a session present means authenticated.
//! Account operations live in [`crate::account`], cache and sync operations
//! in [`crate::sync`].

use crate::error::{Error, Result};
use crate::remote::{Backend, Session};
use crate::store::local::LAST_USER_KEY;
use crate::store::LocalStore;

pub struct Hyodo<B> {
    pub(crate) store: LocalStore,
    pub(crate) backend: Option<B>,
    pub(crate) session: Option<Session>,
    pub(crate) redirect_url: Option<String>,
}

impl<B: Backend> Hyodo<B> {
    /// Create the app over a local store; `backend` is `None` in local-only mode
    pub fn new(store: LocalStore, backend: Option<B>) -> Self {
        Self {
            store,
            backend,
            session: None,
            redirect_url: None,
        }
    }

    /// Landing URL for password-reset emails
    pub fn with_redirect_url(mut self, redirect_url: Option<String>) -> Self {
        self.redirect_url = redirect_url;
        self
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Email of the signed-in user
    pub fn current_user(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.user.display_name())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Whether a backend is configured at all
    pub fn is_remote(&self) -> bool {
        self.backend.is_some()
    }

    /// Email of the most recent login on this device
    pub fn last_user(&self) -> Option<String> {
        self.store.get(LAST_USER_KEY).ok().flatten()
    }

    pub(crate) fn backend(&self) -> Result<&B> {
        self.backend.as_ref().ok_or(Error::BackendUnavailable)
    }

    /// Backend and session together, for operations that need a signed-in user
    pub(crate) fn authed(&self) -> Result<(&B, &Session)> {
        let backend = self.backend()?;
        let session = self.session.as_ref().ok_or(Error::NotAuthenticated)?;
        Ok((backend, session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::memory::MemoryBackend;

    #[test]
    fn test_local_only_is_unauthenticated() {
        let app: Hyodo<MemoryBackend> = Hyodo::new(LocalStore::open_in_memory().unwrap(), None);
        assert!(!app.is_authenticated());
        assert!(!app.is_remote());
        assert_eq!(app.current_user(), None);
        assert!(matches!(app.backend(), Err(Error::BackendUnavailable)));
    }

    #[test]
    fn test_authed_requires_session() {
        let app = Hyodo::new(
            LocalStore::open_in_memory().unwrap(),
            Some(MemoryBackend::new()),
        );
        assert!(app.is_remote());
        assert!(matches!(app.authed(), Err(Error::NotAuthenticated)));
    }
}
