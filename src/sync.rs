//! Local cache access and remote synchronization
//!
//! Remote data always wins: a pull overwrites the local blob, a save
//! overwrites the remote rows. Remote failures during sync and save are
//! logged and never surfaced to the caller; [`Hyodo::push_data`] is the
//! explicit variant that reports them.

use crate::app::Hyodo;
use crate::error::Result;
use crate::ledger::LedgerData;
use crate::remote::{self, Backend};
use crate::store::storage_key;

impl<B: Backend> Hyodo<B> {
    /// Cache key of the current user (or the temporary key when signed out)
    pub fn storage_key(&self) -> String {
        storage_key(self.current_user())
    }

    /// Read the local cache
    pub fn load_data(&self) -> Result<LedgerData> {
        self.store.load_data(&self.storage_key())
    }

    /// Replace the local cache with the remote copy
    ///
    /// Signed out, this does nothing and returns `None` without touching the
    /// local store.
    pub fn sync_data(&self) -> Option<LedgerData> {
        let (backend, session) = self.authed().ok()?;

        let pulled = match remote::pull(backend, session) {
            Ok(Some(data)) => data,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Data sync failed: {}", e);
                return None;
            }
        };

        if let Err(e) = self.store.save_data(&self.storage_key(), &pulled) {
            tracing::warn!("Data sync failed: {}", e);
            return None;
        }
        Some(pulled)
    }

    /// Write the local cache, then push to the remote store when signed in
    pub fn save_data(&self, data: &LedgerData) -> Result<()> {
        self.store.save_data(&self.storage_key(), data)?;

        if let Ok((backend, session)) = self.authed() {
            if let Err(e) = remote::push(backend, session, data) {
                tracing::warn!("Cloud save failed: {}", e);
            }
        }
        Ok(())
    }

    /// Push the local cache to the remote store, returning any failure
    pub fn push_data(&self) -> Result<LedgerData> {
        let (backend, session) = self.authed()?;
        let data = self.load_data()?;
        remote::push(backend, session, &data)?;
        Ok(data)
    }
}
