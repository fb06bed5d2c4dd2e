use auth_core::{KeyValueStore, StorageError};
use web_sys::Storage;

/// Session-storage key holding the path to return to after an OAuth login.
pub const REDIRECT_AFTER_LOGIN_KEY: &str = "redirectAfterLogin";

/// Browser `localStorage` or `sessionStorage`.
///
/// Private browsing modes may deny storage entirely; reads then behave as
/// empty and writes fail.
pub struct WebStorage {
    storage: Option<Storage>,
}

impl WebStorage {
    pub fn local() -> Self {
        Self {
            storage: web_sys::window().and_then(|w| w.local_storage().ok().flatten()),
        }
    }

    pub fn session() -> Self {
        Self {
            storage: web_sys::window().and_then(|w| w.session_storage().ok().flatten()),
        }
    }

    /// Read and remove a value in one step.
    pub fn take(&self, key: &str) -> Option<String> {
        let value = self.get(key);
        self.remove(key);
        value
    }
}

impl KeyValueStore for WebStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| StorageError::Unavailable("web storage disabled".to_string()))?;
        storage
            .set_item(key, value)
            .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = &self.storage {
            if storage.remove_item(key).is_err() {
                tracing::warn!(key, "Failed to remove storage entry");
            }
        }
    }
}
