//! Persistence of the bearer token and last-known user profile.
//!
//! The two entries are written and cleared as a pair, but the backend has no
//! transaction, so readers must tolerate a half-written pair. [`TokenStore::session`]
//! only reports a session when both halves are present.

use std::rc::Rc;

use shared::UserProfile;

use crate::storage::{KeyValueStore, StorageError};

pub const TOKEN_KEY: &str = "authToken";
pub const USER_KEY: &str = "user";

/// Raw contents of the store; either half may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredSession {
    pub user: Option<UserProfile>,
    pub token: Option<String>,
}

impl StoredSession {
    pub fn into_pair(self) -> Option<(UserProfile, String)> {
        match (self.user, self.token) {
            (Some(user), Some(token)) => Some((user, token)),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct TokenStore {
    backend: Rc<dyn KeyValueStore>,
}

impl TokenStore {
    pub fn new(backend: Rc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Persist user and token together.
    ///
    /// The token is written first; if the profile write fails the token is
    /// removed again so no half session is left behind.
    pub fn save(&self, user: &UserProfile, token: &str) -> Result<(), StorageError> {
        let user_json = encode_user(user)?;

        self.backend.set(TOKEN_KEY, token)?;
        if let Err(err) = self.backend.set(USER_KEY, &user_json) {
            tracing::error!(error = %err, "Failed to persist user profile, rolling back token");
            self.backend.remove(TOKEN_KEY);
            return Err(err);
        }

        Ok(())
    }

    /// Replace the stored profile, keeping the token.
    pub fn save_user(&self, user: &UserProfile) -> Result<(), StorageError> {
        let user_json = encode_user(user)?;
        self.backend.set(USER_KEY, &user_json)
    }

    pub fn clear(&self) {
        self.backend.remove(TOKEN_KEY);
        self.backend.remove(USER_KEY);
    }

    pub fn token(&self) -> Option<String> {
        self.backend
            .get(TOKEN_KEY)
            .filter(|token| !token.trim().is_empty())
    }

    pub fn user(&self) -> Option<UserProfile> {
        let raw = self.backend.get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                tracing::warn!(error = %err, "Ignoring unreadable stored user profile");
                None
            }
        }
    }

    pub fn read(&self) -> StoredSession {
        StoredSession {
            user: self.user(),
            token: self.token(),
        }
    }

    pub fn session(&self) -> Option<(UserProfile, String)> {
        self.read().into_pair()
    }
}

fn encode_user(user: &UserProfile) -> Result<String, StorageError> {
    serde_json::to_string(user).map_err(|e| StorageError::Serialize {
        key: USER_KEY.to_string(),
        reason: e.to_string(),
    })
}
