use serde::{Deserialize, Serialize};

/// Profile of the signed-in user, as persisted by the client and
/// reported by `/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Absent when the profile was built from OAuth redirect hints
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserProfile {
    pub fn new(id: Option<i64>, username: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email,
        }
    }

    /// Build a profile from the `email`/`name` hints an OAuth redirect carries.
    ///
    /// The username falls back to the local part of the email address, which
    /// is what the server does when the provider sends no display name.
    pub fn from_hints(email: &str, name: Option<&str>) -> Self {
        let username = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| email.split('@').next().unwrap_or(email).to_string());

        Self {
            id: None,
            username,
            email: Some(email.to_string()),
        }
    }

    pub fn display_name(&self) -> &str {
        if self.username.is_empty() {
            "User"
        } else {
            &self.username
        }
    }
}
