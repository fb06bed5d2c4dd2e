use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::UserProfile;

// ============================================================================
// Credential API Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(length(min = 1, max = 254))]
    pub username: String,

    #[validate(length(min = 1, max = 120))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(length(min = 3, max = 20))]
    pub username: String,

    #[validate(email, length(max = 50))]
    pub email: String,

    #[validate(length(min = 6, max = 40))]
    pub password: String,
}

/// Body returned by `POST /auth/signin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl SignInResponse {
    /// Profile for the signed-in account.
    ///
    /// Servers that omit `username` get the identifier the user typed, minus
    /// any email domain.
    pub fn profile(&self, identifier: &str) -> UserProfile {
        let username = self
            .username
            .clone()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| identifier.split('@').next().unwrap_or(identifier).to_string());
        let email = self.email.clone().or_else(|| {
            identifier
                .contains('@')
                .then(|| identifier.to_string())
        });

        UserProfile::new(self.id, username, email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error body produced by the auth API; older endpoints use `error`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}

// ============================================================================
// OAuth API Types
// ============================================================================

/// Body returned by `GET /oauth2/success` when the server resolves its own
/// session into a bearer token.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthSuccessResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl OAuthSuccessResponse {
    pub fn profile(&self) -> Option<UserProfile> {
        match (&self.username, &self.email) {
            (Some(username), email) if !username.is_empty() => {
                Some(UserProfile::new(self.id, username.clone(), email.clone()))
            }
            (_, Some(email)) => {
                let mut user = UserProfile::from_hints(email, self.name.as_deref());
                user.id = self.id;
                Some(user)
            }
            _ => None,
        }
    }
}
