//! Unified error handling for the auth client.
//!
//! Every operation returns [`AuthResult`], so views can use `?` and turn the
//! failure into a message with [`AuthError::user_message`]. The type is
//! `Clone` because the single-flight user fetch hands one result to every
//! waiting caller.

use thiserror::Error;

use crate::storage::StorageError;
use crate::transport::TransportError;

/// Unified error type for auth operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Server rejected the identifier/secret pair
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Request never produced an HTTP response
    #[error("Network error: {0}")]
    Network(String),

    /// No bearer token stored
    #[error("No authentication token found")]
    NotAuthenticated,

    /// Stored session could not be validated
    #[error("Session expired")]
    SessionExpired,

    /// OAuth redirect produced no usable token
    #[error("OAuth login failed: {0}")]
    OAuthFailed(String),

    /// `login()` called without both user and token
    #[error("Invalid login arguments: {0}")]
    InvalidLoginArgs(String),

    /// Non-success response passed through from the server
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Form input rejected before sending
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Create an invalid login arguments error
    pub fn invalid_login(reason: impl Into<String>) -> Self {
        AuthError::InvalidLoginArgs(reason.into())
    }

    /// Create an OAuth failure with a readable reason
    pub fn oauth(reason: impl Into<String>) -> Self {
        AuthError::OAuthFailed(reason.into())
    }

    /// Text suitable for showing next to a form.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials(msg) if !msg.is_empty() => msg.clone(),
            AuthError::InvalidCredentials(_) => {
                "Login failed. Please check your credentials.".to_string()
            }
            AuthError::Network(_) => {
                "Unable to reach the server. Please try again.".to_string()
            }
            AuthError::NotAuthenticated | AuthError::SessionExpired => {
                "Your session has expired. Please sign in again.".to_string()
            }
            AuthError::OAuthFailed(reason) if !reason.is_empty() => reason.clone(),
            AuthError::OAuthFailed(_) => "Authentication failed. Please try again.".to_string(),
            AuthError::InvalidLoginArgs(_) => "Failed to complete login process".to_string(),
            AuthError::Server { message, .. } => message.clone(),
            AuthError::InvalidResponse(_) => "Invalid response from server".to_string(),
            AuthError::Validation(msg) => msg.clone(),
            AuthError::Storage(_) => "Unable to save your session in this browser.".to_string(),
        }
    }

    /// Whether the failure means the stored session is no longer usable.
    pub fn is_session_failure(&self) -> bool {
        matches!(self, AuthError::NotAuthenticated | AuthError::SessionExpired)
    }
}

impl From<TransportError> for AuthError {
    fn from(err: TransportError) -> Self {
        AuthError::Network(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<&str> = errors.field_errors().into_keys().collect();
        fields.sort_unstable();
        AuthError::Validation(format!("Please check: {}", fields.join(", ")))
    }
}

/// Result type alias for auth operations
pub type AuthResult<T> = Result<T, AuthError>;
