//! Client configuration: API location, view paths and cache policy.

use chrono::Duration;
use serde::Deserialize;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_HOME_PATH: &str = "/dashboard";
pub const DEFAULT_OAUTH_CALLBACK_PATH: &str = "/oauth2/redirect";
pub const DEFAULT_CURRENT_USER_TTL_MS: i64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL every API path is appended to
    pub api_base_url: String,
    /// Login view; unauthenticated sessions are sent here
    pub login_path: String,
    /// Protected home; authenticated sessions land here by default
    pub home_path: String,
    /// Landing view of the identity-provider redirect
    pub oauth_callback_path: String,
    /// Views an authenticated session must be redirected away from
    pub public_paths: Vec<String>,
    /// How long a completed current-user fetch is reused
    pub current_user_ttl_ms: i64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            home_path: DEFAULT_HOME_PATH.to_string(),
            oauth_callback_path: DEFAULT_OAUTH_CALLBACK_PATH.to_string(),
            public_paths: vec![
                "/login".to_string(),
                "/login/sso".to_string(),
                "/register".to_string(),
                "/oauth2/redirect".to_string(),
            ],
            current_user_ttl_ms: DEFAULT_CURRENT_USER_TTL_MS,
        }
    }
}

impl ClientConfig {
    /// Build a config from named variables, keeping defaults for anything
    /// unset.
    ///
    /// Recognized variables:
    /// - `API_URL`: base URL of the auth API
    /// - `LOGIN_PATH`: login view path
    /// - `HOME_PATH`: protected home path
    /// - `CURRENT_USER_TTL_MS`: current-user cache window in milliseconds
    pub fn from_vars<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("API_URL").filter(|v| !v.trim().is_empty()) {
            config.api_base_url = url.trim().to_string();
        }
        if let Some(path) = lookup("LOGIN_PATH").filter(|v| v.starts_with('/')) {
            config.login_path = path;
        }
        if let Some(path) = lookup("HOME_PATH").filter(|v| v.starts_with('/')) {
            config.home_path = path;
        }
        if let Some(ttl) = lookup("CURRENT_USER_TTL_MS") {
            config.current_user_ttl_ms = ttl
                .trim()
                .parse()
                .map_err(|_| "CURRENT_USER_TTL_MS must be a number of milliseconds".to_string())?;
        }

        Ok(config)
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn current_user_ttl(&self) -> Duration {
        Duration::milliseconds(self.current_user_ttl_ms.max(0))
    }

    /// Absolute URL for an API path such as `/auth/me`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn is_public(&self, path: &str) -> bool {
        let path = normalize(path);
        self.public_paths.iter().any(|p| normalize(p) == path)
    }

    pub fn is_oauth_callback(&self, path: &str) -> bool {
        normalize(path) == normalize(&self.oauth_callback_path)
    }

    /// Any view under the login path counts, so `/login/sso` is a login view.
    pub fn is_login_view(&self, path: &str) -> bool {
        let login = normalize(&self.login_path);
        let path = normalize(path);
        path == login || path.starts_with(&format!("{}/", login))
    }
}

fn normalize(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}
