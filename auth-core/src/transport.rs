//! HTTP transport seam.
//!
//! The auth client builds [`ApiRequest`]s and hands them to an
//! [`HttpTransport`]; the browser build plugs in `gloo-net`, tests plug in a
//! scripted double. Futures are not `Send`: everything runs on the single
//! browser thread.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::api::ErrorResponse;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("invalid request body: {0}")]
    Body(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post<T: Serialize>(url: impl Into<String>, body: &T) -> Result<Self, TransportError> {
        let body = serde_json::to_value(body).map_err(|e| TransportError::Body(e.to_string()))?;
        Ok(Self {
            method: Method::Post,
            url: url.into(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.with_header("Authorization", format!("Bearer {}", token))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Token carried in the `Authorization` header, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.header("Authorization")?.strip_prefix("Bearer ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Error text from a `{message}` body, falling back to the raw body or
    /// the status code.
    pub fn error_message(&self) -> String {
        if let Some(message) = self
            .json::<ErrorResponse>()
            .ok()
            .and_then(ErrorResponse::into_message)
        {
            return message;
        }

        let raw = self.body.trim();
        if raw.is_empty() || raw.starts_with('{') || raw.starts_with('<') {
            format!("HTTP error: {}", self.status)
        } else {
            raw.to_string()
        }
    }
}

#[async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_header() {
        let request = ApiRequest::get("http://api/auth/me").bearer("abc");
        assert_eq!(request.header("authorization"), Some("Bearer abc"));
        assert_eq!(request.bearer_token(), Some("abc"));
    }

    #[test]
    fn test_post_serializes_body() {
        let request = ApiRequest::post("http://api/x", &serde_json::json!({ "a": 1 }))
            .expect("should build");
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.body, Some(serde_json::json!({ "a": 1 })));
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert!(request.bearer_token().is_none());
    }

    #[test]
    fn test_error_message_fallbacks() {
        let response = ApiResponse::new(400, r#"{"message":"Username is taken"}"#);
        assert_eq!(response.error_message(), "Username is taken");

        let response = ApiResponse::new(502, "<html>bad gateway</html>");
        assert_eq!(response.error_message(), "HTTP error: 502");

        let response = ApiResponse::new(500, "boom");
        assert_eq!(response.error_message(), "boom");
    }
}
