use async_trait::async_trait;
use auth_core::{ApiRequest, ApiResponse, HttpTransport, Method, TransportError};
use gloo_net::http::Request;

/// `fetch`-backed transport.
pub struct GlooTransport;

#[async_trait(?Send)]
impl HttpTransport for GlooTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = match request.method {
            Method::Get => Request::get(&request.url),
            Method::Post => Request::post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let sent = match &request.body {
            Some(body) => builder
                .json(body)
                .map_err(|e| TransportError::Body(format!("{:?}", e)))?
                .send()
                .await,
            None => builder.send().await,
        };
        let response = sent.map_err(|e| TransportError::Request(format!("{:?}", e)))?;

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to read response body: {:?}", e);
                String::new()
            }
        };

        Ok(ApiResponse::new(status, body))
    }
}
