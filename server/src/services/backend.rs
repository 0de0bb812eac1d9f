//! HTTP client for the external todo backend.
//!
//! Route handlers talk to the backend only through the [`Backend`] trait so
//! tests can substitute a canned implementation. [`HttpBackend`] is the real
//! JSON-over-HTTP transport.

use std::time::Duration;

use axum::http::{Method, StatusCode};
use serde_json::Value;

use crate::config::{BackendTimeouts, GatewayConfig};

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Request(String),
    #[error("backend returned a non-JSON body: {0}")]
    Decode(String),
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// One call to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub method: Method,
    /// Path below the backend base URL, starting with `/`.
    pub path: String,
    pub body: Option<Value>,
    /// Sent as `Authorization: Bearer <token>` when present.
    pub bearer: Option<String>,
}

impl UpstreamRequest {
    /// Bodyless request.
    #[must_use]
    pub fn new(method: Method, path: &str) -> Self {
        Self { method, path: path.to_owned(), body: None, bearer: None }
    }

    #[must_use]
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: &str, body: Value) -> Self {
        Self { body: Some(body), ..Self::new(Method::POST, path) }
    }

    #[must_use]
    pub fn with_bearer(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_owned());
        self
    }
}

/// Status plus decoded JSON body. An empty body decodes to `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl UpstreamResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, BackendError>;
}

// =============================================================================
// HTTP TRANSPORT
// =============================================================================

pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// # Errors
    ///
    /// Returns [`BackendError::HttpClientBuild`] if the reqwest client cannot be built.
    pub fn new(base_url: String, timeouts: BackendTimeouts) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| BackendError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    /// # Errors
    ///
    /// Returns [`BackendError::HttpClientBuild`] if the reqwest client cannot be built.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, BackendError> {
        Self::new(config.api_url.clone(), config.timeouts)
    }
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, BackendError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), &url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        tracing::debug!(method = %request.method, path = %request.path, %status, "backend call");
        Ok(UpstreamResponse { status, body: parse_body(&text)? })
    }
}

pub(crate) fn parse_body(text: &str) -> Result<Value, BackendError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| BackendError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;
