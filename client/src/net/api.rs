//! HTTP client for the gateway API.
//!
//! ERROR HANDLING
//! ==============
//! Every failure leaves [`ApiClient`] as an [`ApiError`] carrying a display
//! message and, when a response arrived, its status. Server errors (5xx) are
//! also published to the shared [`ApiErrorTracker`] so the UI can surface the
//! backend request id. Transport failures publish nothing.
//!
//! The underlying reqwest client keeps a cookie jar, so the http-only
//! `auth_token` cookie set by login is replayed on later calls.

use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;

use crate::state::api_error::{ApiErrorData, ApiErrorTracker};

pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong";
const NO_REQUEST_ID: &str = "none";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    /// `None` when no response was received.
    pub status: Option<u16>,
}

impl ApiError {
    #[must_use]
    pub fn new(message: impl Into<String>, status: Option<u16>) -> Self {
        Self { message: message.into(), status }
    }
}

/// Response-phase failure handling. Builds the normalized error and applies
/// the side effects for the status class.
#[must_use]
pub fn intercept_failure(status: Option<StatusCode>, body: &Value, tracker: &ApiErrorTracker) -> ApiError {
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .unwrap_or(DEFAULT_ERROR_MESSAGE)
        .to_owned();

    if let Some(status) = status {
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("unauthorized access");
        }
        if status.is_server_error() {
            let request_id = body
                .get("request_id")
                .and_then(Value::as_str)
                .filter(|id| !id.is_empty())
                .unwrap_or(NO_REQUEST_ID);
            tracker.set_data(ApiErrorData { error: Some(message.clone()), request_id: Some(request_id.to_owned()) });
        }
    }

    ApiError::new(message, status.map(|s| s.as_u16()))
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tracker: ApiErrorTracker,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns an [`ApiError`] without status if the HTTP client cannot be built.
    pub fn new(base_url: &str, tracker: ApiErrorTracker) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::new(format!("http client build failed: {e}"), None))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned(), tracker })
    }

    #[must_use]
    pub fn tracker(&self) -> &ApiErrorTracker {
        &self.tracker
    }

    /// Request-phase hook. Currently passes requests through unchanged.
    fn prepare(request: RequestBuilder) -> RequestBuilder {
        request
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::GET, path, None).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        self.request(Method::POST, path, body).await
    }

    /// Send one request and decode the JSON body. An empty body decodes to
    /// `Value::Null`.
    ///
    /// # Errors
    ///
    /// Returns the intercepted [`ApiError`] for transport failures and non-2xx
    /// responses.
    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.http.request(method.clone(), &url);
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = match Self::prepare(request).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(%method, %path, error = %e, "api transport failure");
                return Err(intercept_failure(None, &Value::Null, &self.tracker));
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(%method, %path, %status, error = %e, "api response body unreadable");
                String::new()
            }
        };
        let value = serde_json::from_str(&text).unwrap_or(Value::Null);
        if status.is_success() {
            Ok(value)
        } else {
            Err(intercept_failure(Some(status), &value, &self.tracker))
        }
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
