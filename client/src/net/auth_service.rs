//! Typed wrapper over the gateway's `/auth/*` endpoints.
//!
//! The session store depends on the [`AuthApi`] trait rather than on
//! [`AuthService`] directly, so store tests can run against a canned double.

use identity::{LoginCredentials, RegisterCredentials, UserSession};
use serde_json::Value;

use super::api::{ApiClient, ApiError};

pub const UNEXPECTED_RESPONSE_MESSAGE: &str = "Unexpected response from server";

#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &LoginCredentials) -> Result<UserSession, ApiError>;
    async fn register(&self, credentials: &RegisterCredentials) -> Result<UserSession, ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;
    async fn current_user(&self) -> Result<UserSession, ApiError>;
}

/// The `user` object from a gateway auth response, at the top level or
/// inside the `data` envelope.
///
/// # Errors
///
/// Returns an [`ApiError`] without status when no decodable user is present.
pub fn user_from_body(body: &Value) -> Result<UserSession, ApiError> {
    let user = body
        .get("user")
        .or_else(|| body.get("data").and_then(|data| data.get("user")))
        .filter(|user| user.is_object())
        .ok_or_else(|| ApiError::new(UNEXPECTED_RESPONSE_MESSAGE, None))?;
    serde_json::from_value(user.clone()).map_err(|e| {
        tracing::warn!(error = %e, "auth response user did not decode");
        ApiError::new(UNEXPECTED_RESPONSE_MESSAGE, None)
    })
}

fn to_body(value: impl serde::Serialize) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::new(format!("request encode failed: {e}"), None))
}

pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl AuthApi for AuthService {
    async fn login(&self, credentials: &LoginCredentials) -> Result<UserSession, ApiError> {
        let body = self.api.post("/auth/login", Some(to_body(credentials)?)).await?;
        user_from_body(&body)
    }

    async fn register(&self, credentials: &RegisterCredentials) -> Result<UserSession, ApiError> {
        let body = self.api.post("/auth/register", Some(to_body(credentials)?)).await?;
        user_from_body(&body)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.api.post("/auth/logout", None).await.map(|_| ())
    }

    async fn current_user(&self) -> Result<UserSession, ApiError> {
        let body = self.api.get("/auth/me").await?;
        user_from_body(&body)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "auth_service_test.rs"]
mod tests;
