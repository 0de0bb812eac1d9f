//! Per-session context bundling the client stores.
//!
//! DESIGN
//! ======
//! A `ClientSession` owns one `AuthStore` and one `ApiErrorTracker`. The API
//! client publishes into the same tracker the UI reads, so both share a
//! handle. `start` restores the persisted user; `end` drops the context and
//! clears any undismissed API error.

use std::sync::Arc;

use crate::net::api::{ApiClient, ApiError};
use crate::net::auth_service::{AuthApi, AuthService};
use crate::state::api_error::ApiErrorTracker;
use crate::state::auth::AuthStore;
use crate::util::persistence::Storage;

pub struct ClientSession {
    auth: AuthStore,
    errors: ApiErrorTracker,
}

impl ClientSession {
    /// Start a session against the gateway at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the HTTP client cannot be built.
    pub fn start(base_url: &str, storage: Arc<dyn Storage>) -> Result<Self, ApiError> {
        let errors = ApiErrorTracker::new();
        let api = ApiClient::new(base_url, errors.clone())?;
        tracing::debug!(%base_url, "client session started");
        Ok(Self::with_api(Arc::new(AuthService::new(api)), storage, errors))
    }

    /// Start a session over an existing `AuthApi` and tracker.
    #[must_use]
    pub fn with_api(api: Arc<dyn AuthApi>, storage: Arc<dyn Storage>, errors: ApiErrorTracker) -> Self {
        Self { auth: AuthStore::new(api, storage), errors }
    }

    #[must_use]
    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    pub fn auth_mut(&mut self) -> &mut AuthStore {
        &mut self.auth
    }

    #[must_use]
    pub fn errors(&self) -> &ApiErrorTracker {
        &self.errors
    }

    pub fn end(self) {
        self.errors.clear_data();
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
