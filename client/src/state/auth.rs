//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by route guards and user-aware views to coordinate login redirects
//! and identity-dependent rendering. The store drives the gateway through
//! [`AuthApi`] and mirrors `{user, isAuthenticated}` into [`Storage`] under
//! `auth-storage` after every change, so a restarted session starts signed in.
//!
//! ERROR HANDLING
//! ==============
//! `login`, `register`, and `logout` record the failure message in
//! [`AuthState::error`] and return it. `fetch_current_user` swallows failures:
//! an anonymous visitor is not an error. A 401 there drops the cached user. Every action ends with
//! `is_loading == false`. Persistence failures are logged, never returned.

use std::sync::Arc;

use identity::{LoginCredentials, RegisterCredentials, UserSession};
use serde::{Deserialize, Serialize};

use crate::net::api::ApiError;
use crate::net::auth_service::AuthApi;
use crate::util::persistence::{Storage, load_json, save_json};

pub const STORAGE_KEY: &str = "auth-storage";
const STORAGE_VERSION: u32 = 0;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<UserSession>,
    /// Always equals `user.is_some()`.
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// The persisted subset.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedAuth {
    user: Option<UserSession>,
    #[serde(rename = "isAuthenticated")]
    is_authenticated: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistEnvelope {
    state: PersistedAuth,
    version: u32,
}

fn failure_message(error: &ApiError, fallback: &str) -> String {
    if error.message.is_empty() { fallback.to_owned() } else { error.message.clone() }
}

pub struct AuthStore {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn Storage>,
    state: AuthState,
}

impl AuthStore {
    /// Create the store, restoring the persisted user if one was saved.
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>, storage: Arc<dyn Storage>) -> Self {
        let user = match load_json::<PersistEnvelope>(storage.as_ref(), STORAGE_KEY) {
            Ok(Some(envelope)) => envelope.state.user,
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable auth storage");
                None
            }
        };
        let state = AuthState { is_authenticated: user.is_some(), user, ..AuthState::default() };
        Self { api, storage, state }
    }

    #[must_use]
    pub fn state(&self) -> &AuthState {
        &self.state
    }

    fn update(&mut self, apply: impl FnOnce(&mut AuthState)) {
        apply(&mut self.state);
        self.persist();
    }

    fn persist(&self) {
        let envelope = PersistEnvelope {
            state: PersistedAuth { user: self.state.user.clone(), is_authenticated: self.state.is_authenticated },
            version: STORAGE_VERSION,
        };
        if let Err(e) = save_json(self.storage.as_ref(), STORAGE_KEY, &envelope) {
            tracing::warn!(error = %e, "auth storage write failed");
        }
    }

    fn fail(&mut self, error: &ApiError, fallback: &str) {
        let message = failure_message(error, fallback);
        self.update(|state| {
            state.is_loading = false;
            state.error = Some(message);
        });
    }

    // =========================================================================
    // ACTIONS
    // =========================================================================

    /// # Errors
    ///
    /// Returns the gateway failure after recording its message.
    pub async fn login(&mut self, credentials: &LoginCredentials) -> Result<(), ApiError> {
        self.update(|state| {
            state.is_loading = true;
            state.error = None;
        });
        let result = self.api.login(credentials).await;
        match result {
            Ok(user) => {
                self.update(|state| {
                    state.user = Some(user);
                    state.is_authenticated = true;
                    state.is_loading = false;
                    state.error = None;
                });
                Ok(())
            }
            Err(e) => {
                self.fail(&e, "Login failed");
                Err(e)
            }
        }
    }

    /// Create an account. The current user is left untouched either way.
    ///
    /// # Errors
    ///
    /// Returns the gateway failure after recording its message.
    pub async fn register(&mut self, credentials: &RegisterCredentials) -> Result<(), ApiError> {
        self.update(|state| {
            state.is_loading = true;
            state.error = None;
        });
        let result = self.api.register(credentials).await;
        match result {
            Ok(_) => {
                self.update(|state| state.is_loading = false);
                Ok(())
            }
            Err(e) => {
                self.fail(&e, "Registration failed");
                Err(e)
            }
        }
    }

    /// Reset to the initial state once the gateway confirms. On failure the
    /// user stays signed in locally.
    ///
    /// # Errors
    ///
    /// Returns the gateway failure after recording its message.
    pub async fn logout(&mut self) -> Result<(), ApiError> {
        self.update(|state| state.is_loading = true);
        let result = self.api.logout().await;
        match result {
            Ok(()) => {
                self.clear_state();
                Ok(())
            }
            Err(e) => {
                self.fail(&e, "Logout failed");
                Err(e)
            }
        }
    }

    /// Refresh `user` from the gateway. Failures leave no error behind; a 401
    /// also signs the cached user out, other failures keep it.
    pub async fn fetch_current_user(&mut self) {
        self.update(|state| {
            state.is_loading = true;
            state.error = None;
        });
        let result = self.api.current_user().await;
        match result {
            Ok(user) => self.set_user(Some(user)),
            Err(e) if e.status == Some(401) => {
                tracing::debug!(error = %e, "session rejected; clearing cached user");
                self.set_user(None);
            }
            Err(e) => tracing::debug!(error = %e, "no current user"),
        }
        self.update(|state| {
            state.is_loading = false;
            state.error = None;
        });
    }

    pub fn set_user(&mut self, user: Option<UserSession>) {
        self.update(|state| {
            state.is_authenticated = user.is_some();
            state.user = user;
            state.error = None;
        });
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.update(|state| state.error = error);
    }

    pub fn clear_state(&mut self) {
        self.update(|state| *state = AuthState::default());
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
