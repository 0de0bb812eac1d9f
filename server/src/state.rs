//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It is
//! read-only after startup: the parsed config and the backend transport. The
//! gateway keeps no per-user state; sessions live in the client's cookies.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::services::backend::Backend;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub backend: Arc<dyn Backend>,
}

impl AppState {
    #[must_use]
    pub fn new(config: GatewayConfig, backend: Arc<dyn Backend>) -> Self {
        Self { config: Arc::new(config), backend }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
