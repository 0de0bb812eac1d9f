//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the auth API under `/api/auth` and the built web
//! app as static files for everything else. Every request except `/healthz`
//! passes the session gate first, then the `/admin` role gate.

pub mod auth;
pub mod nextauth;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::guard::guard_pages;
use crate::middleware::require_session;
use crate::state::AppState;

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/csrf", get(nextauth::csrf))
        .route("/api/auth/callback/credentials", post(nextauth::callback_credentials))
        .route("/api/auth/session", get(nextauth::session))
}

/// Full gateway router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let site = ServeDir::new(&state.config.site_dir).append_index_html_on_directories(true);

    auth_routes()
        .fallback_service(site)
        .layer(from_fn(guard_pages))
        .layer(from_fn(require_session))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
