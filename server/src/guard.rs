//! Page-level auth and role gate.
//!
//! Runs inside the session middleware, so plain pages already have a token.
//! Pages under `/admin` additionally require the `ADMIN` role claim; callers
//! without it are sent to `/dashboard`.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use identity::{Role, RouteConfig, has_required_roles};

use crate::cookies::request_token;

pub const LOGIN_PATH: &str = "/login";
pub const FORBIDDEN_FALLBACK_PATH: &str = "/dashboard";
const ADMIN_PREFIX: &str = "/admin";

/// Apply `config` to the caller's token.
///
/// # Errors
///
/// Returns a redirect to `/login` when auth is required and no token is
/// present, or to `/dashboard` when the token lacks every required role.
pub fn protect_server(config: &RouteConfig, token: Option<String>) -> Result<Option<String>, Redirect> {
    if config.require_auth && token.is_none() {
        return Err(Redirect::temporary(LOGIN_PATH));
    }
    if !has_required_roles(token.as_deref(), &config.roles) {
        return Err(Redirect::temporary(FORBIDDEN_FALLBACK_PATH));
    }
    Ok(token)
}

/// Gate for a page path.
#[must_use]
pub fn page_config(path: &str) -> RouteConfig {
    let is_admin = path == ADMIN_PREFIX || path.starts_with("/admin/");
    if is_admin {
        RouteConfig { require_auth: true, roles: vec![Role::Admin] }
    } else {
        RouteConfig::default()
    }
}

/// Axum middleware; install with `axum::middleware::from_fn(guard_pages)`.
pub async fn guard_pages(request: Request, next: Next) -> Response {
    let config = page_config(request.uri().path());
    match protect_server(&config, request_token(request.headers())) {
        Ok(_) => next.run(request).await,
        Err(redirect) => redirect.into_response(),
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
