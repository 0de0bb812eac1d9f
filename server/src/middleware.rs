//! Session gate for every non-public request.
//!
//! Requests outside the allow-list must carry an `auth_token` cookie. Without
//! one the caller is redirected to `/login?from=<path>`; with one the request
//! continues with `Authorization: Bearer <token>` attached so downstream
//! handlers and proxies see a bearer credential. Only presence is checked,
//! the backend verifies the token when it is used.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::cookies::parse_cookies;

/// Path prefixes (after the leading `/`) that skip the gate.
const PUBLIC_PREFIXES: [&str; 7] = ["_next/static", "_next/image", "favicon.ico", "public", "login", "register", "api"];

#[must_use]
pub fn is_public_path(path: &str) -> bool {
    let relative = path.strip_prefix('/').unwrap_or(path);
    PUBLIC_PREFIXES
        .iter()
        .any(|prefix| relative.starts_with(prefix))
}

/// `/login?from=<url-encoded path>`.
#[must_use]
pub fn login_redirect_target(path: &str) -> String {
    format!("/login?from={}", urlencoding::encode(path))
}

/// Axum middleware; install with `axum::middleware::from_fn(require_session)`.
pub async fn require_session(mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    if is_public_path(&path) {
        return next.run(request).await;
    }

    let bearer = parse_cookies(request.headers())
        .auth_token
        .and_then(|token| HeaderValue::from_str(&format!("Bearer {token}")).ok());

    let Some(bearer) = bearer else {
        tracing::debug!(%path, "no session cookie, redirecting to login");
        return Redirect::temporary(&login_redirect_target(&path)).into_response();
    };

    request.headers_mut().insert(AUTHORIZATION, bearer);
    next.run(request).await
}

#[cfg(test)]
#[path = "middleware_test.rs"]
mod tests;
