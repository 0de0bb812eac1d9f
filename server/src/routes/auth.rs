//! Auth routes: login, register, logout, and current-user lookup.
//!
//! DESIGN
//! ======
//! Each handler is a stateless translation over the external backend. The
//! bearer token never leaves the gateway in a response body: login moves it
//! into the `auth_token` cookie, and later calls read it back from there.
//! Backend rejections (non-2xx) are passed through with their status and
//! body; transport failures become a generic 500 via [`GatewayError`], and
//! unreadable request bodies a JSON 4xx.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use identity::{LoginCredentials, RegisterCredentials, Role, decode_payload};
use serde_json::Value;

use crate::cookies::{CookieStore, request_token};
use crate::error::{GatewayError, message_response};
use crate::services::backend::{UpstreamRequest, UpstreamResponse};
use crate::services::envelope::{extract_token, project_user, strip_token};
use crate::state::AppState;

pub const LOGOUT_MESSAGE: &str = "Logged out successfully";
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";
pub const USER_FETCH_FAILED_MESSAGE: &str = "Failed to fetch user data";

/// Relay a backend rejection unchanged.
fn passthrough(upstream: UpstreamResponse) -> Response {
    (upstream.status, Json(upstream.body)).into_response()
}

fn to_json(value: impl serde::Serialize) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/auth/login`: exchange credentials for the auth cookie.
pub async fn login(
    State(state): State<AppState>,
    mut cookies: CookieStore,
    body: Result<Json<LoginCredentials>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let Json(credentials) = body?;
    let upstream = state
        .backend
        .send(UpstreamRequest::post("/auth/login", to_json(&credentials)))
        .await?;
    if !upstream.is_success() {
        tracing::info!(status = %upstream.status, "login rejected by backend");
        return Ok(passthrough(upstream));
    }

    let token = extract_token(&upstream.body).ok_or(GatewayError::MissingToken)?;
    cookies.set_auth_token(&token);

    let mut body = strip_token(&upstream.body);
    if let Some(root) = body.as_object_mut() {
        let has_user = root.get("user").is_some_and(Value::is_object)
            || root
                .get("data")
                .and_then(|data| data.get("user"))
                .is_some_and(Value::is_object);
        if !has_user {
            match decode_payload(&token) {
                Ok(claims) => {
                    root.insert("user".into(), to_json(claims.to_user_session()));
                }
                Err(e) => tracing::warn!(error = %e, "login token claims unreadable"),
            }
        }
    }

    Ok((cookies, Json(body)).into_response())
}

/// `POST /api/auth/register`: create an account. Never signs the user in.
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterCredentials>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let Json(credentials) = body?;
    let upstream = state
        .backend
        .send(UpstreamRequest::post("/auth/register", to_json(&credentials)))
        .await?;
    if !upstream.is_success() {
        return Ok(passthrough(upstream));
    }

    let mut user = project_user(&upstream.body, &[Role::User]);
    user.roles = vec![Role::User];
    Ok(Json(serde_json::json!({ "user": user })).into_response())
}

/// `POST /api/auth/logout`: clear the auth cookie. Always succeeds.
pub async fn logout(State(state): State<AppState>, mut cookies: CookieStore) -> Response {
    if let Some(token) = cookies.get_auth_token() {
        let notify = UpstreamRequest::new(Method::POST, "/auth/logout").with_bearer(&token);
        match state.backend.send(notify).await {
            Ok(upstream) if !upstream.is_success() => {
                tracing::debug!(status = %upstream.status, "backend logout not acknowledged");
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "backend logout notify failed"),
        }
    }

    cookies.delete_auth_token();
    (cookies, Json(serde_json::json!({ "message": LOGOUT_MESSAGE }))).into_response()
}

/// `GET /api/auth/me`: current user, via the bearer header or the cookie.
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, GatewayError> {
    let Some(token) = request_token(&headers) else {
        return Ok(message_response(StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE));
    };

    let upstream = state
        .backend
        .send(UpstreamRequest::get("/users/me").with_bearer(&token))
        .await?;
    if !upstream.is_success() {
        return Ok(message_response(upstream.status, USER_FETCH_FAILED_MESSAGE));
    }

    let user = project_user(&upstream.body, &[Role::User]);
    Ok(Json(serde_json::json!({ "user": user })).into_response())
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
