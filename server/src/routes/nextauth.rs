//! NextAuth-compatible credentials endpoints.
//!
//! Lets a NextAuth client sign in against the same backend: fetch a CSRF
//! token, post form credentials to the callback, then read the session. The
//! session is derived from the `auth_token` cookie claims; nothing is stored
//! server-side.

use axum::Form;
use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use identity::{LoginCredentials, TokenPayload, UserSession, decode_payload};
use serde::Deserialize;
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::cookies::{CookieStore, DEFAULT_MAX_AGE, generate_csrf_token};
use crate::error::{GatewayError, message_response};
use crate::services::backend::UpstreamRequest;
use crate::services::envelope::{extract_token, payload, project_user};
use crate::state::AppState;

pub const INVALID_CSRF_MESSAGE: &str = "Invalid CSRF token";

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "csrfToken")]
    pub csrf_token: Option<String>,
}

fn unauthorized_null() -> Response {
    (StatusCode::UNAUTHORIZED, Json(Value::Null)).into_response()
}

/// Session user as NextAuth reports it: roles are exactly the claim, possibly empty.
fn session_user(claims: &TokenPayload) -> UserSession {
    UserSession { roles: claims.roles.clone(), ..claims.to_user_session() }
}

/// `exp` as RFC 3339, or a full cookie lifetime from now when absent.
fn session_expiry(claims: &TokenPayload, now: OffsetDateTime) -> Option<String> {
    let expires = match claims.exp {
        Some(exp) => OffsetDateTime::from_unix_timestamp(exp).ok()?,
        None => now + DEFAULT_MAX_AGE,
    };
    expires.format(&Rfc3339).ok()
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /api/auth/csrf`: reuse the CSRF cookie or mint a new one.
pub async fn csrf(mut cookies: CookieStore) -> Response {
    let token = match cookies.get_csrf_token() {
        Some(token) => token,
        None => {
            let token = generate_csrf_token();
            cookies.set_csrf_token(&token);
            token
        }
    };
    (cookies, Json(serde_json::json!({ "csrfToken": token }))).into_response()
}

/// `POST /api/auth/callback/credentials`: form sign-in.
pub async fn callback_credentials(
    State(state): State<AppState>,
    mut cookies: CookieStore,
    form: Result<Form<CredentialsForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => return GatewayError::from(rejection).into_response(),
    };
    let csrf_matches = matches!(
        (cookies.get_csrf_token(), form.csrf_token.as_deref()),
        (Some(expected), Some(given)) if expected == given
    );
    if !csrf_matches {
        return message_response(StatusCode::FORBIDDEN, INVALID_CSRF_MESSAGE);
    }

    let (Some(email), Some(password)) = (
        form.email.filter(|v| !v.is_empty()),
        form.password.filter(|v| !v.is_empty()),
    ) else {
        return unauthorized_null();
    };

    let credentials = LoginCredentials { identifier: email, password };
    let body = match serde_json::to_value(&credentials) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "credentials encode failed");
            return unauthorized_null();
        }
    };
    let upstream = match state.backend.send(UpstreamRequest::post("/auth/login", body)).await {
        Ok(upstream) if upstream.is_success() => upstream,
        Ok(upstream) => {
            tracing::info!(status = %upstream.status, "credentials sign-in rejected");
            return unauthorized_null();
        }
        Err(e) => {
            tracing::error!(error = %e, "credentials sign-in failed");
            return unauthorized_null();
        }
    };

    let Some(token) = extract_token(&upstream.body) else {
        tracing::error!("credentials sign-in succeeded without a token");
        return unauthorized_null();
    };
    cookies.set_auth_token(&token);

    let user = match payload(&upstream.body).get("user") {
        Some(user @ Value::Object(_)) => project_user(user, &[]),
        _ => decode_payload(&token).map(|claims| session_user(&claims)).unwrap_or_default(),
    };
    (cookies, Json(serde_json::json!({ "user": user }))).into_response()
}

/// `GET /api/auth/session`: `{user, expires}` or `{}`.
pub async fn session(cookies: CookieStore) -> Response {
    let now = OffsetDateTime::now_utc();
    let session = cookies
        .get_auth_token()
        .and_then(|token| decode_payload(&token).ok())
        .filter(|claims| claims.exp.is_none_or(|exp| exp > now.unix_timestamp()))
        .and_then(|claims| {
            let expires = session_expiry(&claims, now)?;
            Some(serde_json::json!({ "user": session_user(&claims), "expires": expires }))
        });
    Json(session.unwrap_or_else(|| serde_json::json!({}))).into_response()
}

#[cfg(test)]
#[path = "nextauth_test.rs"]
mod tests;
