use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;
use tower::ServiceExt;

use super::*;
use crate::services::backend::BackendError;
use crate::state::test_helpers::{MockBackend, test_app_state};

fn token_for(claims: &Value) -> String {
    format!("e30.{}.c2ln", URL_SAFE_NO_PAD.encode(claims.to_string()))
}

async fn send(backend: &Arc<MockBackend>, request: Request<Body>) -> Response {
    crate::routes::app(test_app_state(backend.clone()))
        .oneshot(request)
        .await
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_owned())
        .collect()
}

fn callback_request(form: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/auth/callback/credentials")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::from(form.to_owned())).unwrap()
}

fn session_request(cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/api/auth/session");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

// =============================================================================
// csrf
// =============================================================================

#[tokio::test]
async fn csrf_mints_and_sets_token() {
    let backend = Arc::new(MockBackend::new());
    let request = Request::builder().uri("/api/auth/csrf").body(Body::empty()).unwrap();

    let response = send(&backend, request).await;
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    let body = json_body(response).await;
    let token = body["csrfToken"].as_str().unwrap();
    assert!(cookies[0].starts_with(&format!("csrf_token={token}")));
}

#[tokio::test]
async fn csrf_reuses_existing_cookie() {
    let backend = Arc::new(MockBackend::new());
    let request = Request::builder()
        .uri("/api/auth/csrf")
        .header(COOKIE, "csrf_token=known")
        .body(Body::empty())
        .unwrap();

    let response = send(&backend, request).await;
    assert!(set_cookies(&response).is_empty());
    assert_eq!(json_body(response).await, json!({ "csrfToken": "known" }));
}

// =============================================================================
// callback/credentials
// =============================================================================

#[tokio::test]
async fn callback_rejects_csrf_mismatch() {
    let backend = Arc::new(MockBackend::new());

    let response = send(
        &backend,
        callback_request("email=a%40x.test&password=pw&csrfToken=wrong", Some("csrf_token=right")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(backend.recorded().is_empty());

    let response = send(&backend, callback_request("email=a%40x.test&password=pw&csrfToken=x", None)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn callback_missing_credentials_is_null_401() {
    let backend = Arc::new(MockBackend::new());

    let response = send(&backend, callback_request("email=a%40x.test&csrfToken=c", Some("csrf_token=c"))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await, Value::Null);
    assert!(backend.recorded().is_empty());
}

#[tokio::test]
async fn callback_non_form_body_is_json_error() {
    let backend = Arc::new(MockBackend::new());

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/callback/credentials")
        .header(CONTENT_TYPE, "application/json")
        .header(COOKIE, "csrf_token=c")
        .body(Body::from(r#"{"csrfToken":"c"}"#))
        .unwrap();
    let response = send(&backend, request).await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(json_body(response).await, json!({ "message": "Invalid request body" }));
    assert!(backend.recorded().is_empty());
}

#[tokio::test]
async fn callback_backend_rejection_is_null_401() {
    let backend = Arc::new(MockBackend::new().respond(StatusCode::UNAUTHORIZED, json!({ "message": "nope" })));

    let response = send(
        &backend,
        callback_request("email=a%40x.test&password=bad&csrfToken=c", Some("csrf_token=c")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());
    assert_eq!(json_body(response).await, Value::Null);
}

#[tokio::test]
async fn callback_transport_failure_is_null_401() {
    let backend = Arc::new(MockBackend::new().fail(BackendError::Request("refused".into())));

    let response = send(
        &backend,
        callback_request("email=a%40x.test&password=pw&csrfToken=c", Some("csrf_token=c")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn callback_success_sets_cookie_and_returns_user() {
    let token = token_for(&json!({ "sub": "u1" }));
    let backend = Arc::new(MockBackend::new().respond(
        StatusCode::OK,
        json!({ "token": token, "user": { "id": "u1", "email": "a@x.test", "name": "Ada" } }),
    ));

    let response = send(
        &backend,
        callback_request("email=a%40x.test&password=pw&csrfToken=c", Some("csrf_token=c")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with(&format!("auth_token={token}"))));
    assert_eq!(
        json_body(response).await,
        json!({ "user": { "id": "u1", "email": "a@x.test", "name": "Ada", "roles": [] } })
    );
    assert_eq!(
        backend.recorded()[0].body,
        Some(json!({ "identifier": "a@x.test", "password": "pw" }))
    );
}

// =============================================================================
// session
// =============================================================================

#[tokio::test]
async fn session_without_cookie_is_empty_object() {
    let backend = Arc::new(MockBackend::new());
    let response = send(&backend, session_request(None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({}));
}

#[tokio::test]
async fn session_with_garbage_cookie_is_empty_object() {
    let backend = Arc::new(MockBackend::new());
    let response = send(&backend, session_request(Some("auth_token=not-a-token"))).await;
    assert_eq!(json_body(response).await, json!({}));
}

#[tokio::test]
async fn session_reports_claims_and_expiry() {
    let token = token_for(&json!({
        "sub": "u1", "email": "a@x.test", "name": "Ada", "roles": ["ADMIN"], "exp": 4_102_444_800_i64
    }));
    let backend = Arc::new(MockBackend::new());

    let response = send(&backend, session_request(Some(&format!("auth_token={token}")))).await;
    assert_eq!(
        json_body(response).await,
        json!({
            "user": { "id": "u1", "email": "a@x.test", "name": "Ada", "roles": ["ADMIN"] },
            "expires": "2100-01-01T00:00:00Z"
        })
    );
}

#[tokio::test]
async fn session_with_expired_claims_is_empty_object() {
    let token = token_for(&json!({ "sub": "u1", "exp": 1 }));
    let backend = Arc::new(MockBackend::new());

    let response = send(&backend, session_request(Some(&format!("auth_token={token}")))).await;
    assert_eq!(json_body(response).await, json!({}));
}

#[test]
fn session_expiry_defaults_to_cookie_lifetime() {
    let now = OffsetDateTime::from_unix_timestamp(0).unwrap();
    let claims = TokenPayload::default();
    assert_eq!(session_expiry(&claims, now).as_deref(), Some("1970-01-31T00:00:00Z"));
}

#[test]
fn session_user_keeps_empty_roles() {
    let claims = TokenPayload { sub: Some("u1".into()), ..TokenPayload::default() };
    assert!(session_user(&claims).roles.is_empty());
}
