use axum::Router;
use axum::body::Body;
use axum::http::StatusCode;
use axum::http::header::{COOKIE, LOCATION};
use axum::response::IntoResponse;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tower::ServiceExt;

use super::*;

fn token_with_roles(roles: &[&str]) -> String {
    let claims = serde_json::json!({ "sub": "u1", "roles": roles });
    format!("e30.{}.c2ln", URL_SAFE_NO_PAD.encode(claims.to_string()))
}

fn location(redirect: Redirect) -> String {
    let response = redirect.into_response();
    response.headers()[LOCATION].to_str().unwrap().to_owned()
}

// =============================================================================
// protect_server
// =============================================================================

#[test]
fn open_route_returns_token_as_is() {
    assert_eq!(protect_server(&RouteConfig::default(), None).unwrap(), None);
    assert_eq!(protect_server(&RouteConfig::default(), Some("t".into())).unwrap().as_deref(), Some("t"));
}

#[test]
fn required_auth_without_token_redirects_to_login() {
    let config = RouteConfig { require_auth: true, roles: Vec::new() };
    let redirect = protect_server(&config, None).unwrap_err();
    assert_eq!(location(redirect), LOGIN_PATH);
}

#[test]
fn missing_role_redirects_to_dashboard() {
    let config = RouteConfig { require_auth: true, roles: vec![Role::Admin] };
    let redirect = protect_server(&config, Some(token_with_roles(&["USER"]))).unwrap_err();
    assert_eq!(location(redirect), FORBIDDEN_FALLBACK_PATH);
}

#[test]
fn role_check_without_auth_requirement_still_needs_token() {
    let config = RouteConfig { require_auth: false, roles: vec![Role::User] };
    let redirect = protect_server(&config, None).unwrap_err();
    assert_eq!(location(redirect), FORBIDDEN_FALLBACK_PATH);
}

#[test]
fn held_role_passes() {
    let config = RouteConfig { require_auth: true, roles: vec![Role::Admin] };
    let token = token_with_roles(&["ADMIN"]);
    assert_eq!(protect_server(&config, Some(token.clone())).unwrap(), Some(token));
}

// =============================================================================
// page_config / guard_pages
// =============================================================================

#[test]
fn admin_pages_require_admin_role() {
    assert_eq!(page_config("/admin").roles, vec![Role::Admin]);
    assert!(page_config("/admin/users").require_auth);
    assert_eq!(page_config("/administrator"), RouteConfig::default());
    assert_eq!(page_config("/dashboard"), RouteConfig::default());
}

async fn call_guarded(path: &str, token: &str) -> axum::response::Response {
    let router = Router::new()
        .fallback(|| async { "page" })
        .layer(axum::middleware::from_fn(guard_pages));
    let request = axum::http::Request::builder()
        .uri(path)
        .header(COOKIE, format!("auth_token={token}"))
        .body(Body::empty())
        .unwrap();
    router.oneshot(request).await.unwrap()
}

#[tokio::test]
async fn guard_pages_sends_non_admin_to_dashboard() {
    let response = call_guarded("/admin/users", &token_with_roles(&["USER"])).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[LOCATION], FORBIDDEN_FALLBACK_PATH);
}

#[tokio::test]
async fn guard_pages_lets_admin_through() {
    let response = call_guarded("/admin/users", &token_with_roles(&["ADMIN"])).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn guard_pages_ignores_plain_pages() {
    let response = call_guarded("/dashboard", "opaque").await;
    assert_eq!(response.status(), StatusCode::OK);
}
