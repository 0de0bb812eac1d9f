//! Request-scoped cookie store for the auth and CSRF tokens.
//!
//! DESIGN
//! ======
//! `CookieStore` wraps the request's `CookieJar` plus the configured `Secure`
//! default. Writes accumulate in the jar and only become `Set-Cookie` headers
//! when the store is returned as part of the response, so every write must
//! happen before the handler builds its response.
//!
//! Defaults: `HttpOnly`, `SameSite=Lax`, `Path=/`, 30-day `Max-Age`, and
//! `Secure` from config. The auth token tightens `SameSite` to `Strict`; the
//! CSRF token drops `HttpOnly` so page script can echo it back.

use std::convert::Infallible;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::response::{IntoResponseParts, ResponseParts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::state::AppState;

pub const AUTH_TOKEN_NAME: &str = "auth_token";
pub const CSRF_TOKEN_NAME: &str = "csrf_token";
pub const DEFAULT_MAX_AGE: Duration = Duration::days(30);
const DEFAULT_PATH: &str = "/";

/// Per-call overrides. `None` keeps the default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieOptions {
    pub http_only: Option<bool>,
    pub secure: Option<bool>,
    pub same_site: Option<SameSite>,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub max_age: Option<Duration>,
}

/// Cookie values read from an incoming request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCookies {
    pub auth_token: Option<String>,
    pub csrf_token: Option<String>,
}

/// Read the auth and CSRF cookies from raw request headers. Empty values
/// count as absent.
#[must_use]
pub fn parse_cookies(headers: &HeaderMap) -> ParsedCookies {
    let jar = CookieJar::from_headers(headers);
    let read = |name: &str| {
        jar.get(name)
            .map(Cookie::value)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    };
    ParsedCookies { auth_token: read(AUTH_TOKEN_NAME), csrf_token: read(CSRF_TOKEN_NAME) }
}

/// Caller's token: `Authorization: Bearer` header first, `auth_token`
/// cookie as fallback.
#[must_use]
pub fn request_token(headers: &HeaderMap) -> Option<String> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .map(str::to_owned);
    from_header.or_else(|| parse_cookies(headers).auth_token)
}

/// Fresh random CSRF token.
#[must_use]
pub fn generate_csrf_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Default)]
pub struct CookieStore {
    jar: CookieJar,
    secure: bool,
}

impl CookieStore {
    #[must_use]
    pub fn new(jar: CookieJar, secure: bool) -> Self {
        Self { jar, secure }
    }

    #[must_use]
    pub fn from_headers(headers: &HeaderMap, secure: bool) -> Self {
        Self::new(CookieJar::from_headers(headers), secure)
    }

    /// Write `name=value`, merging `options` over the defaults.
    pub fn set(&mut self, name: &str, value: &str, options: CookieOptions) {
        let mut cookie = Cookie::build((name.to_owned(), value.to_owned()))
            .http_only(options.http_only.unwrap_or(true))
            .secure(options.secure.unwrap_or(self.secure))
            .same_site(options.same_site.unwrap_or(SameSite::Lax))
            .path(options.path.unwrap_or_else(|| DEFAULT_PATH.to_owned()))
            .max_age(options.max_age.unwrap_or(DEFAULT_MAX_AGE));
        if let Some(domain) = options.domain {
            cookie = cookie.domain(domain);
        }
        self.jar = std::mem::take(&mut self.jar).add(cookie);
    }

    /// Current value, including writes made earlier in this request.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.jar
            .get(name)
            .map(Cookie::value)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    }

    /// Expire the cookie in the browser. Always emits a `Set-Cookie`, even if
    /// the request did not carry the cookie.
    pub fn delete(&mut self, name: &str) {
        self.set(name, "", CookieOptions { max_age: Some(Duration::ZERO), ..CookieOptions::default() });
    }

    pub fn set_auth_token(&mut self, token: &str) {
        self.set(
            AUTH_TOKEN_NAME,
            token,
            CookieOptions { same_site: Some(SameSite::Strict), ..CookieOptions::default() },
        );
    }

    #[must_use]
    pub fn get_auth_token(&self) -> Option<String> {
        self.get(AUTH_TOKEN_NAME)
    }

    pub fn delete_auth_token(&mut self) {
        self.delete(AUTH_TOKEN_NAME);
    }

    pub fn set_csrf_token(&mut self, token: &str) {
        self.set(CSRF_TOKEN_NAME, token, CookieOptions { http_only: Some(false), ..CookieOptions::default() });
    }

    #[must_use]
    pub fn get_csrf_token(&self) -> Option<String> {
        self.get(CSRF_TOKEN_NAME)
    }
}

impl<S> FromRequestParts<S> for CookieStore
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        Ok(Self::from_headers(&parts.headers, app_state.config.cookie_secure))
    }
}

impl IntoResponseParts for CookieStore {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.jar.into_response_parts(res)
    }
}

#[cfg(test)]
#[path = "cookies_test.rs"]
mod tests;
