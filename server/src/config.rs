//! Gateway configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SITE_DIR: &str = "public";
pub const DEFAULT_BACKEND_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BACKEND_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),
    #[error("invalid {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Backend API base URL, without a trailing slash.
    pub api_url: String,
    pub port: u16,
    /// `Secure` attribute default for every cookie the gateway writes.
    pub cookie_secure: bool,
    /// Static site served behind the session middleware.
    pub site_dir: PathBuf,
    pub timeouts: BackendTimeouts,
}

impl GatewayConfig {
    /// Build typed gateway config from the process environment.
    ///
    /// Required:
    /// - `API_URL`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `COOKIE_SECURE`: bool; otherwise secure when `APP_ENV`/`NODE_ENV` is `production`
    /// - `SITE_DIR`: default `public`
    /// - `BACKEND_REQUEST_TIMEOUT_SECS`: default 30
    /// - `BACKEND_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `API_URL` is missing or `PORT` does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`GatewayConfig::from_env`] over an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `API_URL` is missing or `PORT` does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("API_URL")
            .map(|raw| raw.trim().trim_end_matches('/').to_owned())
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::Missing("API_URL"))?;

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { var: "PORT", value: raw })?,
            None => DEFAULT_PORT,
        };

        let cookie_secure = lookup("COOKIE_SECURE")
            .as_deref()
            .and_then(parse_bool)
            .unwrap_or_else(|| is_production(&lookup));

        let site_dir = lookup("SITE_DIR").map_or_else(|| PathBuf::from(DEFAULT_SITE_DIR), PathBuf::from);

        let timeouts = BackendTimeouts {
            request_secs: parse_u64_or(
                lookup("BACKEND_REQUEST_TIMEOUT_SECS"),
                DEFAULT_BACKEND_REQUEST_TIMEOUT_SECS,
            ),
            connect_secs: parse_u64_or(
                lookup("BACKEND_CONNECT_TIMEOUT_SECS"),
                DEFAULT_BACKEND_CONNECT_TIMEOUT_SECS,
            ),
        };

        Ok(Self { api_url, port, cookie_secure, site_dir, timeouts })
    }
}

fn is_production<F>(lookup: &F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup("APP_ENV")
        .or_else(|| lookup("NODE_ENV"))
        .is_some_and(|env| env.trim().eq_ignore_ascii_case("production"))
}

fn parse_u64_or(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
