//! Client configuration.

/// Used when `PUBLIC_API_URL` is unset or blank.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Gateway API base URL from `PUBLIC_API_URL`.
#[must_use]
pub fn api_base_url() -> String {
    api_base_url_from(|key| std::env::var(key).ok())
}

/// Same as [`api_base_url`] over an arbitrary lookup. Trailing slashes are
/// trimmed so paths can be appended with a leading `/`.
#[must_use]
pub fn api_base_url_from<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup("PUBLIC_API_URL")
        .map(|raw| raw.trim().trim_end_matches('/').to_owned())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_owned())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
