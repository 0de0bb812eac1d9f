//! Unverified bearer-token inspection.
//!
//! DESIGN
//! ======
//! The gateway never holds the signing key, so it can only look inside a
//! token, not trust it. Every function here is total: structural problems come
//! back as [`MalformedToken`] and callers collapse that to "no claims". The
//! backend stays the only place a signature is checked.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::types::{Role, UserSession};

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_encode_padding(false)
    .with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// Token segments are normally URL-safe; the standard alphabet is a fallback.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// Why a token could not be inspected.
#[derive(Debug, thiserror::Error)]
pub enum MalformedToken {
    #[error("expected 3 dot-separated segments, found {0}")]
    SegmentCount(usize),
    #[error("payload segment is not base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload segment is not a JSON claims object: {0}")]
    Json(#[from] serde_json::Error),
}

/// Claims read from the payload segment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenPayload {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_roles")]
    pub roles: Vec<Role>,
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Every other claim, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenPayload {
    /// Project the claims into a client-safe user. Tokens without role claims
    /// are treated as plain users.
    #[must_use]
    pub fn to_user_session(&self) -> UserSession {
        let roles = if self.roles.is_empty() { vec![Role::User] } else { self.roles.clone() };
        UserSession {
            id: self.sub.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            name: self.name.clone().unwrap_or_default(),
            roles,
        }
    }
}

/// Non-array `roles` claims and unknown role tags are dropped, not rejected.
fn lenient_roles<'de, D>(deserializer: D) -> Result<Vec<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let Value::Array(items) = raw else {
        return Ok(Vec::new());
    };
    Ok(items
        .iter()
        .filter_map(Value::as_str)
        .filter_map(Role::parse)
        .collect())
}

/// Strings pass through; numbers and bools are stringified; anything else is dropped.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// NumericDate claims may be fractional; they are truncated to whole seconds.
/// Non-numeric values are dropped.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Number(n) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    #[allow(clippy::cast_possible_truncation)]
    let seconds = n.as_i64().or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64));
    Ok(seconds)
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_LENIENT
        .decode(segment)
        .or_else(|_| STANDARD_LENIENT.decode(segment))
}

fn split_segments(token: &str) -> Result<[&str; 3], MalformedToken> {
    let segments: Vec<&str> = token.split('.').collect();
    <[&str; 3]>::try_from(segments).map_err(|segments| MalformedToken::SegmentCount(segments.len()))
}

/// Structural check: exactly three segments, each decodable as base64.
/// The signature is not verified.
#[must_use]
pub fn is_valid_token(token: &str) -> bool {
    split_segments(token).is_ok_and(|segments| segments.iter().all(|s| decode_segment(s).is_ok()))
}

/// Decode the payload segment into claims without verifying the signature.
///
/// # Errors
///
/// Returns [`MalformedToken`] when the token does not have three segments, the
/// payload is not base64, or the decoded bytes are not a JSON claims object.
pub fn decode_payload(token: &str) -> Result<TokenPayload, MalformedToken> {
    let [_, payload, _] = split_segments(token)?;
    let bytes = decode_segment(payload)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Roles carried by the token, or none if it cannot be decoded.
#[must_use]
pub fn roles_of(token: &str) -> Vec<Role> {
    decode_payload(token)
        .map(|payload| payload.roles)
        .unwrap_or_default()
}

/// True when `required` is empty, or the token holds at least one of them.
#[must_use]
pub fn has_required_roles(token: Option<&str>, required: &[Role]) -> bool {
    if required.is_empty() {
        return true;
    }
    let Some(token) = token else {
        return false;
    };
    let held = roles_of(token);
    required.iter().any(|role| held.contains(role))
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
