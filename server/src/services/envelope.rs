//! Readers for backend response bodies.
//!
//! The backend wraps most payloads as
//! `{status, message, data, timestamp, request_id}`, but some endpoints
//! answer with a bare object. Every reader here accepts both shapes.

use identity::{Role, UserSession};
use serde_json::{Map, Value};

/// The `data` member when it is an object, otherwise the body itself.
#[must_use]
pub fn payload(body: &Value) -> &Value {
    match body.get("data") {
        Some(data @ Value::Object(_)) => data,
        _ => body,
    }
}

/// Bearer token from `data.token`, falling back to a top-level `token`.
#[must_use]
pub fn extract_token(body: &Value) -> Option<String> {
    body.get("data")
        .and_then(|data| data.get("token"))
        .or_else(|| body.get("token"))
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
}

/// Copy of `body` with every token field removed.
#[must_use]
pub fn strip_token(body: &Value) -> Value {
    let mut stripped = body.clone();
    if let Some(data) = stripped.get_mut("data").and_then(Value::as_object_mut) {
        data.remove("token");
    }
    if let Some(root) = stripped.as_object_mut() {
        root.remove("token");
    }
    stripped
}

/// Build a user projection from a backend user object.
///
/// `name` falls back to `fullname`, then `username`. A missing or null
/// `roles` member yields `default_roles`; an explicit array is kept as-is
/// (unknown tags dropped).
#[must_use]
pub fn project_user(body: &Value, default_roles: &[Role]) -> UserSession {
    let empty = Map::new();
    let user = payload(body).as_object().unwrap_or(&empty);

    let roles = match user.get("roles") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(Role::parse)
            .collect(),
        _ => default_roles.to_vec(),
    };

    UserSession {
        id: user.get("id").map(scalar_to_string).unwrap_or_default(),
        email: user.get("email").map(scalar_to_string).unwrap_or_default(),
        name: ["name", "fullname", "username"]
            .iter()
            .find_map(|key| user.get(*key).and_then(Value::as_str))
            .unwrap_or_default()
            .to_owned(),
        roles,
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
#[path = "envelope_test.rs"]
mod tests;
