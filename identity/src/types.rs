//! Credentials, roles, and the client-safe user projection.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// ROLE
// =============================================================================

/// Authorization tag carried in token claims and user projections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Parse the wire spelling (`"USER"`, `"ADMIN"`). Unknown tags yield `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "USER" => Some(Self::User),
            "ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// USER SESSION
// =============================================================================

/// Non-sensitive projection of an authenticated identity, safe to hand to
/// client code and to persist across reloads.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl UserSession {
    #[must_use]
    pub fn has_any_role(&self, wanted: &[Role]) -> bool {
        wanted.iter().any(|role| self.roles.contains(role))
    }
}

// =============================================================================
// CREDENTIALS
// =============================================================================

/// Login form payload. Browser forms may post the identifier as `email`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    #[serde(alias = "email")]
    pub identifier: String,
    pub password: String,
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Registration form payload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterCredentials {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for RegisterCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterCredentials")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// ROUTE CONFIG
// =============================================================================

/// Gate applied to a protected page or handler.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteConfig {
    /// Reject callers that carry no token at all.
    pub require_auth: bool,
    /// Caller must hold at least one of these. Empty means no role check.
    pub roles: Vec<Role>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
