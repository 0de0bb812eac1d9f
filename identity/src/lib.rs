//! Shared identity model and bearer-token inspection.
//!
//! This crate owns the types exchanged between `server` (the gateway) and
//! `client` (the session-side library): credentials, the user session
//! projection, roles, and the unverified token codec. Nothing here performs
//! I/O, so both sides can depend on it freely.

pub mod token;
pub mod types;

pub use token::{MalformedToken, TokenPayload, decode_payload, has_required_roles, is_valid_token, roles_of};
pub use types::{LoginCredentials, RegisterCredentials, Role, RouteConfig, UserSession};
