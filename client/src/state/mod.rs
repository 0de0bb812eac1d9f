//! Client state containers.
//!
//! SYSTEM CONTEXT
//! ==============
//! `auth` holds the signed-in user and request status; `api_error` holds the
//! last server-side failure for display until dismissed.

pub mod api_error;
pub mod auth;
