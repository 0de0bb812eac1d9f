//! Utility helpers shared across client modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! `persistence` isolates key/value storage so stores stay testable;
//! `auth` holds the route-guard decisions.

pub mod auth;
pub mod persistence;
