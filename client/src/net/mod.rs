//! Networking modules for the gateway's REST surface.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` is the HTTP client with the response interceptor, `auth_service`
//! wraps the `/auth/*` endpoints behind the `AuthApi` trait.

pub mod api;
pub mod auth_service;
