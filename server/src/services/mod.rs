//! Backend-facing services used by the gateway routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the backend transport and response-shape knowledge so
//! route handlers can stay focused on cookie and status translation.

pub mod backend;
pub mod envelope;
