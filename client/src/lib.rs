//! # client
//!
//! Session-side half of the auth relay: a cookie-keeping HTTP client for the
//! gateway, the auth session store with persistence, the shared API error
//! tracker, and route-guard helpers. UI layers sit on top of [`ClientSession`].

pub mod config;
pub mod net;
pub mod session;
pub mod state;
pub mod util;

pub use session::ClientSession;
