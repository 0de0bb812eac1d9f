//! Last server-side API failure, shared between the interceptor and the UI.
//!
//! The tracker is a cloneable handle over one slot. The interceptor fills it
//! on 5xx responses; only an explicit [`ApiErrorTracker::clear_data`] empties
//! it again.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub error: Option<String>,
    #[serde(rename = "requestId")]
    pub request_id: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ApiErrorTracker {
    inner: Arc<Mutex<ApiErrorData>>,
}

impl ApiErrorTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, ApiErrorData> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_data(&self, data: ApiErrorData) {
        *self.slot() = data;
    }

    pub fn clear_data(&self) {
        *self.slot() = ApiErrorData::default();
    }

    #[must_use]
    pub fn data(&self) -> ApiErrorData {
        self.slot().clone()
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        self.slot().error.is_some()
    }
}

#[cfg(test)]
#[path = "api_error_test.rs"]
mod tests;
