//! Gateway error responses.
//!
//! ERROR HANDLING
//! ==============
//! Route handlers never let a transport or decoding failure reach Axum as-is.
//! Everything funnels through [`GatewayError`], which logs the cause and
//! answers a generic `500 {"message": "Internal server error"}`. Request
//! bodies that fail to extract answer `{"message": "Invalid request body"}`
//! with the extractor's 4xx status.

use axum::Json;
use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::services::backend::BackendError;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("backend login succeeded without a token")]
    MissingToken,
    #[error("json body rejected: {0}")]
    Json(#[from] JsonRejection),
    #[error("form body rejected: {0}")]
    Form(#[from] FormRejection),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let rejected = match &self {
            Self::Json(rejection) => Some(rejection.status()),
            Self::Form(rejection) => Some(rejection.status()),
            Self::Backend(_) | Self::MissingToken => None,
        };
        if let Some(status) = rejected {
            tracing::info!(error = %self, "request body rejected");
            return message_response(status, INVALID_BODY_MESSAGE);
        }
        tracing::error!(error = %self, "proxy call failed");
        message_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
    }
}

/// `{"message": ...}` with the given status.
pub fn message_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "message": message }))).into_response()
}
