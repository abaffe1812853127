//! API error types.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    // 400 Bad Request
    #[error("Request body could not be read")]
    UnreadableBody(#[source] axum::Error),

    // 404 Not Found
    #[error("{0} not found")]
    NotFound(String),

    // 413 Payload Too Large
    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },
}

impl ApiError {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnreadableBody(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// Get error code for client handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnreadableBody(_) => "unreadable_body",
            Self::NotFound(_) => "not_found",
            Self::PayloadTooLarge { .. } => "payload_too_large",
        }
    }
}
