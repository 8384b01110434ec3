//! Error types for faceoff-td
//!
//! Voting errors (duplicate, wrong state, invalid choice) and
//! tie-break errors (not tied, already resolved) are recoverable and
//! mapped to distinct HTTP statuses for user-facing display. Round
//! state-machine contract violations surface as conflicts.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - e.g., bracket already generated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// faceoff-common error
    #[error("{0}")]
    Common(#[from] faceoff_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use faceoff_common::Error as Common;

        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Io(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IO_ERROR",
                err.to_string(),
            ),
            ApiError::Other(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                err.to_string(),
            ),
            ApiError::Common(err) => match err {
                Common::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
                Common::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
                Common::InvalidChoice(msg) => (StatusCode::BAD_REQUEST, "INVALID_CHOICE", msg),
                Common::InvalidState(msg) => (StatusCode::CONFLICT, "INVALID_STATE", msg),
                Common::DuplicateVote(msg) => (StatusCode::CONFLICT, "DUPLICATE_VOTE", msg),
                Common::NotTied(msg) => (StatusCode::CONFLICT, "NOT_TIED", msg),
                Common::AlreadyResolved(msg) => (StatusCode::CONFLICT, "ALREADY_RESOLVED", msg),
                other => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    other.to_string(),
                ),
            },
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
