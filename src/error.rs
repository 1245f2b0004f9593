/// Unified error types for the blog server
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the blog server
#[derive(Error, Debug)]
pub enum BlogError {
    /// Database errors (the relational store is unreachable or failed)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Requested post or stored file does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Post has no image associated with it
    #[error("Post {0} has no image association")]
    NoAssociation(i64),

    /// Upload directory is unreachable or a filesystem operation failed
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// JSON error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for BlogError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            BlogError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "InvalidRequest",
                self.to_string(),
            ),
            BlogError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound", self.to_string()),
            BlogError::NoAssociation(_) => (
                StatusCode::NOT_FOUND,
                "NoAssociation",
                self.to_string(),
            ),
            BlogError::Database(_)
            | BlogError::StorageUnavailable(_)
            | BlogError::Internal(_)
            | BlogError::Io(_) => {
                tracing::error!("Request failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalServerError",
                    "Internal server error".to_string(), // Don't leak details
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for blog server operations
pub type BlogResult<T> = Result<T, BlogError>;
