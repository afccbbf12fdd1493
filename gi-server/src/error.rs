//! HTTP error mapping
//!
//! Validation failures become 400, missing resources 404, and every other
//! failure a 500 whose detail is logged but never sent to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gi_common::ValidationError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(ValidationError),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Anything else (500)
    #[error(transparent)]
    Internal(gi_common::Error),
}

impl From<gi_common::Error> for ApiError {
    fn from(err: gi_common::Error) -> Self {
        match err {
            gi_common::Error::Validation(v) => ApiError::BadRequest(v),
            gi_common::Error::NotFound(what) => ApiError::NotFound(what),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(v) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", v.to_string()),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, "NOT_FOUND", what),
            ApiError::Internal(err) => {
                error!("Request failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
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
