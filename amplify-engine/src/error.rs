//! Error types for the HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
///
/// Rendered as `{"detail": <message>, "code": <MACHINE_CODE>}`, the shape
/// the dashboard reads error messages from.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Conflict (409)
    #[error("{0}")]
    Conflict(String),

    /// Catalog collaborator unreachable or misconfigured (503)
    #[error("{0}")]
    UpstreamUnavailable(String),

    /// Persistence failure (500)
    #[error("{0}")]
    Storage(String),

    /// Internal server error (500)
    #[error("{0}")]
    Internal(String),
}

impl From<amplify_common::Error> for ApiError {
    fn from(err: amplify_common::Error) -> Self {
        use amplify_common::Error;
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::InvalidArgument(msg) => ApiError::BadRequest(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::UpstreamUnavailable(msg) => ApiError::UpstreamUnavailable(msg),
            Error::Storage(msg) => ApiError::Storage(msg),
            Error::Io(e) => ApiError::Storage(e.to_string()),
            Error::Config(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::UpstreamUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "UPSTREAM_UNAVAILABLE")
            }
            ApiError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        if status.is_server_error() {
            tracing::error!(code = error_code, "{}", self);
        }

        let body = Json(json!({
            "detail": self.to_string(),
            "code": error_code,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
