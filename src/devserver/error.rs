//! Dev Server Error Types
//!
//! Defines error types for the dev server and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Dev server error types
#[derive(Error, Debug)]
pub enum DevServerError {
    /// The proxy target did not answer
    #[error("Upstream {target} unavailable: {error}")]
    Upstream { target: String, error: String },

    /// The request could not be mapped onto the proxy target
    #[error("Invalid proxy request: {0}")]
    BadTarget(String),

    /// Request body could not be read
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl IntoResponse for DevServerError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            DevServerError::Upstream { .. } => (StatusCode::BAD_GATEWAY, "UPSTREAM_UNAVAILABLE"),
            DevServerError::BadTarget(_) => (StatusCode::BAD_GATEWAY, "BAD_PROXY_TARGET"),
            DevServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            DevServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            DevServerError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        };

        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::error!(
            request_id = %request_id,
            error_code = %code,
            error_message = %self,
            "Dev server error occurred"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}
