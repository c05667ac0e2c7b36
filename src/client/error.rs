//! Client Error Types

use thiserror::Error;

use crate::endpoints::EndpointError;

/// Errors that can occur when talking to the proposal service
#[derive(Error, Debug)]
pub enum ClientError {
    /// Could not connect to the backend
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// The backend answered with a non-2xx status
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// Rejected before anything was sent
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] EndpointError),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Classify a transport error
    pub(crate) fn from_transport(error: reqwest::Error, timeout_ms: u64) -> Self {
        if error.is_timeout() {
            ClientError::Timeout(timeout_ms)
        } else if error.is_connect() {
            ClientError::Unavailable(error.to_string())
        } else {
            ClientError::Request(error)
        }
    }

    /// HTTP status, for errors the backend answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
