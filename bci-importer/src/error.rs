//! Error types for bci-importer
//!
//! Two layers:
//! - `ImportError`: pipeline failures, split into fatal (abort the run) and
//!   row-local (logged, the run continues)
//! - `ApiError`: HTTP surface errors with a JSON body

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Import pipeline error
#[derive(Debug, Error)]
pub enum ImportError {
    /// Missing upload or wrong declared file type (fatal)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Empty file or unparsable header row (fatal)
    #[error("Format error: {0}")]
    Format(String),

    /// Input stream cannot be opened or read (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Remote asset could not be retrieved (row-local)
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Retrieved asset could not be written to the asset directory (row-local)
    #[error("Write error: {0}")]
    Write(String),

    /// Asset could not be inserted into the asset store (row-local)
    #[error("Registration error: {0}")]
    Registration(String),

    /// Entity store failure during resolution or persistence (row-local)
    #[error("Store error: {0}")]
    Store(#[from] bci_common::Error),
}

impl ImportError {
    /// Fatal errors abort the whole run; all others only affect one row
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ImportError::Validation(_) | ImportError::Format(_) | ImportError::Io(_)
        )
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ImportError::Validation(_) => "VALIDATION_ERROR",
            ImportError::Format(_) => "FORMAT_ERROR",
            ImportError::Io(_) => "IO_ERROR",
            ImportError::Fetch(_) => "FETCH_ERROR",
            ImportError::Write(_) => "WRITE_ERROR",
            ImportError::Registration(_) => "REGISTRATION_ERROR",
            ImportError::Store(_) => "STORE_ERROR",
        }
    }
}

/// Result type for pipeline operations
pub type ImportResult<T> = Result<T, ImportError>;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Payload too large (413)
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Fatal import error
    #[error(transparent)]
    Import(#[from] ImportError),

    /// bci-common error
    #[error("Common error: {0}")]
    Common(#[from] bci_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg)
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Import(ref err) => {
                let status = match err {
                    ImportError::Validation(_) | ImportError::Format(_) => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.code(), err.to_string())
            }
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
            ),
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
