//! Error types with HTTP status code mapping.
//!
//! [`DrawError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and a JSON error body whose
//! `error` field the presentation layer shows verbatim.
//!
//! [`StoreError`] is raised by the persistence layer and surfaces to
//! clients as [`DrawError::Storage`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// JSON error response body.
///
/// ```json
/// { "error": "no eligible names remain in the pool", "code": 2001 }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// Numeric error code (see ranges on [`DrawError`]).
    pub code: u32,
}

/// Service error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                    |
/// |-----------|-----------------|--------------------------------|
/// | 1000–1999 | Request         | 400 Bad Request                |
/// | 2000–2999 | Lookup          | 404 Not Found / 401 Unauthorized |
/// | 3000–3999 | Server          | 500 Internal Server Error / 408 Request Timeout |
#[derive(Debug, thiserror::Error)]
pub enum DrawError {
    /// A required field was missing or blank.
    #[error("{0}")]
    Validation(String),

    /// The email already holds an assignment.
    #[error("a name has already been drawn for {0}; use recheck to see it")]
    DuplicateRegistrant(String),

    /// No eligible candidate remains for this registrant.
    #[error("no eligible names remain in the pool")]
    PoolExhausted,

    /// Recheck credentials did not match any assignment.
    #[error("invalid email or password")]
    Authentication,

    /// Reading or writing the persisted state failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// The request did not finish within the configured timeout.
    #[error("request timed out")]
    Timeout,
}

impl DrawError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::DuplicateRegistrant(_) => 1002,
            Self::PoolExhausted => 2001,
            Self::Authentication => 2002,
            Self::Storage(_) => 3001,
            Self::Timeout => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::DuplicateRegistrant(_) => StatusCode::BAD_REQUEST,
            Self::PoolExhausted => StatusCode::NOT_FOUND,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
        }
    }
}

impl IntoResponse for DrawError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.error_code(), error = %self, "request rejected");
        }
        let body = ErrorResponse {
            code: self.error_code(),
            error: self.to_string(),
        };
        (status, axum::Json(body)).into_response()
    }
}

/// Persistence layer failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// The stored document is not valid JSON of the expected shape.
    #[error("cannot decode pool document: {0}")]
    Decode(#[from] serde_json::Error),

    /// PostgreSQL failure.
    #[error("database failure: {0}")]
    Database(#[from] sqlx::Error),

    /// The document decoded but breaks a pool invariant.
    #[error("corrupt pool state: {0}")]
    Corrupt(String),

    /// No pool has been seeded at the configured location.
    #[error("pool state has not been seeded: {0}")]
    NotSeeded(String),

    /// The document changed between read and write.
    #[error("pool state changed concurrently (expected version {expected}, found {found})")]
    VersionConflict {
        /// Version the writer read.
        expected: u64,
        /// Version currently stored.
        found: u64,
    },
}

impl From<StoreError> for DrawError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}
