//! Grepable error codes shared by HTTP error bodies and widget alerts.

use serde::Serialize;

/// Grepable error code and retryable flag for structured error responses.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// JSON error body returned by the HTTP API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ErrorBody {
    pub fn from_error<E: ErrorCode>(err: &E) -> Self {
        Self { code: err.error_code().to_owned(), message: err.to_string() }
    }
}
