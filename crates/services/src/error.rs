//! Shared error types for the services crate.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors emitted by backend adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("unexpected payload: {0}")]
    Payload(#[from] lms_core::Error),
    #[error("invalid endpoint: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// True for 404 responses.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid {var} value {raw:?}: {reason}")]
    Invalid {
        var: &'static str,
        raw: String,
        reason: String,
    },
}
