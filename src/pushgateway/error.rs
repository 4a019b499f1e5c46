//! Pushgateway error definitions.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while talking to the Pushgateway.
#[derive(Debug, Error)]
pub enum PushgatewayError {
    /// Connection, timeout or body transfer failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a status other than the expected one.
    #[error("HTTP response: {status}")]
    UnexpectedStatus { status: StatusCode },

    /// The Query API reported a non-success status.
    #[error("Query API status: {0}")]
    ApiStatus(String),

    /// The Query API payload did not have the expected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The key does not start with the primary label.
    #[error("Key without {primary}/ prefix: {key}")]
    InvalidKey { key: String, primary: String },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for Pushgateway operations.
pub type PushgatewayResult<T> = Result<T, PushgatewayError>;
