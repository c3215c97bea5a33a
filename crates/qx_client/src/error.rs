//! Error types for the QX client
//!
//! Validation failures are raised before any request is sent. Transport
//! failures are passed through unchanged.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Result type for QX operations
pub type QxResult<T> = Result<T, QxError>;

/// Error object the server embeds in some response bodies
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerError {
    /// Error name
    #[serde(default)]
    pub name: String,

    /// Status reported by the server
    #[serde(default)]
    pub status: i64,

    /// Error message
    #[serde(default)]
    pub message: String,

    /// HTTP status code reported by the server
    #[serde(default)]
    pub status_code: i64,

    /// Error code
    #[serde(default)]
    pub code: String,
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "name: {} status: {} message: {} statusCode: {} code: {}",
            self.name, self.status, self.message, self.status_code, self.code
        )
    }
}

impl std::error::Error for ServerError {}

/// Body shape carrying a [`ServerError`]
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub(crate) error: Option<ServerError>,
}

/// Errors that can occur when talking to the QX API
#[derive(Debug, Error)]
pub enum QxError {
    /// Missing or rejected login material
    #[error("Invalid credentials: {0}")]
    Credentials(String),

    /// Backend name could not be resolved
    #[error("Could not find backend \"{backend}\" available; use available_backends to list options")]
    BadBackend {
        /// Name as requested by the caller
        backend: String,
    },

    /// Circuit needs more qubits than the device has
    #[error("Device register must be <= {max_qubits} qubits")]
    RegisterSize {
        /// Largest register the device supports
        max_qubits: u64,
    },

    /// Generic API failure (exhausted retries, invalid input)
    #[error("QX API error: {0}")]
    Api(String),

    /// Error object returned in a response body
    #[error("QX server error: {0}")]
    Server(ServerError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Proxy could not be configured
    #[error("Invalid proxy configuration: {0}")]
    InvalidProxy(String),

    /// HTTP transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded
    #[error("Failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    /// API URL could not be parsed
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,
}

impl QxError {
    /// Check if the caller can fix the request and try again
    pub fn is_caller_correctable(&self) -> bool {
        matches!(
            self,
            QxError::BadBackend { .. } | QxError::RegisterSize { .. } | QxError::Config(_)
        )
    }

    /// Check if the failure may go away on its own
    pub fn is_transient(&self) -> bool {
        matches!(self, QxError::Http(_) | QxError::Api(_))
    }
}
