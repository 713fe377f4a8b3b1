//! Error types for the capture clients.
//!
//! # Design
//! The remote service does not publish stable error codes, so `Service`
//! carries the status and the human-readable message it returned. Its
//! `Display` is the bare message: callers match on the text the service
//! produced, e.g. the invalid-token notice or `net::ERR_NAME_NOT_RESOLVED`.

use thiserror::Error;

/// Errors returned by the capture clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP exchange itself failed (DNS, connect, timeout, truncated body).
    #[error("{0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The service answered with status >= 300.
    #[error("{message}")]
    Service { status: u16, message: String },

    /// A structured-mode body could not be deserialized into a `CaptureResult`.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// Raw image bytes were not a recognized image format.
    #[error("image decode failed: {0}")]
    ImageDecode(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Client configuration is missing or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status of a `Service` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}
