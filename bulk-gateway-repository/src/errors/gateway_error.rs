//! Gateway error types.
//!
//! Per-item engine failures (not found, version conflict, bad script) are never
//! errors: they are normalized into `ActionResult`s. This type covers the failures
//! that abort a whole call: malformed caller input, oversized batches and transport
//! problems.

use bulk_gateway_shared::PayloadError;
use thiserror::Error;

/// Errors that abort a gateway call.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Malformed caller input, detected before any engine call.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Batch size exceeds the configured maximum.
    #[error("Batch size {provided} exceeds maximum {max}")]
    BatchSizeExceeded { provided: usize, max: usize },

    /// The engine endpoint could not be configured or reached.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// A request could not be delivered or no response was received.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Failed to read a response body.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl GatewayError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a batch size exceeded error.
    pub fn batch_size_exceeded(provided: usize, max: usize) -> Self {
        Self::BatchSizeExceeded { provided, max }
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::TransportError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }
}

impl From<PayloadError> for GatewayError {
    fn from(err: PayloadError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

impl From<opensearch::Error> for GatewayError {
    fn from(err: opensearch::Error) -> Self {
        Self::TransportError(err.to_string())
    }
}
