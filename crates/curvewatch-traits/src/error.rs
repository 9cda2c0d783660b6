//! Error types for source and sink operations.

use thiserror::Error;

/// Common error type for trait operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TraitError {
    /// Connection to an external service failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Requested resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation timed out
    #[error("timeout")]
    Timeout,

    /// Parse/deserialization error
    #[error("parse error: {0}")]
    ParseError(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A downstream sink refused a write
    #[error("publish failed: {0}")]
    PublishFailed(String),

    /// Configuration is unusable
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A source returned fewer items than it reported holding
    #[error("partial fetch: received {received} of {expected} items")]
    PartialFetch {
        /// Items accounted for (accepted plus rejected)
        received: usize,
        /// Items the source claims to hold
        expected: usize,
    },

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for TraitError {
    fn from(e: std::io::Error) -> Self {
        TraitError::IoError(e.to_string())
    }
}

impl From<serde_json::Error> for TraitError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            TraitError::IoError(e.to_string())
        } else {
            TraitError::ParseError(e.to_string())
        }
    }
}
