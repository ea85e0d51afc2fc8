//! Storage error types

use thiserror::Error;

/// Errors surfaced by storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend unreachable or connection dropped
    #[error("connection error: {0}")]
    Connection(String),

    /// Query or update rejected by the backend
    #[error("query error: {0}")]
    Query(String),

    /// Readings append rejected
    #[error("append rejected: {0}")]
    Append(String),

    /// Payload could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Anything else
    #[error("{0}")]
    Other(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
