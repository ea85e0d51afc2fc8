//! Management client error types

use thiserror::Error;

/// Errors surfaced by the management client
#[derive(Debug, Error)]
pub enum ManagementError {
    /// Request to the management API failed
    #[error("management request failed: {0}")]
    Request(String),

    /// Category does not exist
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// Payload could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for management operations
pub type ManagementResult<T> = Result<T, ManagementError>;
