//! Filter error types

use thiserror::Error;

/// Errors that can occur building or reconfiguring filters
#[derive(Debug, Error)]
pub enum FilterError {
    /// Invalid configuration document
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Filter type not present in the registry
    #[error("unknown filter type '{0}'")]
    UnknownType(String),

    /// No filter in the pipeline carries this category name
    #[error("no filter for category '{0}'")]
    UnknownCategory(String),

    /// Persisted state blob could not be restored
    #[error("failed to restore persisted state: {0}")]
    Persistence(String),
}

impl FilterError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }
}

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;
