//! Ingest error types

use thiserror::Error;

/// Errors surfaced by the ingest service
///
/// Workers never propagate errors across the task boundary; transient
/// storage and management failures are recovered locally and show up
/// only in logs and counters. These variants cover the producer-facing
/// rejection and fatal startup paths.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The service is draining or terminated; the reading was not queued
    #[error("ingest is shutting down")]
    ShuttingDown,

    /// Operation not valid in the current lifecycle state
    #[error("invalid lifecycle state: {0}")]
    InvalidState(String),

    /// Invalid service configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Filter construction or restore failed at startup
    #[error("filter setup failed: {0}")]
    FilterSetup(#[from] inlet_filter::FilterError),

    /// Management call failed during startup
    #[error("management error: {0}")]
    Management(#[from] inlet_management::ManagementError),

    /// Storage call failed during startup
    #[error("storage error: {0}")]
    Storage(#[from] inlet_storage::StorageError),
}

/// Result type for ingest operations
pub type IngestResult<T> = Result<T, IngestError>;
