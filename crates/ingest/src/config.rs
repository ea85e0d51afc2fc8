//! Ingest service configuration

use std::time::Duration;

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

/// Default maximum time a partial batch waits before being flushed
const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default queue length that triggers an immediate flush
const DEFAULT_QUEUE_THRESHOLD: usize = 100;

/// Configuration for an [`IngestService`](crate::IngestService)
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Name of the hosting south service instance
    pub service_name: String,

    /// Name of the source plugin producing readings
    pub plugin_name: String,

    /// Queue length at which a flush is signalled
    pub queue_threshold: usize,

    /// Maximum time between flushes when the queue stays below threshold
    pub flush_timeout: Duration,

    /// Requeue a failed batch instead of discarding it
    ///
    /// Off by default: failed appends are counted under DISCARDED.
    pub requeue_on_failure: bool,
}

impl IngestConfig {
    /// Create a configuration with default tuning
    pub fn new(service_name: impl Into<String>, plugin_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            plugin_name: plugin_name.into(),
            queue_threshold: DEFAULT_QUEUE_THRESHOLD,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
            requeue_on_failure: false,
        }
    }

    /// Set the queue flush threshold
    pub fn with_queue_threshold(mut self, threshold: usize) -> Self {
        self.queue_threshold = threshold.max(1);
        self
    }

    /// Set the flush timeout
    pub fn with_flush_timeout(mut self, timeout: Duration) -> Self {
        self.flush_timeout = timeout;
        self
    }

    /// Enable or disable requeue-on-failure
    pub fn with_requeue_on_failure(mut self, requeue: bool) -> Self {
        self.requeue_on_failure = requeue;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.service_name.is_empty() {
            return Err("service_name must not be empty".to_string());
        }
        if self.plugin_name.is_empty() {
            return Err("plugin_name must not be empty".to_string());
        }
        if self.flush_timeout.is_zero() {
            return Err("flush_timeout must be greater than zero".to_string());
        }
        Ok(())
    }
}
