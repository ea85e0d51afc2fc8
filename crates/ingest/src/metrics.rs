//! Ingest metrics
//!
//! Cheap atomic counters recorded on the hot path and snapshotted for
//! diagnostics. These are process-local; the persistent usage
//! statistics live in the statistics table.

use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(test)]
#[path = "metrics_test.rs"]
mod tests;

/// Counters for one ingest service instance
#[derive(Debug, Default)]
pub struct IngestMetrics {
    readings_queued: AtomicU64,
    batches_flushed: AtomicU64,
    readings_appended: AtomicU64,
    readings_filtered_out: AtomicU64,
    readings_discarded: AtomicU64,
    append_failures: AtomicU64,
}

/// Point-in-time view of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub readings_queued: u64,
    pub batches_flushed: u64,
    pub readings_appended: u64,
    pub readings_filtered_out: u64,
    pub readings_discarded: u64,
    pub append_failures: u64,
}

impl IngestMetrics {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record readings accepted onto the queue
    #[inline]
    pub fn record_queued(&self, count: u64) {
        self.readings_queued.fetch_add(count, Ordering::Relaxed);
    }

    /// Record one drained batch
    #[inline]
    pub fn record_batch_flushed(&self) {
        self.batches_flushed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record readings appended to storage
    #[inline]
    pub fn record_appended(&self, count: u64) {
        self.readings_appended.fetch_add(count, Ordering::Relaxed);
    }

    /// Record readings removed by the filter pipeline
    #[inline]
    pub fn record_filtered_out(&self, count: u64) {
        self.readings_filtered_out.fetch_add(count, Ordering::Relaxed);
    }

    /// Record readings dropped after a storage failure
    #[inline]
    pub fn record_discarded(&self, count: u64) {
        self.readings_discarded.fetch_add(count, Ordering::Relaxed);
        self.append_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a consistent-enough snapshot of the counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            readings_queued: self.readings_queued.load(Ordering::Relaxed),
            batches_flushed: self.batches_flushed.load(Ordering::Relaxed),
            readings_appended: self.readings_appended.load(Ordering::Relaxed),
            readings_filtered_out: self.readings_filtered_out.load(Ordering::Relaxed),
            readings_discarded: self.readings_discarded.load(Ordering::Relaxed),
            append_failures: self.append_failures.load(Ordering::Relaxed),
        }
    }
}
