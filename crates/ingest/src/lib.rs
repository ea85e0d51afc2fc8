//! Inlet - Ingest
//!
//! The south-side readings ingest core.
//!
//! # Overview
//!
//! An [`IngestService`] accepts readings from a producing plugin,
//! buffers them in a bounded-trigger queue, runs completed batches
//! through the configured filter pipeline, hands them to the storage
//! layer, and maintains per-asset tracking tuples and usage statistics
//! with at-most-once accounting per batch.
//!
//! # Architecture
//!
//! ```text
//!            ingest()                drain worker              stats worker
//! producer ───────────► [queue] ──swap──► [pipeline] ──► storage.reading_append
//!                                              │                   ▲
//!                                     tracker cache / counts       │
//!                                              │                   │
//!                                        [aggregator] ──flush── update_table
//! ```
//!
//! Two long-running workers are spawned by [`IngestService::start`]:
//! the drain worker empties the queue on size/timeout triggers, the
//! stats worker turns accumulated counters into batched statistics
//! updates. Shutdown is cooperative and drains both.

mod config;
mod error;
mod metrics;
mod queue;
mod service;
mod stats;
mod tracker;

pub use config::IngestConfig;
pub use error::{IngestError, IngestResult};
pub use metrics::{IngestMetrics, MetricsSnapshot};
pub use queue::ReadingQueue;
pub use service::{IngestService, State};
pub use stats::{stats_key, StatsAggregator, DISCARDED_KEY, READINGS_KEY, STATISTICS_TABLE};
pub use tracker::AssetTracker;
