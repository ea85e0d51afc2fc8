//! Statistics Aggregator - pending counters and batched updates
//!
//! Successfully appended readings are counted per asset and against
//! the global READINGS key; discarded readings accumulate under
//! DISCARDED. The stats worker drains the pending counters into one
//! batched, condition-qualified update per wake-up.
//!
//! # Design
//!
//! - State lives behind a `tokio::sync::Mutex` that the flush path
//!   holds across the storage call. That is sound only because there
//!   is exactly one stats worker; accumulation from the drain worker
//!   blocks briefly behind an in-flight flush, which is what makes a
//!   failed flush retry idempotent (no interleaved clear can lose
//!   counts)
//! - A pending key is present only while its count is positive
//! - The key cache records statistics rows known to exist; it only
//!   ever grows

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use inlet_storage::{
    Expression, ExpressionValues, InsertValues, Query, StorageClient, StorageResult, UpdateBatch,
    Where,
};
use tokio::sync::{Mutex, Notify};
use tokio_util::sync::CancellationToken;

#[cfg(test)]
#[path = "stats_test.rs"]
mod tests;

/// Table holding the persistent statistics rows
pub const STATISTICS_TABLE: &str = "statistics";

/// Key for the global appended-readings counter
pub const READINGS_KEY: &str = "READINGS";

/// Key for the global discarded-readings counter
pub const DISCARDED_KEY: &str = "DISCARDED";

/// Statistics key for an asset: `INGEST_` + uppercased asset name
pub fn stats_key(asset: &str) -> String {
    format!("INGEST_{}", asset.to_uppercase())
}

#[derive(Debug, Default)]
struct StatsState {
    /// Per-asset counts not yet reflected in storage
    pending: HashMap<String, u64>,

    /// Assets whose statistics row is known to exist
    key_cache: HashSet<String>,

    /// Readings dropped on storage failures, not yet flushed
    discarded: u64,
}

/// Pending statistics counters drained by the stats worker
pub struct StatsAggregator {
    storage: Arc<dyn StorageClient>,
    state: Mutex<StatsState>,
    signal: Notify,
}

impl StatsAggregator {
    /// Create an aggregator over the given storage client
    pub fn new(storage: Arc<dyn StorageClient>) -> Self {
        Self {
            storage,
            state: Mutex::new(StatsState::default()),
            signal: Notify::new(),
        }
    }

    /// Merge a batch's per-asset counts into the pending map
    ///
    /// Called by the drain worker after each successful append.
    /// Signals the stats worker.
    pub async fn accumulate(&self, counts: HashMap<String, u64>) {
        {
            let mut state = self.state.lock().await;
            for (asset, count) in counts {
                if count > 0 {
                    *state.pending.entry(asset).or_default() += count;
                }
            }
        }
        self.signal.notify_one();
    }

    /// Count readings dropped because storage rejected a batch
    ///
    /// Does not signal by itself; the drain worker signals after every
    /// batch regardless of outcome.
    pub async fn note_discards(&self, count: u64) {
        self.state.lock().await.discarded += count;
    }

    /// Wake the stats worker
    pub fn signal(&self) {
        self.signal.notify_one();
    }

    /// Total pending count not yet flushed (diagnostics)
    pub async fn pending_total(&self) -> u64 {
        let state = self.state.lock().await;
        state.pending.values().sum::<u64>() + state.discarded
    }

    /// One iteration of the stats worker
    ///
    /// Waits for a signal (skipped once shutdown is requested), then
    /// drains the pending counters into a single batched update. On
    /// failure the counters are preserved and retried on the next
    /// iteration.
    pub async fn flush_once(&self, cancel: &CancellationToken) {
        if !cancel.is_cancelled() {
            tokio::select! {
                _ = self.signal.notified() => {}
                _ = cancel.cancelled() => {}
            }
        }

        let mut state = self.state.lock().await;
        if state.pending.is_empty() && state.discarded == 0 {
            return;
        }

        // Lazily create statistics rows for assets seen for the first time
        let assets: Vec<String> = state
            .pending
            .keys()
            .filter(|a| !state.key_cache.contains(*a))
            .cloned()
            .collect();
        for asset in assets {
            match self.ensure_stats_row(&asset).await {
                Ok(()) => {
                    state.key_cache.insert(asset);
                }
                Err(e) => {
                    tracing::error!(asset = %asset, error = %e, "unable to create statistics row");
                }
            }
        }

        let mut updates = UpdateBatch::new();
        let mut readings_total: i64 = 0;
        for (asset, count) in &state.pending {
            if *count > 0 {
                updates.push(
                    ExpressionValues::new().with(Expression::add("value", *count as i64)),
                    Where::equals("key", stats_key(asset)),
                );
                readings_total += *count as i64;
            }
        }
        if readings_total > 0 {
            updates.push(
                ExpressionValues::new().with(Expression::add("value", readings_total)),
                Where::equals("key", READINGS_KEY),
            );
        }
        if state.discarded > 0 {
            updates.push(
                ExpressionValues::new().with(Expression::add("value", state.discarded as i64)),
                Where::equals("key", DISCARDED_KEY),
            );
        }
        if updates.is_empty() {
            return;
        }

        match self.storage.update_table(STATISTICS_TABLE, &updates).await {
            Ok(rows) => {
                tracing::debug!(
                    updates = updates.len(),
                    rows,
                    readings = readings_total,
                    discarded = state.discarded,
                    "statistics flushed"
                );
                state.pending.clear();
                state.discarded = 0;
            }
            Err(e) => {
                tracing::info!(error = %e, "statistics update failed, will retry on next iteration");
            }
        }
    }

    /// Create the `INGEST_<ASSET>` row if it does not exist yet
    async fn ensure_stats_row(&self, asset: &str) -> StorageResult<()> {
        let key = stats_key(asset);
        let query = Query::new(Where::equals("key", key.clone()));
        let result = self.storage.query_table(STATISTICS_TABLE, &query).await?;
        if result.is_empty() {
            let values = InsertValues::new()
                .with("key", key)
                .with("description", format!("Readings received from asset {asset}"))
                .with("value", 0)
                .with("previous_value", 0);
            self.storage.insert_table(STATISTICS_TABLE, &values).await?;
        }
        Ok(())
    }
}
