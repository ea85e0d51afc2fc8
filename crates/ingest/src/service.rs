//! Ingest Service - the coordinator owning queue, pipeline, and workers
//!
//! Owns the reading queue, the filter pipeline, the asset tracker
//! cache, and the statistics aggregator, and runs the two worker
//! tasks that connect them: the drain worker (queue → pipeline →
//! storage) and the stats worker (pending counters → statistics
//! table).
//!
//! # Lifecycle
//!
//! ```text
//! Created ──start()──► Running ──shutdown()──► Draining ──► Terminated
//! ```
//!
//! Filters are attached while `Created`; the pipeline is built once
//! and only reconfigured in place afterwards. `shutdown()` closes the
//! queue (later enqueues are rejected), drains both workers, flushes
//! statistics a final time, and persists filter state blobs.

use std::collections::HashMap;
use std::sync::Arc;

use inlet_filter::{Filter, FilterError, Pipeline};
use inlet_management::{ConfigHandler, ConfigListener, ManagementClient, TrackingTuple};
use inlet_protocol::{Reading, ReadingSet};
use inlet_storage::{PluginDataStore, StorageClient};
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    AssetTracker, IngestConfig, IngestError, IngestMetrics, IngestResult, MetricsSnapshot,
    ReadingQueue, StatsAggregator,
};

#[cfg(test)]
#[path = "service_test.rs"]
mod tests;

/// Lifecycle state of an ingest service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Constructed; filters may be attached, workers not running
    Created,
    /// Workers active, readings accepted
    Running,
    /// Shutdown requested, queue closed, workers draining
    Draining,
    /// Workers joined, resources released
    Terminated,
}

struct Inner {
    config: IngestConfig,
    storage: Arc<dyn StorageClient>,
    mgmt: Arc<dyn ManagementClient>,
    queue: ReadingQueue,
    pipeline: RwLock<Pipeline>,
    tracker: tokio::sync::Mutex<AssetTracker>,
    stats: StatsAggregator,
    metrics: IngestMetrics,
    cancel: CancellationToken,
}

/// The ingest coordinator
///
/// Producers call [`ingest`](IngestService::ingest) /
/// [`ingest_batch`](IngestService::ingest_batch); no storage,
/// management, or filter error ever escapes those calls. The only
/// producer-visible failure is the rejection of readings enqueued
/// after shutdown.
pub struct IngestService {
    inner: Arc<Inner>,
    plugin_data: PluginDataStore,
    state: Mutex<State>,
    drain_task: Mutex<Option<JoinHandle<()>>>,
    stats_task: Mutex<Option<JoinHandle<()>>>,
}

impl IngestService {
    /// Create a service in the `Created` state
    pub fn new(
        config: IngestConfig,
        storage: Arc<dyn StorageClient>,
        mgmt: Arc<dyn ManagementClient>,
    ) -> IngestResult<Self> {
        config.validate().map_err(IngestError::Config)?;

        let inner = Arc::new(Inner {
            queue: ReadingQueue::new(config.queue_threshold),
            pipeline: RwLock::new(Pipeline::empty()),
            tracker: tokio::sync::Mutex::new(AssetTracker::new(
                config.service_name.as_str(),
                config.plugin_name.as_str(),
                mgmt.clone(),
            )),
            stats: StatsAggregator::new(storage.clone()),
            metrics: IngestMetrics::new(),
            cancel: CancellationToken::new(),
            storage: storage.clone(),
            mgmt,
            config,
        });

        Ok(Self {
            inner,
            plugin_data: PluginDataStore::new(storage),
            state: Mutex::new(State::Created),
            drain_task: Mutex::new(None),
            stats_task: Mutex::new(None),
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> State {
        *self.state.lock()
    }

    /// Snapshot of the process-local counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    /// Number of readings currently buffered
    pub fn queue_len(&self) -> usize {
        self.inner.queue.len()
    }

    /// Attach the filter pipeline
    ///
    /// Must be called before [`start`](IngestService::start). For each
    /// filter: fetches its up-to-date category and applies it,
    /// registers the category as a child of the service category,
    /// subscribes this service for its config changes, and restores
    /// the persisted state blob for filters that carry one. Any
    /// failure is fatal at startup.
    pub async fn attach_filters(
        self: &Arc<Self>,
        filters: Vec<Box<dyn Filter>>,
        config_handler: Option<&ConfigHandler>,
    ) -> IngestResult<()> {
        if self.state() != State::Created {
            return Err(IngestError::InvalidState(
                "filters must be attached before start".to_string(),
            ));
        }

        let mgmt = &self.inner.mgmt;
        let service = &self.inner.config.service_name;
        for filter in &filters {
            let category = mgmt.get_category(filter.name()).await?;
            filter.reconfigure(category.value())?;

            mgmt.add_child_categories(service, &[filter.name().to_string()])
                .await?;
            if let Some(handler) = config_handler {
                handler.register_category(self.clone(), filter.name());
            }

            if filter.persists_data() {
                let key = format!("{}{}", service, filter.name());
                if let Some(blob) = self.plugin_data.load(&key).await? {
                    filter.start_data(&blob)?;
                }
            }
        }

        tracing::info!(
            filters = ?filters.iter().map(|f| f.name().to_string()).collect::<Vec<_>>(),
            "filter pipeline attached"
        );
        *self.inner.pipeline.write() = Pipeline::new(filters);
        Ok(())
    }

    /// Populate the tracker cache and spawn the two workers
    pub async fn start(&self) -> IngestResult<()> {
        {
            let state = self.state.lock();
            if *state != State::Created {
                return Err(IngestError::InvalidState(format!(
                    "cannot start from {:?}",
                    *state
                )));
            }
        }

        self.inner.tracker.lock().await.populate().await;

        let drain = tokio::spawn(drain_loop(self.inner.clone()));
        let stats = tokio::spawn(stats_loop(self.inner.clone()));
        *self.drain_task.lock() = Some(drain);
        *self.stats_task.lock() = Some(stats);
        *self.state.lock() = State::Running;

        tracing::info!(
            service = %self.inner.config.service_name,
            plugin = %self.inner.config.plugin_name,
            threshold = self.inner.config.queue_threshold,
            timeout_ms = self.inner.config.flush_timeout.as_millis() as u64,
            "ingest service started"
        );
        Ok(())
    }

    /// Add one reading to the queue
    ///
    /// Rejected only once shutdown has been requested.
    pub fn ingest(&self, reading: Reading) -> IngestResult<()> {
        self.inner.queue.enqueue(reading)?;
        self.inner.metrics.record_queued(1);
        Ok(())
    }

    /// Add a batch of readings to the queue
    pub fn ingest_batch(&self, readings: Vec<Reading>) -> IngestResult<()> {
        let count = readings.len() as u64;
        self.inner.queue.enqueue_batch(readings)?;
        self.inner.metrics.record_queued(count);
        Ok(())
    }

    /// Deliver a configuration change to the filter it addresses
    ///
    /// Taking the pipeline write lock serializes the reconfigure
    /// against batch processing: no reading set is in flight while the
    /// filter swaps its configuration.
    pub fn config_change(&self, category: &str, config: &serde_json::Value) {
        let pipeline = self.inner.pipeline.write();
        match pipeline.reconfigure(category, config) {
            Ok(()) => {
                tracing::info!(category, "filter reconfigured");
            }
            Err(FilterError::UnknownCategory(_)) => {
                tracing::debug!(category, "config change for unknown category ignored");
            }
            Err(e) => {
                tracing::warn!(category, error = %e, "filter reconfigure rejected");
            }
        }
    }

    /// Drain and terminate the service
    ///
    /// Closes the queue (later enqueues are rejected), cancels and
    /// joins the drain worker, runs one final queue pass to own
    /// anything enqueued before the close, drains the stats worker and
    /// flushes a final time, then persists filter state blobs.
    /// Idempotent.
    pub async fn shutdown(&self) {
        {
            let mut state = self.state.lock();
            match *state {
                State::Draining | State::Terminated => return,
                _ => *state = State::Draining,
            }
        }
        tracing::info!(service = %self.inner.config.service_name, "ingest service draining");

        self.inner.queue.close();
        self.inner.cancel.cancel();

        let drain = self.drain_task.lock().take();
        if let Some(handle) = drain {
            let _ = handle.await;
        }

        // Readings enqueued after the drain worker's last pass but
        // before the close are still in the buffer; this pass owns them.
        self.inner.process_queue().await;

        self.inner.stats.signal();
        let stats = self.stats_task.lock().take();
        if let Some(handle) = stats {
            let _ = handle.await;
        }
        self.inner.stats.flush_once(&self.inner.cancel).await;

        let retained = self.inner.stats.pending_total().await;
        if retained > 0 {
            tracing::warn!(retained, "statistics counters retained at shutdown");
        }

        self.persist_filter_data().await;

        *self.state.lock() = State::Terminated;
        tracing::info!(service = %self.inner.config.service_name, "ingest service terminated");
    }

    /// Write the state blob of every persisting filter
    async fn persist_filter_data(&self) {
        let blobs: Vec<(String, String)> = {
            let pipeline = self.inner.pipeline.read();
            pipeline
                .iter()
                .filter(|f| f.persists_data())
                .filter_map(|f| {
                    f.shutdown_data().map(|blob| {
                        let key = format!("{}{}", self.inner.config.service_name, f.name());
                        (key, blob)
                    })
                })
                .collect()
        };

        for (key, blob) in blobs {
            if let Err(e) = self.plugin_data.persist(&key, &blob).await {
                tracing::error!(key = %key, error = %e, "failed to persist filter data");
            }
        }
    }
}

impl ConfigListener for IngestService {
    fn config_change(&self, category: &str, config: &serde_json::Value) {
        IngestService::config_change(self, category, config);
    }
}

impl std::fmt::Debug for IngestService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestService")
            .field("service", &self.inner.config.service_name)
            .field("state", &self.state())
            .field("queue_len", &self.queue_len())
            .finish()
    }
}

impl Inner {
    /// Drain and process one batch from the queue
    ///
    /// No lock is held during the filter pass or the storage append.
    async fn process_queue(&self) {
        let swapped = self.queue.swap_out();
        if swapped.is_empty() {
            // Nudge the stats worker anyway: a DISCARDED-only flush
            // must not wait for new readings to arrive
            self.stats.signal();
            return;
        }

        let queued = swapped.len();
        let batch: Vec<Reading> = {
            let pipeline = self.pipeline.read();
            if pipeline.is_empty() {
                swapped
            } else {
                pipeline.process(ReadingSet::new(swapped)).into_vec()
            }
        };

        if batch.is_empty() {
            // Filters removed everything; nothing to append or count
            self.metrics.record_filtered_out(queued as u64);
            return;
        }
        if queued > batch.len() {
            self.metrics.record_filtered_out((queued - batch.len()) as u64);
        }
        self.metrics.record_batch_flushed();

        // Consult the tracker cache per asset and build this batch's counts
        let mut counts: HashMap<String, u64> = HashMap::new();
        {
            let mut tracker = self.tracker.lock().await;
            for reading in &batch {
                let tuple = TrackingTuple::ingest(
                    self.config.service_name.as_str(),
                    self.config.plugin_name.as_str(),
                    reading.asset_name(),
                );
                if !tracker.contains(&tuple) {
                    tracker.record(tuple).await;
                }
                *counts.entry(reading.asset_name().to_string()).or_default() += 1;
            }
        }

        match self.storage.reading_append(&batch).await {
            Ok(()) => {
                self.metrics.record_appended(batch.len() as u64);
                self.stats.accumulate(counts).await;
            }
            Err(e) => {
                let count = batch.len() as u64;
                if self.config.requeue_on_failure {
                    tracing::error!(
                        error = %e,
                        readings = count,
                        "failed to write readings to storage, requeuing"
                    );
                    self.queue.prepend(batch);
                } else {
                    tracing::info!(
                        error = %e,
                        readings = count,
                        "could not send readings to storage, discarding"
                    );
                    self.metrics.record_discarded(count);
                    self.stats.note_discards(count).await;
                }
            }
        }

        // Wake the stats worker after every batch regardless of outcome
        self.stats.signal();
    }
}

/// Drain worker: wait for a flush trigger, then process the queue
async fn drain_loop(inner: Arc<Inner>) {
    tracing::debug!("drain worker started");
    while !inner.cancel.is_cancelled() {
        inner
            .queue
            .wait_for_flush(inner.config.flush_timeout, &inner.cancel)
            .await;
        inner.process_queue().await;
    }
    tracing::debug!("drain worker stopped");
}

/// Stats worker: flush pending counters until cancelled
async fn stats_loop(inner: Arc<Inner>) {
    tracing::debug!("stats worker started");
    while !inner.cancel.is_cancelled() {
        inner.stats.flush_once(&inner.cancel).await;
    }
    tracing::debug!("stats worker stopped");
}
