//! End-to-end ingest flows through a real service instance
//!
//! Drives the public producer API against the in-memory storage and
//! management backends and asserts what reached storage: appended
//! readings, statistics rows, tracking tuples, and persisted filter
//! blobs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use inlet_filter::{ExcludeConfig, ExcludeFilter, Filter, FilterResult, NoopFilter};
use inlet_ingest::{
    IngestConfig, IngestService, DISCARDED_KEY, READINGS_KEY, STATISTICS_TABLE,
};
use inlet_management::{ConfigCategory, ConfigHandler, InMemoryManagement, TrackingTuple};
use inlet_protocol::{Reading, ReadingSet};
use inlet_storage::{
    InsertValues, MemoryStorage, Query, ResultSet, StorageClient, StorageResult, UpdateBatch,
    Where,
};
use serde_json::json;

async fn seed_statistics(storage: &dyn StorageClient) {
    for key in [READINGS_KEY, DISCARDED_KEY] {
        let values = InsertValues::new()
            .with("key", key)
            .with("value", 0)
            .with("previous_value", 0);
        storage.insert_table(STATISTICS_TABLE, &values).await.unwrap();
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached within deadline"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

fn reading(asset: &str, value: i64) -> Reading {
    Reading::new(asset, json!({"value": value}))
}

/// Storage double that fails a set number of appends, then recovers
struct FlakyAppendStorage {
    inner: MemoryStorage,
    failures_left: AtomicUsize,
}

impl FlakyAppendStorage {
    fn failing_once() -> Self {
        Self {
            inner: MemoryStorage::new(),
            failures_left: AtomicUsize::new(1),
        }
    }
}

#[async_trait]
impl StorageClient for FlakyAppendStorage {
    async fn query_table(&self, table: &str, query: &Query) -> StorageResult<ResultSet> {
        self.inner.query_table(table, query).await
    }

    async fn insert_table(&self, table: &str, values: &InsertValues) -> StorageResult<()> {
        self.inner.insert_table(table, values).await
    }

    async fn update_table(&self, table: &str, updates: &UpdateBatch) -> StorageResult<u64> {
        self.inner.update_table(table, updates).await
    }

    async fn update_table_values(
        &self,
        table: &str,
        values: &InsertValues,
        where_clause: &Where,
    ) -> StorageResult<u64> {
        self.inner
            .update_table_values(table, values, where_clause)
            .await
    }

    async fn reading_append(&self, readings: &[Reading]) -> StorageResult<()> {
        if self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(inlet_storage::StorageError::Connection(
                "storage unavailable".into(),
            ));
        }
        self.inner.reading_append(readings).await
    }
}

#[tokio::test]
async fn threshold_flush_counts_per_asset() {
    let storage = Arc::new(MemoryStorage::new());
    seed_statistics(storage.as_ref()).await;
    let mgmt = Arc::new(InMemoryManagement::new());

    let svc = Arc::new(
        IngestService::new(
            IngestConfig::new("south-svc", "sim")
                .with_queue_threshold(3)
                .with_flush_timeout(Duration::from_secs(60)),
            storage.clone(),
            mgmt.clone(),
        )
        .unwrap(),
    );
    svc.start().await.unwrap();

    svc.ingest(reading("asset_a", 1)).unwrap();
    svc.ingest(reading("asset_a", 2)).unwrap();
    svc.ingest(reading("asset_b", 3)).unwrap();

    wait_until(|| storage.reading_count() == 3).await;
    svc.shutdown().await;

    let assets: Vec<String> = storage
        .appended_readings()
        .iter()
        .map(|r| r.asset_name().to_string())
        .collect();
    assert_eq!(assets, vec!["asset_a", "asset_a", "asset_b"]);

    assert_eq!(storage.statistics_value("INGEST_ASSET_A"), Some(2));
    assert_eq!(storage.statistics_value("INGEST_ASSET_B"), Some(1));
    assert_eq!(storage.statistics_value(READINGS_KEY), Some(3));
    assert_eq!(storage.statistics_value(DISCARDED_KEY), Some(0));

    // Both assets were recorded with the management service
    assert!(mgmt.has_tuple(&TrackingTuple::ingest("south-svc", "sim", "asset_a")));
    assert!(mgmt.has_tuple(&TrackingTuple::ingest("south-svc", "sim", "asset_b")));
}

#[tokio::test]
async fn timeout_flushes_partial_batch() {
    let storage = Arc::new(MemoryStorage::new());
    seed_statistics(storage.as_ref()).await;
    let mgmt = Arc::new(InMemoryManagement::new());

    let svc = Arc::new(
        IngestService::new(
            IngestConfig::new("south-svc", "sim")
                .with_queue_threshold(100)
                .with_flush_timeout(Duration::from_millis(50)),
            storage.clone(),
            mgmt,
        )
        .unwrap(),
    );
    svc.start().await.unwrap();

    svc.ingest(reading("asset_a", 1)).unwrap();

    // Well below threshold: only the timeout can flush this
    wait_until(|| storage.reading_count() == 1).await;
    svc.shutdown().await;

    assert_eq!(storage.statistics_value("INGEST_ASSET_A"), Some(1));
    assert_eq!(storage.statistics_value(READINGS_KEY), Some(1));
}

#[tokio::test]
async fn append_failure_counts_discards() {
    let storage = Arc::new(FlakyAppendStorage::failing_once());
    seed_statistics(&storage.inner).await;
    let mgmt = Arc::new(InMemoryManagement::new());

    let svc = Arc::new(
        IngestService::new(
            IngestConfig::new("south-svc", "sim")
                .with_queue_threshold(2)
                .with_flush_timeout(Duration::from_secs(60)),
            storage.clone(),
            mgmt,
        )
        .unwrap(),
    );
    svc.start().await.unwrap();

    svc.ingest(reading("asset_a", 1)).unwrap();
    svc.ingest(reading("asset_a", 2)).unwrap();

    wait_until(|| svc.metrics().readings_discarded == 2).await;
    svc.shutdown().await;

    assert_eq!(storage.inner.reading_count(), 0);
    assert_eq!(storage.inner.statistics_value(DISCARDED_KEY), Some(2));
    assert_eq!(storage.inner.statistics_value(READINGS_KEY), Some(0));
    // No per-asset row was ever created for the failed batch
    assert_eq!(storage.inner.statistics_value("INGEST_ASSET_A"), None);
}

#[tokio::test]
async fn requeued_batch_is_retried_on_next_flush() {
    let storage = Arc::new(FlakyAppendStorage::failing_once());
    seed_statistics(&storage.inner).await;
    let mgmt = Arc::new(InMemoryManagement::new());

    let svc = Arc::new(
        IngestService::new(
            IngestConfig::new("south-svc", "sim")
                .with_queue_threshold(2)
                .with_flush_timeout(Duration::from_millis(50))
                .with_requeue_on_failure(true),
            storage.clone(),
            mgmt,
        )
        .unwrap(),
    );
    svc.start().await.unwrap();

    svc.ingest(reading("asset_a", 1)).unwrap();
    svc.ingest(reading("asset_a", 2)).unwrap();

    // First append fails and the batch is requeued; the next flush succeeds
    wait_until(|| storage.inner.reading_count() == 2).await;
    svc.shutdown().await;

    assert_eq!(storage.inner.statistics_value(DISCARDED_KEY), Some(0));
    assert_eq!(storage.inner.statistics_value("INGEST_ASSET_A"), Some(2));
    assert_eq!(svc.metrics().readings_discarded, 0);
}

#[tokio::test]
async fn filter_removing_everything_skips_storage() {
    let storage = Arc::new(MemoryStorage::new());
    seed_statistics(storage.as_ref()).await;
    let mgmt = Arc::new(InMemoryManagement::new());
    mgmt.put_category(ConfigCategory::new(
        "bench-exclude",
        json!({"plugin": "exclude", "assets": ["bench_rig"]}),
    ));

    let svc = Arc::new(
        IngestService::new(
            IngestConfig::new("south-svc", "sim")
                .with_queue_threshold(1)
                .with_flush_timeout(Duration::from_secs(60)),
            storage.clone(),
            mgmt.clone(),
        )
        .unwrap(),
    );
    let filter = ExcludeFilter::new("bench-exclude", ExcludeConfig::new()).unwrap();
    svc.attach_filters(vec![Box::new(filter)], None)
        .await
        .unwrap();
    svc.start().await.unwrap();

    svc.ingest(reading("bench_rig", 1)).unwrap();

    wait_until(|| svc.metrics().readings_filtered_out == 1).await;
    svc.shutdown().await;

    assert_eq!(storage.reading_count(), 0);
    assert_eq!(storage.statistics_value(READINGS_KEY), Some(0));
    assert_eq!(storage.statistics_value("INGEST_BENCH_RIG"), None);
}

#[tokio::test]
async fn first_reading_from_new_asset_creates_stats_row() {
    let storage = Arc::new(MemoryStorage::new());
    seed_statistics(storage.as_ref()).await;
    let mgmt = Arc::new(InMemoryManagement::new());

    let svc = Arc::new(
        IngestService::new(
            IngestConfig::new("south-svc", "sim")
                .with_queue_threshold(1)
                .with_flush_timeout(Duration::from_secs(60)),
            storage.clone(),
            mgmt,
        )
        .unwrap(),
    );
    svc.start().await.unwrap();

    svc.ingest(reading("brand_new_asset", 7)).unwrap();

    wait_until(|| storage.statistics_value("INGEST_BRAND_NEW_ASSET").is_some()).await;
    svc.shutdown().await;

    // Row was created with the canonical shape, then incremented
    let result = storage
        .query_table(
            STATISTICS_TABLE,
            &Query::new(Where::equals("key", "INGEST_BRAND_NEW_ASSET")),
        )
        .await
        .unwrap();
    let row = result.first().unwrap();
    assert_eq!(row.column_i64("value"), Some(1));
    assert_eq!(row.column_i64("previous_value"), Some(0));
    assert_eq!(
        row.column_str("description"),
        Some("Readings received from asset brand_new_asset")
    );
}

#[tokio::test]
async fn config_change_reaches_only_the_addressed_filter() {
    let storage = Arc::new(MemoryStorage::new());
    seed_statistics(storage.as_ref()).await;
    let mgmt = Arc::new(InMemoryManagement::new());
    mgmt.put_category(ConfigCategory::new(
        "south-exclude",
        json!({"plugin": "exclude", "assets": []}),
    ));
    mgmt.put_category(ConfigCategory::new("south-noop", json!({"plugin": "noop"})));

    let handler = ConfigHandler::new();
    let svc = Arc::new(
        IngestService::new(
            IngestConfig::new("south-svc", "sim")
                .with_queue_threshold(1)
                .with_flush_timeout(Duration::from_secs(60)),
            storage.clone(),
            mgmt.clone(),
        )
        .unwrap(),
    );
    let exclude = ExcludeFilter::new("south-exclude", ExcludeConfig::new()).unwrap();
    let noop = NoopFilter::new("south-noop");
    svc.attach_filters(vec![Box::new(exclude), Box::new(noop)], Some(&handler))
        .await
        .unwrap();
    svc.start().await.unwrap();

    // Passes through while the exclusion list is empty
    svc.ingest(reading("pump", 1)).unwrap();
    wait_until(|| storage.reading_count() == 1).await;

    // Reconfigure the exclude filter through the handler
    handler.dispatch("south-exclude", &json!({"assets": ["pump"]}));

    svc.ingest(reading("pump", 2)).unwrap();
    wait_until(|| svc.metrics().readings_filtered_out == 1).await;
    svc.shutdown().await;

    assert_eq!(storage.reading_count(), 1);
    assert_eq!(storage.statistics_value("INGEST_PUMP"), Some(1));
}

/// Filter that counts readings across restarts via the persisted blob
struct CountingFilter {
    name: String,
    seen: AtomicUsize,
}

impl CountingFilter {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            seen: AtomicUsize::new(0),
        }
    }
}

impl Filter for CountingFilter {
    fn process(&self, readings: ReadingSet) -> ReadingSet {
        self.seen.fetch_add(readings.len(), Ordering::SeqCst);
        readings
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn reconfigure(&self, _config: &serde_json::Value) -> FilterResult<()> {
        Ok(())
    }

    fn persists_data(&self) -> bool {
        true
    }

    fn start_data(&self, blob: &str) -> FilterResult<()> {
        let parsed: serde_json::Value = serde_json::from_str(blob)
            .map_err(|e| inlet_filter::FilterError::persistence(e.to_string()))?;
        let seen = parsed["seen"].as_u64().unwrap_or(0) as usize;
        self.seen.store(seen, Ordering::SeqCst);
        Ok(())
    }

    fn shutdown_data(&self) -> Option<String> {
        Some(json!({"seen": self.seen.load(Ordering::SeqCst)}).to_string())
    }
}

#[tokio::test]
async fn filter_state_survives_restart_via_plugin_data() {
    let storage = Arc::new(MemoryStorage::new());
    seed_statistics(storage.as_ref()).await;
    let mgmt = Arc::new(InMemoryManagement::new());
    mgmt.put_category(ConfigCategory::new("south-counter", json!({})));

    let config = IngestConfig::new("south-svc", "sim")
        .with_queue_threshold(1)
        .with_flush_timeout(Duration::from_secs(60));

    // First instance processes two readings, persists {"seen":2}
    let svc = Arc::new(
        IngestService::new(config.clone(), storage.clone(), mgmt.clone()).unwrap(),
    );
    svc.attach_filters(vec![Box::new(CountingFilter::new("south-counter"))], None)
        .await
        .unwrap();
    svc.start().await.unwrap();
    svc.ingest(reading("pump", 1)).unwrap();
    svc.ingest(reading("valve", 2)).unwrap();
    wait_until(|| storage.reading_count() == 2).await;
    svc.shutdown().await;

    // Second instance restores the blob before processing anything
    let svc2 = Arc::new(
        IngestService::new(config, storage.clone(), mgmt.clone()).unwrap(),
    );
    let restored = Arc::new(CountingFilter::new("south-counter"));
    struct SharedFilter(Arc<CountingFilter>);
    impl Filter for SharedFilter {
        fn process(&self, readings: ReadingSet) -> ReadingSet {
            self.0.process(readings)
        }
        fn name(&self) -> &str {
            self.0.name()
        }
        fn reconfigure(&self, config: &serde_json::Value) -> FilterResult<()> {
            self.0.reconfigure(config)
        }
        fn persists_data(&self) -> bool {
            true
        }
        fn start_data(&self, blob: &str) -> FilterResult<()> {
            self.0.start_data(blob)
        }
        fn shutdown_data(&self) -> Option<String> {
            self.0.shutdown_data()
        }
    }
    svc2.attach_filters(vec![Box::new(SharedFilter(restored.clone()))], None)
        .await
        .unwrap();

    assert_eq!(restored.seen.load(Ordering::SeqCst), 2);
    svc2.shutdown().await;
}
