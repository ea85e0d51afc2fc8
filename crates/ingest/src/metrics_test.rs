//! Tests for ingest metrics

use super::*;

#[test]
fn test_counters_accumulate() {
    let metrics = IngestMetrics::new();

    metrics.record_queued(3);
    metrics.record_batch_flushed();
    metrics.record_appended(2);
    metrics.record_filtered_out(1);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.readings_queued, 3);
    assert_eq!(snapshot.batches_flushed, 1);
    assert_eq!(snapshot.readings_appended, 2);
    assert_eq!(snapshot.readings_filtered_out, 1);
    assert_eq!(snapshot.readings_discarded, 0);
    assert_eq!(snapshot.append_failures, 0);
}

#[test]
fn test_discard_counts_failure_too() {
    let metrics = IngestMetrics::new();

    metrics.record_discarded(5);
    metrics.record_discarded(2);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.readings_discarded, 7);
    assert_eq!(snapshot.append_failures, 2);
}
