//! Asset Tracker Cache - tuples observed on the ingest path
//!
//! Local value-equality cache of the tracking tuples this service has
//! recorded with the management service. Write-through: the management
//! call must succeed before a tuple enters the cache, so the cache is
//! always a subset of what is persisted. Tuples are never evicted
//! during the process lifetime.

use std::collections::HashSet;
use std::sync::Arc;

use inlet_management::{ManagementClient, TrackingTuple, TRACKING_EVENT_INGEST};

#[cfg(test)]
#[path = "tracker_test.rs"]
mod tests;

/// Cache of tracking tuples already persisted for this service
pub struct AssetTracker {
    service: String,
    plugin: String,
    mgmt: Arc<dyn ManagementClient>,
    tuples: HashSet<TrackingTuple>,
}

impl AssetTracker {
    /// Create an empty tracker cache
    pub fn new(
        service: impl Into<String>,
        plugin: impl Into<String>,
        mgmt: Arc<dyn ManagementClient>,
    ) -> Self {
        Self {
            service: service.into(),
            plugin: plugin.into(),
            mgmt,
            tuples: HashSet::new(),
        }
    }

    /// Populate the cache from the management service
    ///
    /// Tuples recorded for a different plugin or a non-ingest event
    /// are skipped. A fetch failure leaves the cache empty; tuples are
    /// then back-filled lazily as readings are observed.
    pub async fn populate(&mut self) {
        match self.mgmt.get_asset_tracking_tuples(&self.service).await {
            Ok(tuples) => {
                for tuple in tuples {
                    if tuple.plugin() != self.plugin || tuple.event() != TRACKING_EVENT_INGEST {
                        tracing::info!(
                            tuple = %tuple,
                            "plugin/event mismatch, not adding tuple to tracker cache"
                        );
                        continue;
                    }
                    self.tuples.insert(tuple);
                }
                tracing::debug!(count = self.tuples.len(), "asset tracker cache populated");
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to populate asset tracker cache");
            }
        }
    }

    /// Check whether a tuple is already cached
    pub fn contains(&self, tuple: &TrackingTuple) -> bool {
        self.tuples.contains(tuple)
    }

    /// Number of cached tuples
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    /// Check whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Record a newly observed tuple
    ///
    /// The management upsert must succeed before the tuple is cached;
    /// on failure the tuple stays out of the cache and is retried the
    /// next time it is observed. Failure never blocks the append path.
    pub async fn record(&mut self, tuple: TrackingTuple) {
        if self.tuples.contains(&tuple) {
            tracing::debug!(tuple = %tuple, "tuple already in tracker cache");
            return;
        }
        match self
            .mgmt
            .add_asset_tracking_tuple(
                tuple.service(),
                tuple.plugin(),
                tuple.asset(),
                TRACKING_EVENT_INGEST,
            )
            .await
        {
            Ok(()) => {
                tracing::info!(tuple = %tuple, "recorded new asset tracking tuple");
                self.tuples.insert(tuple);
            }
            Err(e) => {
                tracing::info!(tuple = %tuple, error = %e, "failed to record tracking tuple, will retry");
            }
        }
    }
}
