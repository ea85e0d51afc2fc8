//! Exclude Filter - drop readings from unwanted assets
//!
//! Removes readings whose asset name is on the configured list and
//! forwards the remainder. Dropping every reading in a set is valid;
//! the coordinator simply skips the storage append for that batch.
//!
//! # Configuration
//!
//! | Option | Type | Description |
//! |--------|------|-------------|
//! | `assets` | array | Asset names to drop |

mod config;

pub use config::ExcludeConfig;

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::registry::FilterFactory;
use crate::{Filter, FilterError, FilterResult};
use inlet_protocol::ReadingSet;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

/// Metrics for the exclude filter
#[derive(Debug, Default)]
pub struct ExcludeMetrics {
    /// Readings processed
    pub readings_seen: AtomicU64,
    /// Readings dropped
    pub readings_dropped: AtomicU64,
}

impl ExcludeMetrics {
    /// Drop rate over everything seen so far (0.0 - 1.0)
    pub fn drop_rate(&self) -> f64 {
        let seen = self.readings_seen.load(Ordering::Relaxed);
        let dropped = self.readings_dropped.load(Ordering::Relaxed);
        if seen == 0 {
            0.0
        } else {
            dropped as f64 / seen as f64
        }
    }
}

/// Asset exclusion filter
pub struct ExcludeFilter {
    name: String,
    config: RwLock<ExcludeConfig>,
    metrics: ExcludeMetrics,
}

impl ExcludeFilter {
    /// Create an exclude filter
    pub fn new(name: impl Into<String>, config: ExcludeConfig) -> FilterResult<Self> {
        config.validate().map_err(FilterError::config)?;
        Ok(Self {
            name: name.into(),
            config: RwLock::new(config),
            metrics: ExcludeMetrics::default(),
        })
    }

    /// Get filter metrics
    pub fn metrics(&self) -> &ExcludeMetrics {
        &self.metrics
    }
}

impl Filter for ExcludeFilter {
    fn process(&self, mut readings: ReadingSet) -> ReadingSet {
        let before = readings.len();
        {
            let config = self.config.read();
            readings.retain(|r| !config.assets.contains(r.asset_name()));
        }
        self.metrics
            .readings_seen
            .fetch_add(before as u64, Ordering::Relaxed);
        self.metrics
            .readings_dropped
            .fetch_add((before - readings.len()) as u64, Ordering::Relaxed);
        readings
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn reconfigure(&self, config: &serde_json::Value) -> FilterResult<()> {
        let parsed = ExcludeConfig::try_from(config).map_err(FilterError::config)?;
        tracing::info!(filter = %self.name, assets = parsed.assets.len(), "exclude filter reconfigured");
        *self.config.write() = parsed;
        Ok(())
    }
}

/// Factory for [`ExcludeFilter`]
pub struct ExcludeFactory;

impl FilterFactory for ExcludeFactory {
    fn create(&self, name: &str, config: &serde_json::Value) -> FilterResult<Box<dyn Filter>> {
        let parsed = ExcludeConfig::try_from(config).map_err(FilterError::config)?;
        Ok(Box::new(ExcludeFilter::new(name, parsed)?))
    }

    fn type_name(&self) -> &'static str {
        "exclude"
    }
}
