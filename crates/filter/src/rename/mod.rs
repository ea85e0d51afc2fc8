//! Rename Filter - re-home readings onto different asset names
//!
//! Mutates readings in place: any reading whose asset name matches a
//! configured rule is rewritten to the rule's target name. Readings
//! without a matching rule pass through untouched.
//!
//! # Configuration
//!
//! | Option | Type | Description |
//! |--------|------|-------------|
//! | `rules` | object | Map of exact asset name → replacement name |

mod config;

pub use config::RenameConfig;

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::registry::FilterFactory;
use crate::{Filter, FilterError, FilterResult};
use inlet_protocol::ReadingSet;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

/// Metrics for the rename filter
#[derive(Debug, Default)]
pub struct RenameMetrics {
    /// Readings processed
    pub readings_seen: AtomicU64,
    /// Readings whose asset name was rewritten
    pub readings_renamed: AtomicU64,
}

/// Asset rename filter
pub struct RenameFilter {
    name: String,
    config: RwLock<RenameConfig>,
    metrics: RenameMetrics,
}

impl RenameFilter {
    /// Create a rename filter
    pub fn new(name: impl Into<String>, config: RenameConfig) -> FilterResult<Self> {
        config.validate().map_err(FilterError::config)?;
        Ok(Self {
            name: name.into(),
            config: RwLock::new(config),
            metrics: RenameMetrics::default(),
        })
    }

    /// Get filter metrics
    pub fn metrics(&self) -> &RenameMetrics {
        &self.metrics
    }
}

impl Filter for RenameFilter {
    fn process(&self, mut readings: ReadingSet) -> ReadingSet {
        let config = self.config.read();
        let mut renamed = 0u64;
        for reading in readings.iter_mut() {
            if let Some(target) = config.rules.get(reading.asset_name()) {
                reading.set_asset_name(target.clone());
                renamed += 1;
            }
        }
        self.metrics
            .readings_seen
            .fetch_add(readings.len() as u64, Ordering::Relaxed);
        self.metrics
            .readings_renamed
            .fetch_add(renamed, Ordering::Relaxed);
        readings
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn reconfigure(&self, config: &serde_json::Value) -> FilterResult<()> {
        let parsed = RenameConfig::try_from(config).map_err(FilterError::config)?;
        tracing::info!(filter = %self.name, rules = parsed.rules.len(), "rename filter reconfigured");
        *self.config.write() = parsed;
        Ok(())
    }
}

/// Factory for [`RenameFilter`]
pub struct RenameFactory;

impl FilterFactory for RenameFactory {
    fn create(&self, name: &str, config: &serde_json::Value) -> FilterResult<Box<dyn Filter>> {
        let parsed = RenameConfig::try_from(config).map_err(FilterError::config)?;
        Ok(Box::new(RenameFilter::new(name, parsed)?))
    }

    fn type_name(&self) -> &'static str {
        "rename"
    }
}
