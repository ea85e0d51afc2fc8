//! Asset tracking tuples
//!
//! A tracking tuple records that a given service instance, through a
//! given plugin, has produced data for a given asset. Tuples are
//! persisted by the management service; the ingest core keeps a local
//! value-equality cache of them.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "tracker_test.rs"]
mod tests;

/// Event name recorded for tuples observed on the ingest path
pub const TRACKING_EVENT_INGEST: &str = "Ingest";

/// The (service, plugin, asset, event) tracking tuple
///
/// Equality and hashing are value-based across all four fields, so
/// tuples can be cached in a `HashSet` without any identity pitfalls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackingTuple {
    service: String,
    plugin: String,
    asset: String,
    event: String,
}

impl TrackingTuple {
    /// Create a tuple
    pub fn new(
        service: impl Into<String>,
        plugin: impl Into<String>,
        asset: impl Into<String>,
        event: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            plugin: plugin.into(),
            asset: asset.into(),
            event: event.into(),
        }
    }

    /// Create an `Ingest`-event tuple
    pub fn ingest(
        service: impl Into<String>,
        plugin: impl Into<String>,
        asset: impl Into<String>,
    ) -> Self {
        Self::new(service, plugin, asset, TRACKING_EVENT_INGEST)
    }

    /// Service name
    #[inline]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Plugin name
    #[inline]
    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    /// Asset name
    #[inline]
    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// Event name
    #[inline]
    pub fn event(&self) -> &str {
        &self.event
    }
}

impl std::fmt::Display for TrackingTuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.service, self.plugin, self.asset, self.event
        )
    }
}
