//! Reading - one timestamped sensor observation
//!
//! The `Reading` struct is the unit of data produced by a south plugin
//! and buffered, filtered, and appended to storage by the ingest core.
//!
//! # Design
//!
//! - The payload is a structured JSON document the core never inspects
//! - `user_ts` is supplied by the producing plugin (device time), not
//!   stamped by the pipeline
//! - `read_key` uniquely identifies the observation for downstream
//!   de-duplication by the storage backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "reading_test.rs"]
mod tests;

/// One timestamped sensor observation
///
/// Readings move by value through the pipeline: enqueue takes
/// ownership, and the reading is released after a successful storage
/// append or an explicit discard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Logical source of the reading
    asset_name: String,

    /// Unique key for this observation
    read_key: String,

    /// Opaque structured payload (datapoints)
    payload: serde_json::Value,

    /// Timestamp supplied by the producer
    user_ts: DateTime<Utc>,
}

impl Reading {
    /// Create a reading with a fresh read key and the current time
    pub fn new(asset_name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            asset_name: asset_name.into(),
            read_key: uuid::Uuid::new_v4().to_string(),
            payload,
            user_ts: Utc::now(),
        }
    }

    /// Set an explicit read key
    pub fn with_read_key(mut self, read_key: impl Into<String>) -> Self {
        self.read_key = read_key.into();
        self
    }

    /// Set an explicit producer timestamp
    pub fn with_user_ts(mut self, user_ts: DateTime<Utc>) -> Self {
        self.user_ts = user_ts;
        self
    }

    /// Get the asset name
    #[inline]
    pub fn asset_name(&self) -> &str {
        &self.asset_name
    }

    /// Rename the asset this reading is attributed to
    ///
    /// Used by filters that re-home readings onto a different asset.
    pub fn set_asset_name(&mut self, asset_name: impl Into<String>) {
        self.asset_name = asset_name.into();
    }

    /// Get the read key
    #[inline]
    pub fn read_key(&self) -> &str {
        &self.read_key
    }

    /// Get the payload
    #[inline]
    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// Get a mutable reference to the payload
    ///
    /// Filters may rewrite datapoints in place.
    #[inline]
    pub fn payload_mut(&mut self) -> &mut serde_json::Value {
        &mut self.payload
    }

    /// Get the producer timestamp
    #[inline]
    pub fn user_ts(&self) -> DateTime<Utc> {
        self.user_ts
    }
}
