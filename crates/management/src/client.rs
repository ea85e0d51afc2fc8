//! Management client trait

use async_trait::async_trait;

use crate::{ConfigCategory, ManagementResult, TrackingTuple};

/// Trait for the management service consumed by the ingest core
///
/// Implementations must be `Send + Sync`. Every operation may fail
/// transiently; callers treat failures as retry-later, never fatal
/// (except category fetch during filter setup, which is fatal at
/// startup).
#[async_trait]
pub trait ManagementClient: Send + Sync {
    /// Fetch every tracking tuple recorded for a service
    async fn get_asset_tracking_tuples(
        &self,
        service: &str,
    ) -> ManagementResult<Vec<TrackingTuple>>;

    /// Record a tracking tuple (idempotent upsert)
    async fn add_asset_tracking_tuple(
        &self,
        service: &str,
        plugin: &str,
        asset: &str,
        event: &str,
    ) -> ManagementResult<()>;

    /// Fetch a configuration category by name
    async fn get_category(&self, name: &str) -> ManagementResult<ConfigCategory>;

    /// Register categories as children of a parent category
    async fn add_child_categories(
        &self,
        parent: &str,
        children: &[String],
    ) -> ManagementResult<()>;
}
