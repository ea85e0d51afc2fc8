//! In-memory management service
//!
//! Implements the full [`ManagementClient`] contract over in-process
//! registries. Used by tests and local runs.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    ConfigCategory, ManagementClient, ManagementError, ManagementResult, TrackingTuple,
};

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;

/// In-process management service
#[derive(Debug, Default)]
pub struct InMemoryManagement {
    tuples: Mutex<HashSet<TrackingTuple>>,
    categories: Mutex<HashMap<String, ConfigCategory>>,
    children: Mutex<HashMap<String, Vec<String>>>,
}

impl InMemoryManagement {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a category (tests and local bootstrap)
    pub fn put_category(&self, category: ConfigCategory) {
        self.categories
            .lock()
            .insert(category.name().to_string(), category);
    }

    /// Seed a tracking tuple directly, bypassing the client call
    pub fn put_tuple(&self, tuple: TrackingTuple) {
        self.tuples.lock().insert(tuple);
    }

    /// Number of tuples currently recorded
    pub fn tuple_count(&self) -> usize {
        self.tuples.lock().len()
    }

    /// Check whether a tuple has been recorded
    pub fn has_tuple(&self, tuple: &TrackingTuple) -> bool {
        self.tuples.lock().contains(tuple)
    }

    /// Children registered under a parent category
    pub fn children_of(&self, parent: &str) -> Vec<String> {
        self.children.lock().get(parent).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ManagementClient for InMemoryManagement {
    async fn get_asset_tracking_tuples(
        &self,
        service: &str,
    ) -> ManagementResult<Vec<TrackingTuple>> {
        Ok(self
            .tuples
            .lock()
            .iter()
            .filter(|t| t.service() == service)
            .cloned()
            .collect())
    }

    async fn add_asset_tracking_tuple(
        &self,
        service: &str,
        plugin: &str,
        asset: &str,
        event: &str,
    ) -> ManagementResult<()> {
        self.tuples
            .lock()
            .insert(TrackingTuple::new(service, plugin, asset, event));
        Ok(())
    }

    async fn get_category(&self, name: &str) -> ManagementResult<ConfigCategory> {
        self.categories
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| ManagementError::UnknownCategory(name.to_string()))
    }

    async fn add_child_categories(
        &self,
        parent: &str,
        children: &[String],
    ) -> ManagementResult<()> {
        let mut map = self.children.lock();
        let entry = map.entry(parent.to_string()).or_default();
        for child in children {
            if !entry.contains(child) {
                entry.push(child.clone());
            }
        }
        Ok(())
    }
}
