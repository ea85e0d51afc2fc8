//! Persisted filter plugin data
//!
//! Filters that declare the persistence capability get their state
//! blob stored in the `plugin_data` table, keyed by
//! `service_name + filter_name`. The coordinator loads the blob before
//! the first batch is pushed and writes the updated blob on shutdown.

use std::sync::Arc;

use crate::{InsertValues, Query, StorageClient, StorageResult, Where};

#[cfg(test)]
#[path = "plugin_data_test.rs"]
mod tests;

const PLUGIN_DATA_TABLE: &str = "plugin_data";

/// Persisted-blob store for filter plugin state
pub struct PluginDataStore {
    storage: Arc<dyn StorageClient>,
}

impl PluginDataStore {
    /// Create a store over the given storage client
    pub fn new(storage: Arc<dyn StorageClient>) -> Self {
        Self { storage }
    }

    /// Load the blob stored under a key
    ///
    /// Returns `None` when no blob has been persisted yet.
    pub async fn load(&self, key: &str) -> StorageResult<Option<String>> {
        let query = Query::new(Where::equals("key", key));
        let result = self.storage.query_table(PLUGIN_DATA_TABLE, &query).await?;
        Ok(result
            .first()
            .and_then(|row| row.column_str("data"))
            .map(str::to_string))
    }

    /// Persist a blob under a key, replacing any previous value
    pub async fn persist(&self, key: &str, data: &str) -> StorageResult<()> {
        let query = Query::new(Where::equals("key", key));
        let existing = self.storage.query_table(PLUGIN_DATA_TABLE, &query).await?;

        if existing.is_empty() {
            let values = InsertValues::new().with("key", key).with("data", data);
            self.storage.insert_table(PLUGIN_DATA_TABLE, &values).await
        } else {
            let values = InsertValues::new().with("data", data);
            self.storage
                .update_table_values(PLUGIN_DATA_TABLE, &values, &Where::equals("key", key))
                .await?;
            Ok(())
        }
    }
}
