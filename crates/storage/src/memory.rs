//! In-memory storage backend
//!
//! Implements the full [`StorageClient`] contract over hash-map tables
//! and a readings log. Used by tests and local runs; it is not a
//! product database.

use std::collections::HashMap;

use async_trait::async_trait;
use inlet_protocol::Reading;
use parking_lot::Mutex;

use crate::{
    InsertValues, Query, ResultSet, Row, StorageClient, StorageResult, UpdateBatch, Where,
};

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;

type Table = Vec<HashMap<String, serde_json::Value>>;

/// In-process storage backend
///
/// Tables are created lazily on first insert. All operations are
/// thread-safe; each takes the state lock for the duration of the call
/// only.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: Mutex<HashMap<String, Table>>,
    readings: Mutex<Vec<Reading>>,
}

impl MemoryStorage {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every reading appended so far
    pub fn appended_readings(&self) -> Vec<Reading> {
        self.readings.lock().clone()
    }

    /// Number of readings appended so far
    pub fn reading_count(&self) -> usize {
        self.readings.lock().len()
    }

    /// Convenience lookup of `value` for a statistics row
    pub fn statistics_value(&self, key: &str) -> Option<i64> {
        let tables = self.tables.lock();
        tables.get("statistics")?.iter().find_map(|row| {
            (row.get("key").and_then(|v| v.as_str()) == Some(key))
                .then(|| row.get("value").and_then(|v| v.as_i64()))
                .flatten()
        })
    }

    /// Number of rows currently in a table
    pub fn table_len(&self, table: &str) -> usize {
        self.tables.lock().get(table).map_or(0, |t| t.len())
    }

    fn row_matches(row: &HashMap<String, serde_json::Value>, clause: &Where) -> bool {
        clause.matches(row.get(clause.column()))
    }
}

#[async_trait]
impl StorageClient for MemoryStorage {
    async fn query_table(&self, table: &str, query: &Query) -> StorageResult<ResultSet> {
        let tables = self.tables.lock();
        let rows = tables
            .get(table)
            .map(|t| {
                t.iter()
                    .filter(|row| match query.where_clause() {
                        Some(clause) => Self::row_matches(row, clause),
                        None => true,
                    })
                    .map(|row| Row::new(row.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(ResultSet::new(rows))
    }

    async fn insert_table(&self, table: &str, values: &InsertValues) -> StorageResult<()> {
        let row: HashMap<String, serde_json::Value> = values.iter().cloned().collect();
        self.tables.lock().entry(table.to_string()).or_default().push(row);
        Ok(())
    }

    async fn update_table(&self, table: &str, updates: &UpdateBatch) -> StorageResult<u64> {
        let mut tables = self.tables.lock();
        let Some(rows) = tables.get_mut(table) else {
            return Ok(0);
        };

        let mut affected = 0u64;
        for (expressions, clause) in updates.iter() {
            for row in rows.iter_mut().filter(|r| Self::row_matches(r, clause)) {
                for expr in expressions.iter() {
                    let next = expr.apply(row.get(expr.column()));
                    row.insert(expr.column().to_string(), next);
                }
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn update_table_values(
        &self,
        table: &str,
        values: &InsertValues,
        where_clause: &Where,
    ) -> StorageResult<u64> {
        let mut tables = self.tables.lock();
        let Some(rows) = tables.get_mut(table) else {
            return Ok(0);
        };

        let mut affected = 0u64;
        for row in rows.iter_mut().filter(|r| Self::row_matches(r, where_clause)) {
            for (column, value) in values.iter() {
                row.insert(column.clone(), value.clone());
            }
            affected += 1;
        }
        Ok(affected)
    }

    async fn reading_append(&self, readings: &[Reading]) -> StorageResult<()> {
        self.readings.lock().extend_from_slice(readings);
        Ok(())
    }
}
