//! Storage client trait
//!
//! Abstract interface to the storage layer. Implementations must be
//! thread-safe for every operation: the drain worker and the stats
//! worker issue calls concurrently without coordination.

use async_trait::async_trait;
use inlet_protocol::Reading;

use crate::{InsertValues, Query, ResultSet, StorageResult, UpdateBatch, Where};

/// Trait for storage backends consumed by the ingest core
///
/// Implementations must be `Send + Sync`; the ingest core never
/// serializes calls across its workers.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Query rows from a table
    async fn query_table(&self, table: &str, query: &Query) -> StorageResult<ResultSet>;

    /// Insert one row into a table
    async fn insert_table(&self, table: &str, values: &InsertValues) -> StorageResult<()>;

    /// Apply a batched expression update as a single logical call
    ///
    /// Returns the number of rows affected.
    async fn update_table(&self, table: &str, updates: &UpdateBatch) -> StorageResult<u64>;

    /// Overwrite column values on the rows matching a where clause
    ///
    /// Returns the number of rows affected.
    async fn update_table_values(
        &self,
        table: &str,
        values: &InsertValues,
        where_clause: &Where,
    ) -> StorageResult<u64>;

    /// Append a block of readings
    ///
    /// The append is atomic on a best-effort basis per backend; the
    /// core treats any error as the whole block failing.
    async fn reading_append(&self, readings: &[Reading]) -> StorageResult<()>;
}
