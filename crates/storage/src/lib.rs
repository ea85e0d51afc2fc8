//! Inlet - Storage
//!
//! Contract between the ingest core and its storage collaborator.
//!
//! # Overview
//!
//! The ingest core drives storage through five operations: structured
//! table queries, row inserts, expression-based batched updates, plain
//! value updates, and the readings append primitive. The query payload
//! is a structured document ([`Query`], [`InsertValues`],
//! [`UpdateBatch`]) that concrete backends encode for their own wire
//! format; no SQL dialect leaks into the core.
//!
//! # Implementations
//!
//! [`MemoryStorage`] is an in-process backend used by tests and local
//! runs. Network backends (Postgres, SQLite services) implement the
//! same [`StorageClient`] trait out of tree.

mod client;
mod error;
mod memory;
mod plugin_data;
mod query;
mod result;

pub use client::StorageClient;
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStorage;
pub use plugin_data::PluginDataStore;
pub use query::{
    Condition, Expression, ExpressionValues, InsertValues, Operator, Query, UpdateBatch, Where,
};
pub use result::{ResultSet, Row};
