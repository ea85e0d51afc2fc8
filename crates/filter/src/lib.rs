//! Inlet - Filter
//!
//! Filter pipeline for reading sets in-flight.
//!
//! # Overview
//!
//! Filters transform the working set between the reading queue and the
//! storage append. A filter may:
//! - Mutate readings in place (rename assets, rewrite datapoints)
//! - Drop readings and forward a subset
//! - Construct an entirely new set (the original is released)
//!
//! # Design Principles
//!
//! - **Fast**: filters run on the drain path and should add
//!   microseconds, not milliseconds
//! - **Non-blocking**: never block on I/O or external services
//! - **Addressable**: every filter instance carries the category name
//!   it is reconfigured under
//! - **Single downstream**: each filter has exactly one downstream;
//!   the [`Pipeline`] threads the set through the chain in order and
//!   hands the final set back to its caller
//!
//! # Architecture
//!
//! ```text
//! [ReadingSet] → [Filter 1] → [Filter 2] → ... → [ReadingSet']
//! ```
//!
//! # Adding a New Filter
//!
//! 1. Create a config struct with builder methods and `validate()`
//! 2. Implement `Filter` on your filter struct (interior-mutable
//!    config so `reconfigure` works on a shared instance)
//! 3. Implement `FilterFactory` and register it in
//!    [`default_registry()`]

mod error;
mod pipeline;
mod registry;
pub mod exclude;
pub mod noop;
pub mod rename;

pub use error::{FilterError, FilterResult};
pub use exclude::{ExcludeConfig, ExcludeFactory, ExcludeFilter};
pub use noop::{NoopFactory, NoopFilter};
pub use pipeline::Pipeline;
pub use registry::{FilterFactory, FilterRegistry};
pub use rename::{RenameConfig, RenameFactory, RenameFilter};

use inlet_protocol::ReadingSet;

/// Trait for reading-set filters
///
/// Implementors must be `Send + Sync`; the drain worker and a
/// reconfigure caller may touch the same instance, so configuration
/// lives behind interior mutability.
pub trait Filter: Send + Sync {
    /// Transform a reading set, returning the set to forward
    ///
    /// Returning an empty set drops the whole batch.
    fn process(&self, readings: ReadingSet) -> ReadingSet;

    /// Category name this filter instance is addressed by
    fn name(&self) -> &str;

    /// Apply a new configuration document
    ///
    /// On error the previous configuration stays in force.
    fn reconfigure(&self, config: &serde_json::Value) -> FilterResult<()>;

    /// Whether this filter persists state across restarts
    fn persists_data(&self) -> bool {
        false
    }

    /// Restore persisted state before the first set is processed
    fn start_data(&self, _blob: &str) -> FilterResult<()> {
        Ok(())
    }

    /// Produce the state blob to persist at shutdown
    ///
    /// Only called for filters where [`Filter::persists_data`] is
    /// true; `None` skips the write.
    fn shutdown_data(&self) -> Option<String> {
        None
    }
}

impl std::fmt::Debug for dyn Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filter").field("name", &self.name()).finish()
    }
}

/// Create a registry with all built-in filters registered
///
/// Includes:
/// - `noop` - pass-through
/// - `rename` - re-home readings onto different asset names
/// - `exclude` - drop readings from unwanted assets
pub fn default_registry() -> FilterRegistry {
    let mut registry = FilterRegistry::new();
    registry.register("noop", NoopFactory);
    registry.register("rename", RenameFactory);
    registry.register("exclude", ExcludeFactory);
    registry
}
