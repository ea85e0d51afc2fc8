//! Filter Pipeline - sequential reading-set transformation
//!
//! The `Pipeline` applies filters in order to the working set handed
//! over by the ingest coordinator.
//!
//! # Design
//!
//! - **Zero-cost when empty**: an empty pipeline is a no-op
//! - **Sequential execution**: each filter receives the output of the
//!   previous one; the final output is returned to the caller, which
//!   re-establishes ownership of the working batch
//! - **Built once**: the pipeline is assembled at startup and
//!   reconfigured in place on category changes; the coordinator
//!   serializes reconfiguration against processing

use crate::{Filter, FilterError, FilterResult};
use inlet_protocol::ReadingSet;

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;

/// Ordered chain of filters
pub struct Pipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl Pipeline {
    /// Create a pipeline from an ordered list of filters
    pub fn new(filters: Vec<Box<dyn Filter>>) -> Self {
        Self { filters }
    }

    /// Create an empty pipeline (no-op)
    pub fn empty() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Number of filters in the pipeline
    #[inline]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Check whether the pipeline has any filters
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Category names of every filter, in pipeline order
    pub fn names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Get a filter by category name
    pub fn get(&self, name: &str) -> Option<&dyn Filter> {
        self.filters
            .iter()
            .find(|f| f.name() == name)
            .map(|f| f.as_ref())
    }

    /// Iterate over the filters in pipeline order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Filter> {
        self.filters.iter().map(|f| f.as_ref())
    }

    /// Thread a reading set through every filter in order
    ///
    /// The returned set is whatever the last filter forwarded; an
    /// empty pipeline returns the set unchanged.
    pub fn process(&self, readings: ReadingSet) -> ReadingSet {
        let mut current = readings;
        for filter in &self.filters {
            current = filter.process(current);
        }
        current
    }

    /// Reconfigure the filter addressed by a category name
    pub fn reconfigure(&self, category: &str, config: &serde_json::Value) -> FilterResult<()> {
        match self.get(category) {
            Some(filter) => filter.reconfigure(config),
            None => Err(FilterError::UnknownCategory(category.to_string())),
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("filters", &self.names())
            .finish()
    }
}
