//! Noop Filter - pass-through
//!
//! Forwards every set untouched. Useful for pipeline wiring tests and
//! as the minimal example of the `Filter` trait.

use crate::registry::FilterFactory;
use crate::{Filter, FilterResult};
use inlet_protocol::ReadingSet;

#[cfg(test)]
#[path = "noop_test.rs"]
mod tests;

/// Pass-through filter
pub struct NoopFilter {
    name: String,
}

impl NoopFilter {
    /// Create a noop filter with a category name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Filter for NoopFilter {
    fn process(&self, readings: ReadingSet) -> ReadingSet {
        readings
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn reconfigure(&self, _config: &serde_json::Value) -> FilterResult<()> {
        Ok(())
    }
}

/// Factory for [`NoopFilter`]
pub struct NoopFactory;

impl FilterFactory for NoopFactory {
    fn create(&self, name: &str, _config: &serde_json::Value) -> FilterResult<Box<dyn Filter>> {
        Ok(Box::new(NoopFilter::new(name)))
    }

    fn type_name(&self) -> &'static str {
        "noop"
    }
}
