//! Filter Registry - configuration-driven filter creation
//!
//! The registry maps filter type names to factories, letting the
//! hosting service assemble a pipeline from category documents without
//! knowing concrete filter types.

use std::collections::HashMap;

use crate::{Filter, FilterError, FilterResult};

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;

/// Factory trait for creating filters
pub trait FilterFactory: Send + Sync {
    /// Create a filter instance
    ///
    /// # Arguments
    /// * `name` - the category name the instance will be addressed by
    /// * `config` - the category's configuration document
    ///
    /// # Errors
    /// Returns `FilterError::Config` if the document is invalid.
    fn create(&self, name: &str, config: &serde_json::Value) -> FilterResult<Box<dyn Filter>>;

    /// Type name this factory is registered under
    fn type_name(&self) -> &'static str;
}

/// Registry of filter factories keyed by type name
pub struct FilterRegistry {
    factories: HashMap<String, Box<dyn FilterFactory>>,
}

impl FilterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a filter factory
    ///
    /// # Panics
    ///
    /// Panics if a factory is already registered under this type name.
    pub fn register<F: FilterFactory + 'static>(&mut self, type_name: &str, factory: F) {
        if self.factories.contains_key(type_name) {
            panic!("filter factory '{}' already registered", type_name);
        }
        self.factories
            .insert(type_name.to_string(), Box::new(factory));
    }

    /// Create a filter from its type name, instance name, and config
    pub fn create(
        &self,
        type_name: &str,
        name: &str,
        config: &serde_json::Value,
    ) -> FilterResult<Box<dyn Filter>> {
        let factory = self
            .factories
            .get(type_name)
            .ok_or_else(|| FilterError::UnknownType(type_name.to_string()))?;
        factory.create(name, config)
    }

    /// Check whether a type is registered
    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Registered type names
    pub fn available_types(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    /// Number of registered factories
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
