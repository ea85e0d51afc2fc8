//! Configuration categories
//!
//! A category is a named JSON configuration document owned by the
//! management service. Filter instances are addressed by their
//! category name.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "category_test.rs"]
mod tests;

/// Named configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigCategory {
    name: String,
    value: serde_json::Value,
}

impl ConfigCategory {
    /// Create a category
    pub fn new(name: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Category name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full configuration document
    #[inline]
    pub fn value(&self) -> &serde_json::Value {
        &self.value
    }

    /// Look up one configuration item
    pub fn item(&self, key: &str) -> Option<&serde_json::Value> {
        self.value.get(key)
    }

    /// Look up a string item
    pub fn item_str(&self, key: &str) -> Option<&str> {
        self.item(key).and_then(|v| v.as_str())
    }

    /// Look up an integer item
    pub fn item_u64(&self, key: &str) -> Option<u64> {
        self.item(key).and_then(|v| v.as_u64())
    }
}
