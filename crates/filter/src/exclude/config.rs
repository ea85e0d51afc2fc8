//! Exclude filter configuration

use std::collections::HashSet;

use serde::Deserialize;

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

/// Configuration for the exclude filter
///
/// # Example
///
/// ```json
/// { "assets": ["test_rig", "bench_sensor"] }
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExcludeConfig {
    /// Asset names whose readings are dropped
    pub assets: HashSet<String>,
}

impl ExcludeConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one excluded asset
    pub fn with_asset(mut self, asset: impl Into<String>) -> Self {
        self.assets.insert(asset.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.assets.iter().any(|a| a.is_empty()) {
            return Err("excluded asset names must not be empty".to_string());
        }
        Ok(())
    }
}

impl TryFrom<&serde_json::Value> for ExcludeConfig {
    type Error = String;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        let config: ExcludeConfig =
            serde_json::from_value(value.clone()).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }
}
