//! Rename filter configuration

use std::collections::HashMap;

use serde::Deserialize;

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

/// Configuration for the rename filter
///
/// # Example
///
/// ```json
/// { "rules": { "pump1": "pump_house_1", "pump2": "pump_house_2" } }
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenameConfig {
    /// Exact-match asset name rewrites
    pub rules: HashMap<String, String>,
}

impl RenameConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one rewrite rule
    pub fn with_rule(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rules.insert(from.into(), to.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        for (from, to) in &self.rules {
            if from.is_empty() || to.is_empty() {
                return Err("rename rules must not have empty asset names".to_string());
            }
        }
        Ok(())
    }
}

impl TryFrom<&serde_json::Value> for RenameConfig {
    type Error = String;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        let config: RenameConfig =
            serde_json::from_value(value.clone()).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }
}
