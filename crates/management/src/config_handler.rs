//! Push-style configuration updates
//!
//! The `ConfigHandler` is the dispatch point for category changes.
//! Interested components register per category; the hosting service
//! calls [`ConfigHandler::dispatch`] when the management service
//! notifies it of a change.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

#[cfg(test)]
#[path = "config_handler_test.rs"]
mod tests;

/// Receiver of category changes
pub trait ConfigListener: Send + Sync {
    /// A category this listener registered for has changed
    fn config_change(&self, category: &str, config: &serde_json::Value);
}

/// Registry fanning category changes out to listeners
///
/// Listeners are held weakly; a dropped listener is pruned on the next
/// dispatch for its category.
#[derive(Default)]
pub struct ConfigHandler {
    listeners: Mutex<HashMap<String, Vec<Weak<dyn ConfigListener>>>>,
}

impl ConfigHandler {
    /// Create an empty handler
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a listener to a category
    pub fn register_category(&self, listener: Arc<dyn ConfigListener>, category: &str) {
        tracing::debug!(category, "registered config listener");
        self.listeners
            .lock()
            .entry(category.to_string())
            .or_default()
            .push(Arc::downgrade(&listener));
    }

    /// Number of live listeners for a category
    pub fn listener_count(&self, category: &str) -> usize {
        self.listeners
            .lock()
            .get(category)
            .map_or(0, |v| v.iter().filter(|w| w.strong_count() > 0).count())
    }

    /// Deliver a category change to every live listener
    pub fn dispatch(&self, category: &str, config: &serde_json::Value) {
        let live: Vec<Arc<dyn ConfigListener>> = {
            let mut map = self.listeners.lock();
            let Some(entries) = map.get_mut(category) else {
                tracing::debug!(category, "config change for category with no listeners");
                return;
            };
            entries.retain(|w| w.strong_count() > 0);
            entries.iter().filter_map(Weak::upgrade).collect()
        };

        for listener in live {
            listener.config_change(category, config);
        }
    }
}
