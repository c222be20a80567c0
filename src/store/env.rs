//! Environment variable overlay.

use super::OptionStore;
use serde_json::Value;
use tracing::{debug, info};

impl OptionStore {
    /// Overwrite existing options from the process environment.
    ///
    /// See [`overlay_env_with`](Self::overlay_env_with).
    pub fn overlay_env(&self) -> usize {
        self.overlay_env_with(|name| std::env::var(name).ok())
    }

    /// Overwrite existing options from variables resolved by `lookup`.
    ///
    /// Each flat key maps to a variable name via
    /// [`StoreSettings::env_key`](crate::config::StoreSettings::env_key); a set
    /// variable replaces the value at that same key with its string. The whole
    /// pass runs under one write lock. Returns the number of overrides applied.
    pub fn overlay_env_with<F>(&self, mut lookup: F) -> usize
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut inner = self.inner.write();
        let mut keys: Vec<String> = inner.entries.keys().cloned().collect();
        keys.sort();

        let mut applied = 0;
        for key in keys {
            let name = self.settings.env_key(&key);
            if let Some(value) = lookup(&name) {
                debug!(key = %key, env = %name, "Environment overrides option");
                inner.write_leaf(key, Value::String(value));
                applied += 1;
            }
        }

        if applied > 0 {
            info!(applied, "Applied environment overrides");
        }
        applied
    }
}
