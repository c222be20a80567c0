//! Store settings.
//!
//! Settings deserialize from YAML/JSON with per-field defaults, so a partial
//! document only overrides what it names.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How `get_map` treats a path that ends on a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapLookup {
    /// A leaf yields its parent map (the leaf and its siblings).
    #[default]
    Lenient,
    /// A leaf yields nothing; only branches are returned.
    Strict,
}

/// What `reset` clears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetScope {
    /// Clear the flat entries only; the tree keeps its last shape.
    #[default]
    Entries,
    /// Clear both the flat entries and the tree.
    All,
}

/// Settings for an [`OptionStore`](crate::store::OptionStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Dotted key prefix applied by the wrapped accessors.
    #[serde(default = "default_prefix")]
    pub prefix: Vec<String>,

    /// Segments joined in front of derived environment variable names.
    #[serde(default = "default_env_prefix")]
    pub env_prefix: Vec<String>,

    /// Pause taken by `reset` while holding the write lock.
    #[serde(default = "default_reset_pause_ms")]
    pub reset_pause_ms: u64,

    #[serde(default)]
    pub map_lookup: MapLookup,

    #[serde(default)]
    pub reset_scope: ResetScope,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            env_prefix: default_env_prefix(),
            reset_pause_ms: default_reset_pause_ms(),
            map_lookup: MapLookup::default(),
            reset_scope: ResetScope::default(),
        }
    }
}

fn default_prefix() -> Vec<String> {
    vec!["app".to_string()]
}

fn default_env_prefix() -> Vec<String> {
    vec!["APP".to_string()]
}

fn default_reset_pause_ms() -> u64 {
    100
}

impl StoreSettings {
    /// Settings whose key prefix and env prefix both derive from `name`.
    ///
    /// `for_app("Demo")` wraps keys with `demo.` and reads `DEMO_*` variables.
    pub fn for_app(name: &str) -> Self {
        Self {
            prefix: vec![name.to_lowercase()],
            env_prefix: vec![name.to_uppercase()],
            ..Self::default()
        }
    }

    pub fn with_prefix<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefix = segments.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env_prefix<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.env_prefix = segments.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_reset_pause(mut self, pause: Duration) -> Self {
        self.reset_pause_ms = pause.as_millis() as u64;
        self
    }

    pub fn with_map_lookup(mut self, mode: MapLookup) -> Self {
        self.map_lookup = mode;
        self
    }

    pub fn with_reset_scope(mut self, scope: ResetScope) -> Self {
        self.reset_scope = scope;
        self
    }

    pub fn reset_pause(&self) -> Duration {
        Duration::from_millis(self.reset_pause_ms)
    }

    /// The key prefix joined with dots, e.g. `app`.
    pub fn dotted_prefix(&self) -> String {
        self.prefix.join(".")
    }

    /// Prepend the key prefix to `key`.
    ///
    /// An empty prefix leaves the key alone; an empty key yields the prefix itself.
    pub fn wrap_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            return key.to_string();
        }
        let prefix = self.dotted_prefix();
        if key.is_empty() {
            prefix
        } else {
            format!("{}.{}", prefix, key)
        }
    }

    /// Environment variable name for a flat key.
    ///
    /// The dotted prefix is stripped first, so with the defaults both
    /// `app.logger.level` and `logger.level` map to `APP_LOGGER_LEVEL`.
    pub fn env_key(&self, key: &str) -> String {
        let prefix = self.dotted_prefix();
        let bare = if prefix.is_empty() {
            key
        } else {
            key.strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                .unwrap_or(key)
        };
        let name = bare.replace(['.', '-'], "_").to_uppercase();
        self.env_prefix
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(name.as_str()))
            .collect::<Vec<_>>()
            .join("_")
    }
}
