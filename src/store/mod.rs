//! Dual-representation option store.
//!
//! Every option lives twice: once in a flat map keyed by dotted path
//! (`app.logger.level`), which answers point lookups, and once in a nested
//! tree mirroring the same data, which answers sub-tree queries and export.
//! Both sit behind one read/write lock and are only ever updated together.
//!
//! ## Keys
//! - `set` wraps the key with the configured prefix (`logger.level` lands at
//!   `app.logger.level`); `set_nx` and every `OptionStore` reader take the key
//!   as-is. [`OptionStore::prefixed`] gives a reader that wraps keys too.
//! - Malformed keys are tolerated: `a..b` and trailing dots produce empty
//!   segments, which become empty-string map keys in the tree.
//!
//! ## Writes
//! - The last write wins. A leaf written over a branch drops the branch and
//!   its flat descendants; a leaf written below an old leaf turns that leaf
//!   into a branch.
//! - A null written where the tree holds a branch is discarded.
//! - Map values are flattened into one entry per leaf; an empty map writes nothing.

mod accessors;
mod env;
pub mod merge;
pub mod node;

pub use accessors::{OptionSource, Prefixed};
pub use node::Node;

use crate::config::{MapLookup, ResetScope, StoreSettings};
use crate::error::{Result, StoreError};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// Lock-protected pair of representations.
#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Value>,
    hierarchy: Map<String, Value>,
}

impl Inner {
    /// Write a value of any shape; maps are flattened.
    fn write(&mut self, key: String, value: Value) -> usize {
        match value {
            Value::Object(map) => self.ingest(&key, Node::from(Value::Object(map))),
            leaf => {
                self.write_leaf(key, leaf);
                1
            }
        }
    }

    fn write_leaf(&mut self, key: String, value: Value) {
        let replaces_branch = matches!(
            merge::descend(&self.hierarchy, &key),
            Some((_, Value::Object(_)))
        );
        if value.is_null() && replaces_branch {
            debug!(key = %key, "Ignoring null write over a branch");
            return;
        }

        // Leaves above this key become branches.
        for (idx, _) in key.match_indices('.') {
            self.entries.remove(&key[..idx]);
        }
        if replaces_branch {
            let below = format!("{}.", key);
            self.entries.retain(|k, _| !k.starts_with(&below));
        }

        merge::insert_path(&mut self.hierarchy, &key, value.clone());
        self.entries.insert(key, value);
    }

    fn ingest(&mut self, prefix: &str, node: Node) -> usize {
        if !node.is_map() {
            if prefix.is_empty() {
                warn!("Skipping document root that is not a map");
                return 0;
            }
            self.write_leaf(prefix.to_string(), node.into_value());
            return 1;
        }

        let mut written = 0;
        for (key, child) in node.into_entries().unwrap_or_default() {
            written += self.ingest(&join_key(prefix, &key), child);
        }
        written
    }

    fn map_at(&self, key: &str, mode: MapLookup) -> Option<&Map<String, Value>> {
        match merge::descend(&self.hierarchy, key)? {
            (_, Value::Object(branch)) => Some(branch),
            (parent, _) => match mode {
                MapLookup::Lenient => Some(parent),
                MapLookup::Strict => None,
            },
        }
    }
}

/// Join a dotted prefix and a key segment.
pub(crate) fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Thread-safe option store.
///
/// Readers take a shared lock only long enough to clone what they need;
/// writers take the exclusive lock for the whole mutation.
#[derive(Debug, Default)]
pub struct OptionStore {
    settings: StoreSettings,
    inner: RwLock<Inner>,
}

impl OptionStore {
    /// Create an empty store with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: StoreSettings) -> Self {
        Self {
            settings,
            inner: RwLock::new(Inner::default()),
        }
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// A reader whose keys are wrapped with the configured prefix.
    pub fn prefixed(&self) -> Prefixed<'_> {
        Prefixed::new(self, self.settings.dotted_prefix())
    }

    /// A reader rooted at `section`, taken as-is without the prefix.
    ///
    /// `under("server").get_int("port")` reads `server.port`; use
    /// `prefixed().under(..)` for the wrapped form.
    pub fn under(&self, section: &str) -> Prefixed<'_> {
        Prefixed::new(self, section.to_string())
    }

    /// Set `key` (prefix-wrapped) to `value`.
    ///
    /// ```
    /// use optstore::{OptionSource, OptionStore};
    ///
    /// let store = OptionStore::new();
    /// store.set("debug", true);
    /// assert!(store.get_bool("app.debug"));
    /// ```
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        self.set_nx(&self.settings.wrap_key(key), value);
    }

    /// Set `key` exactly as given, without the prefix.
    pub fn set_nx(&self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        let mut inner = self.inner.write();
        inner.write(key.to_string(), value);
    }

    /// Ingest a decoded document below `prefix` under one exclusive lock.
    ///
    /// Map nodes are walked recursively with their keys stringified; every
    /// other node becomes one entry. Returns the number of entries written.
    pub fn ingest(&self, prefix: &str, node: impl Into<Node>) -> usize {
        let node = node.into();
        let mut inner = self.inner.write();
        let written = inner.ingest(prefix, node);
        debug!(prefix = %prefix, written, "Ingested document");
        written
    }

    /// Ingest a namespace of named sections, each below `prefix.<name>`.
    pub fn ingest_sections<I, K, N>(&self, prefix: &str, sections: I) -> usize
    where
        I: IntoIterator<Item = (K, N)>,
        K: AsRef<str>,
        N: Into<Node>,
    {
        let mut inner = self.inner.write();
        sections
            .into_iter()
            .map(|(name, section)| inner.ingest(&join_key(prefix, name.as_ref()), section.into()))
            .sum()
    }

    /// Raw value at `key`, cloned out under the read lock.
    pub(crate) fn raw(&self, key: &str) -> Option<Value> {
        self.inner.read().entries.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.read().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Sorted snapshot of the flat entries.
    pub fn entries(&self) -> BTreeMap<String, Value> {
        self.inner
            .read()
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Map found at `key` in the tree, using the configured lookup mode.
    ///
    /// In lenient mode a path ending on a leaf yields the leaf's parent map,
    /// so `get_map("app.debug")` returns `app` with `debug` and its siblings.
    pub fn get_map(&self, key: &str) -> Option<Map<String, Value>> {
        self.get_map_with(key, self.settings.map_lookup)
    }

    pub fn get_map_with(&self, key: &str, mode: MapLookup) -> Option<Map<String, Value>> {
        self.inner.read().map_at(key, mode).cloned()
    }

    /// Snapshot of the whole tree for export.
    pub fn hierarchy(&self) -> Map<String, Value> {
        self.inner.read().hierarchy.clone()
    }

    /// Deserialize the section at `path` (prefix-wrapped) into `T`.
    pub fn section<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        self.section_from(&self.settings.wrap_key(path))
    }

    /// Deserialize the section at `path` into `T` through a YAML round trip.
    ///
    /// Returns `Ok(None)` when nothing lives at `path`.
    pub fn section_from<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let Some(section) = self.get_map(path) else {
            return Ok(None);
        };
        let text = serde_yaml::to_string(&section).map_err(|e| StoreError::section(path, e))?;
        serde_yaml::from_str(&text)
            .map(Some)
            .map_err(|e| StoreError::section(path, e))
    }

    /// Take over the contents of `other` in one exclusive section.
    ///
    /// Readers see either the old contents or the new ones, never a mix.
    pub fn replace_with(&self, other: OptionStore) {
        let incoming = other.inner.into_inner();
        let mut inner = self.inner.write();
        let dropped = inner.entries.len();
        *inner = incoming;
        info!(dropped, entries = inner.entries.len(), "Option store replaced");
    }

    /// Clear the store using the configured reset scope.
    pub fn reset(&self) {
        self.reset_scoped(self.settings.reset_scope);
    }

    /// Clear the store, pausing for the configured delay before releasing
    /// the write lock. Callers arriving meanwhile wait, then see an empty map.
    pub fn reset_scoped(&self, scope: ResetScope) {
        let mut inner = self.inner.write();
        let dropped = inner.entries.len();
        inner.entries = HashMap::new();

        let pause = self.settings.reset_pause();
        if !pause.is_zero() {
            std::thread::sleep(pause);
        }

        if scope == ResetScope::All {
            inner.hierarchy = Map::new();
        }
        info!(dropped, ?scope, "Option store reset");
    }
}
