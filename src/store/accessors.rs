//! Typed accessors.
//!
//! Every lenient accessor reduces to the string form of the stored value plus
//! a coercion rule, and degrades to the zero value on failure: an absent key,
//! a present-but-unparseable value and a real zero all look the same. The
//! `try_` family reports the difference as a [`StoreError`].

use super::{OptionStore, join_key};
use crate::error::{Result, StoreError};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::Duration;

const TRUTHY: &[&str] = &["1", "y", "t", "yes", "true", "ok", "on"];
const FALSY: &[&str] = &["0", "n", "f", "no", "false", "off"];

/// String form of a stored value.
///
/// Lists are joined with commas so they split back into their elements.
/// Floats use the shortest form, so `8080.0` reads as `8080`.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => f.to_string(),
            _ => n.to_string(),
        },
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',').map(str::to_string).collect()
}

fn parse_int(value: &Value) -> Option<i64> {
    value_to_string(value).parse().ok()
}

/// Parse a duration such as `5s`, `300ms` or `1h30m`.
pub fn parse_duration(s: &str) -> Option<Duration> {
    if s == "0" {
        return Some(Duration::ZERO);
    }
    humantime::parse_duration(s).ok()
}

fn parse_bool(s: &str) -> Option<bool> {
    let lower = s.to_lowercase();
    if TRUTHY.contains(&lower.as_str()) {
        Some(true)
    } else if FALSY.contains(&lower.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Read access to options with type coercion.
///
/// Implementors only supply [`lookup`](OptionSource::lookup); everything else
/// is derived from it.
pub trait OptionSource {
    /// Raw value stored for `key`, if any.
    fn lookup(&self, key: &str) -> Option<Value>;

    /// Raw value for `key`; null when absent.
    fn get(&self, key: &str) -> Value {
        self.lookup(key).unwrap_or(Value::Null)
    }

    fn get_string(&self, key: &str) -> String {
        self.lookup(key)
            .map(|v| value_to_string(&v))
            .unwrap_or_default()
    }

    /// True for `1`, `y`, `t`, `yes`, `true`, `ok` and `on` in any case.
    fn get_bool(&self, key: &str) -> bool {
        let s = self.get_string(key).to_lowercase();
        TRUTHY.contains(&s.as_str())
    }

    fn get_int(&self, key: &str) -> i64 {
        self.get_string(key).parse().unwrap_or_default()
    }

    fn get_uint(&self, key: &str) -> u64 {
        self.get_string(key).parse().unwrap_or_default()
    }

    fn get_f32(&self, key: &str) -> f32 {
        self.get_f64(key) as f32
    }

    fn get_f64(&self, key: &str) -> f64 {
        self.get_string(key).parse().unwrap_or_default()
    }

    fn get_duration(&self, key: &str) -> Duration {
        parse_duration(&self.get_string(key)).unwrap_or_default()
    }

    /// Lists are taken element-wise, strings and other scalars split on `,`.
    fn get_string_slice(&self, key: &str) -> Vec<String> {
        match self.lookup(key) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().map(value_to_string).collect(),
            Some(other) => split_list(&value_to_string(&other)),
        }
    }

    /// Like `get_string_slice`, dropping elements that are not integers.
    fn get_int_slice(&self, key: &str) -> Vec<i64> {
        match self.lookup(key) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().filter_map(parse_int).collect(),
            Some(other) => split_list(&value_to_string(&other))
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect(),
        }
    }

    fn try_get_string(&self, key: &str) -> Result<String> {
        self.lookup(key)
            .map(|v| value_to_string(&v))
            .ok_or_else(|| StoreError::Missing(key.to_string()))
    }

    /// Strict boolean: the truthy set, or `0`, `n`, `f`, `no`, `false`, `off`.
    fn try_get_bool(&self, key: &str) -> Result<bool> {
        let s = self.try_get_string(key)?;
        parse_bool(&s).ok_or_else(|| StoreError::coerce(key, s, "boolean"))
    }

    fn try_get_int(&self, key: &str) -> Result<i64> {
        let s = self.try_get_string(key)?;
        s.parse().map_err(|_| StoreError::coerce(key, s, "integer"))
    }

    fn try_get_uint(&self, key: &str) -> Result<u64> {
        let s = self.try_get_string(key)?;
        s.parse()
            .map_err(|_| StoreError::coerce(key, s, "unsigned integer"))
    }

    fn try_get_f64(&self, key: &str) -> Result<f64> {
        let s = self.try_get_string(key)?;
        s.parse().map_err(|_| StoreError::coerce(key, s, "number"))
    }

    fn try_get_duration(&self, key: &str) -> Result<Duration> {
        let s = self.try_get_string(key)?;
        parse_duration(&s).ok_or_else(|| StoreError::coerce(key, s, "duration"))
    }
}

impl OptionSource for OptionStore {
    fn lookup(&self, key: &str) -> Option<Value> {
        self.raw(key)
    }
}

/// View of a store that reads and writes below a fixed base path.
///
/// With the default prefix, `prefixed().get_bool("debug")` reads `app.debug`
/// and `prefixed().under("server").get_int("port")` reads `app.server.port`.
/// [`OptionStore::under`] starts from the root instead of the prefix.
#[derive(Debug, Clone)]
pub struct Prefixed<'a> {
    store: &'a OptionStore,
    base: String,
}

impl<'a> Prefixed<'a> {
    pub(super) fn new(store: &'a OptionStore, base: String) -> Self {
        Self { store, base }
    }

    /// A view one section deeper.
    pub fn under(&self, section: &str) -> Prefixed<'a> {
        Prefixed::new(self.store, self.key(section))
    }

    /// Path this view is rooted at.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Absolute key for `key` relative to this view.
    pub fn key(&self, key: &str) -> String {
        if key.is_empty() {
            self.base.clone()
        } else {
            join_key(&self.base, key)
        }
    }

    pub fn set(&self, key: &str, value: impl Into<Value>) {
        self.store.set_nx(&self.key(key), value);
    }

    pub fn get_map(&self, key: &str) -> Option<Map<String, Value>> {
        self.store.get_map(&self.key(key))
    }

    pub fn section<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        self.store.section_from(&self.key(path))
    }
}

impl OptionSource for Prefixed<'_> {
    fn lookup(&self, key: &str) -> Option<Value> {
        self.store.raw(&self.key(key))
    }
}
