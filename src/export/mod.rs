//! Export of the option tree.
//!
//! The tree snapshot is taken under the read lock; encoding and file I/O
//! happen after the lock is released.

use crate::error::{Result, StoreError};
use crate::format::DocumentFormat;
use crate::store::OptionStore;
use serde_json::{Map, Value};
use std::path::Path;

/// Column width of keys in [`OptionStore::dump_as_string`].
const DUMP_KEY_WIDTH: usize = 48;

impl OptionStore {
    /// Encode the tree in `format`.
    pub fn export_as(&self, format: DocumentFormat) -> Result<String> {
        format.encode(&self.hierarchy())
    }

    /// Save the tree to `path`, in `format` or the one its extension names.
    pub fn save_as(&self, path: &Path, format: Option<DocumentFormat>) -> Result<()> {
        let format = format
            .or_else(|| DocumentFormat::from_path(path))
            .ok_or_else(|| StoreError::UnknownFormat(path.display().to_string()))?;
        self.save_with(path, |tree| format.encode(tree))
    }

    /// Save the tree to `path` using a caller-supplied encoder.
    pub fn save_with<F, B>(&self, path: &Path, encode: F) -> Result<()>
    where
        F: FnOnce(&Map<String, Value>) -> Result<B>,
        B: AsRef<[u8]>,
    {
        let bytes = encode(&self.hierarchy())?;
        std::fs::write(path, bytes).map_err(|e| StoreError::io(path, e))?;
        tracing::info!(path = %path.display(), "Saved options");
        Ok(())
    }

    /// Debug dump: sorted flat entries, a rule, then the tree as YAML.
    pub fn dump_as_string(&self) -> String {
        let mut out = String::new();
        for (key, value) in self.entries() {
            out.push_str(&format!(
                "{:<width$} => {}\n",
                key,
                value,
                width = DUMP_KEY_WIDTH
            ));
        }
        out.push_str("---------------------------------\n");
        if let Ok(yaml) = serde_yaml::to_string(&self.hierarchy()) {
            out.push_str(&yaml);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::OptionSource;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_save_as_each_format_reloads() {
        let temp = TempDir::new().unwrap();
        let store = OptionStore::new();
        store.set("logger.level", "debug");
        store.set("ports", json!([8001, 8002]));

        for name in ["out.yaml", "out.json", "out.toml"] {
            let path = temp.path().join(name);
            store.save_as(&path, None).unwrap();

            let copy = OptionStore::new();
            assert!(copy.load_file(&path).unwrap());
            assert_eq!(copy.entries(), store.entries(), "{}", name);
        }
    }

    #[test]
    fn test_save_as_unknown_extension() {
        let temp = TempDir::new().unwrap();
        let store = OptionStore::new();
        let err = store.save_as(&temp.path().join("out.txt"), None).unwrap_err();
        assert!(matches!(err, StoreError::UnknownFormat(_)));

        store
            .save_as(&temp.path().join("out.txt"), Some(DocumentFormat::Json))
            .unwrap();
    }

    #[test]
    fn test_save_with_custom_encoder() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("keys.txt");
        let store = OptionStore::new();
        store.set("a", 1);
        store.set("b", 2);

        store
            .save_with(&path, |tree| {
                let app = tree["app"].as_object().cloned().unwrap_or_default();
                Ok(app.keys().cloned().collect::<Vec<_>>().join("\n"))
            })
            .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb");
    }

    #[test]
    fn test_dump_as_string() {
        let store = OptionStore::new();
        store.set("debug", true);
        store.set("name", "demo");

        let dump = store.dump_as_string();
        let lines: Vec<&str> = dump.lines().collect();
        assert!(lines[0].starts_with("app.debug "));
        assert!(lines[0].ends_with("=> true"));
        assert!(lines[1].ends_with("=> \"demo\""));
        assert_eq!(lines[2], "---------------------------------");
        assert!(dump.contains("app:\n  debug: true\n"));
        assert_eq!(store.get_string("app.name"), "demo");
    }
}
