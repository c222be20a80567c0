//! Configuration loader with tier-based layering.
//!
//! Fills an [`OptionStore`] from every tier in priority order, so later tiers
//! overwrite earlier ones key by key.

use crate::config::StoreSettings;
use crate::error::{Result, StoreError};
use crate::format::DocumentFormat;
use crate::store::{Node, OptionStore};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Built-in defaults (lowest priority)
    Defaults = 0,
    /// Project-level file in the working directory
    Project = 1,
    /// User-level file under the home directory
    User = 2,
    /// Files named explicitly, e.g. with `--config`
    Explicit = 3,
    /// Environment variables
    Environment = 4,
    /// `key=value` overrides from the command line (highest priority)
    CommandLine = 5,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Explicit => write!(f, "explicit"),
            ConfigTier::Environment => write!(f, "environment"),
            ConfigTier::CommandLine => write!(f, "command line"),
        }
    }
}

impl OptionStore {
    /// Load a configuration file into the store.
    ///
    /// Returns `Ok(false)` without touching the store when the file does not
    /// exist. The file is decoded completely before anything is ingested, so
    /// a decode error leaves the store unchanged.
    pub fn load_file(&self, path: &Path) -> Result<bool> {
        let format = DocumentFormat::from_path(path)
            .ok_or_else(|| StoreError::UnknownFormat(path.display().to_string()))?;

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Config file not found, skipping");
                return Ok(false);
            }
            Err(e) => return Err(StoreError::io(path, e)),
        };

        let node = format.decode(&text)?;
        let written = self.ingest("", node);
        info!(path = %path.display(), %format, written, "Loaded config file");
        Ok(true)
    }
}

/// Directories probed for config files.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Project-level config directory
    pub project_dir: Option<PathBuf>,
    /// User-level config directory
    pub user_dir: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover configuration paths for `app`.
    ///
    /// The project dir is the working directory; the user dir is `~/.<app>`.
    pub fn discover(app: &str) -> Self {
        Self {
            project_dir: Some(PathBuf::from(".")),
            user_dir: dirs::home_dir().map(|h| h.join(format!(".{}", app))),
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }

    /// No directories; only explicit files are loaded.
    pub fn none() -> Self {
        Self::with_dirs(None, None)
    }

    /// First existing `<app>.<ext>` in `dir`, probing YAML, JSON, then TOML.
    pub fn find_config(dir: &Path, app: &str) -> Option<PathBuf> {
        DocumentFormat::ALL
            .iter()
            .flat_map(|format| format.extensions())
            .map(|ext| dir.join(format!("{}.{}", app, ext)))
            .find(|path| path.is_file())
    }
}

/// Builds and refreshes option stores from every tier.
///
/// ```no_run
/// use optstore::config::{ConfigLoader, ConfigPaths, StoreSettings};
///
/// let store = ConfigLoader::new("demo", StoreSettings::for_app("demo"))
///     .with_paths(ConfigPaths::discover("demo"))
///     .with_override("logger.level=debug")
///     .load()?;
/// # Ok::<(), optstore::StoreError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    app: String,
    settings: StoreSettings,
    paths: ConfigPaths,
    defaults: Option<Node>,
    files: Vec<PathBuf>,
    overrides: Vec<(String, Value)>,
    skip_env: bool,
}

impl ConfigLoader {
    /// A loader for `app` with no discovery directories.
    pub fn new(app: impl Into<String>, settings: StoreSettings) -> Self {
        Self {
            app: app.into(),
            settings,
            paths: ConfigPaths::none(),
            defaults: None,
            files: Vec::new(),
            overrides: Vec::new(),
            skip_env: false,
        }
    }

    pub fn with_paths(mut self, paths: ConfigPaths) -> Self {
        self.paths = paths;
        self
    }

    /// Defaults document, ingested at the root before any file.
    pub fn with_defaults(mut self, defaults: impl Into<Node>) -> Self {
        self.defaults = Some(defaults.into());
        self
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Add a `key=value` override; the key is prefix-wrapped when applied.
    ///
    /// A bare `key` sets `true`, the way a switch flag does.
    pub fn with_override(mut self, assignment: &str) -> Self {
        let (key, value) = match assignment.split_once('=') {
            Some((key, value)) => (key.trim(), Value::String(value.to_string())),
            None => (assignment.trim(), Value::Bool(true)),
        };
        self.overrides.push((key.to_string(), value));
        self
    }

    /// Skip the environment tier.
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// Files this loader reads, in load order: the discovered project and
    /// user files that exist, then every explicit file.
    pub fn candidate_files(&self) -> Vec<(ConfigTier, PathBuf)> {
        let mut files = Vec::new();
        let tiers = [
            (ConfigTier::Project, &self.paths.project_dir),
            (ConfigTier::User, &self.paths.user_dir),
        ];
        for (tier, dir) in tiers {
            if let Some(path) = dir
                .as_deref()
                .and_then(|dir| ConfigPaths::find_config(dir, &self.app))
            {
                files.push((tier, path));
            }
        }
        files.extend(self.files.iter().map(|p| (ConfigTier::Explicit, p.clone())));
        files
    }

    /// Every path whose appearance, change or removal alters what
    /// [`load`](Self::load) reads: each `<app>.<ext>` name in the discovery
    /// directories, existing or not, plus the explicit files.
    pub fn watch_targets(&self) -> Vec<PathBuf> {
        let mut targets = Vec::new();
        for dir in [&self.paths.project_dir, &self.paths.user_dir]
            .into_iter()
            .flatten()
        {
            for format in DocumentFormat::ALL {
                for ext in format.extensions() {
                    targets.push(dir.join(format!("{}.{}", self.app, ext)));
                }
            }
        }
        targets.extend(self.files.iter().cloned());
        targets
    }

    /// Build a new store from every tier.
    pub fn load(&self) -> Result<OptionStore> {
        let store = OptionStore::with_settings(self.settings.clone());
        self.populate(&store)?;
        Ok(store)
    }

    /// Fill `store` from every tier, returning the files actually loaded.
    pub fn populate(&self, store: &OptionStore) -> Result<Vec<PathBuf>> {
        if let Some(ref defaults) = self.defaults {
            let written = store.ingest("", defaults.clone());
            debug!(tier = %ConfigTier::Defaults, written, "Applied defaults");
        }

        let mut loaded = Vec::new();
        for (tier, path) in self.candidate_files() {
            if store.load_file(&path)? {
                debug!(%tier, path = %path.display(), "Loaded tier");
                loaded.push(path);
            }
        }

        if !self.skip_env {
            store.overlay_env();
        }

        for (key, value) in &self.overrides {
            debug!(tier = %ConfigTier::CommandLine, key = %key, "Applying override");
            store.set(key, value.clone());
        }

        Ok(loaded)
    }

    /// Rebuild every tier into a fresh store, then swap it into `store`.
    ///
    /// On error `store` keeps its previous contents.
    pub fn reload(&self, store: &OptionStore) -> Result<Vec<PathBuf>> {
        let fresh = OptionStore::with_settings(self.settings.clone());
        let loaded = self.populate(&fresh)?;
        store.replace_with(fresh);
        info!(files = loaded.len(), "Reloaded options");
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::OptionSource;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;

    fn settings() -> StoreSettings {
        StoreSettings::default().with_reset_pause(Duration::ZERO)
    }

    #[test]
    fn test_config_paths_discover() {
        let paths = ConfigPaths::discover("demo");
        assert!(paths.project_dir.is_some());
        // user_dir depends on the environment
    }

    #[test]
    fn test_find_config_prefers_yaml() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("demo.toml"), "a = 1").unwrap();
        assert_eq!(
            ConfigPaths::find_config(temp.path(), "demo"),
            Some(temp.path().join("demo.toml"))
        );
        std::fs::write(temp.path().join("demo.yml"), "a: 1").unwrap();
        assert_eq!(
            ConfigPaths::find_config(temp.path(), "demo"),
            Some(temp.path().join("demo.yml"))
        );
        assert!(ConfigPaths::find_config(temp.path(), "other").is_none());
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        let store = OptionStore::new();
        let loaded = store.load_file(&temp.path().join("absent.yaml")).unwrap();
        assert!(!loaded);
        assert!(store.is_empty());
    }

    #[test]
    fn test_unknown_extension_is_error() {
        let store = OptionStore::new();
        let err = store.load_file(Path::new("settings.ini")).unwrap_err();
        assert!(matches!(err, StoreError::UnknownFormat(_)));
    }

    #[test]
    fn test_broken_file_leaves_store_unchanged() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.yaml");
        std::fs::write(&path, "app'x':\"\n").unwrap();

        let store = OptionStore::new();
        store.set("debug", true);
        assert!(store.load_file(&path).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_user_overrides_project() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("project");
        let user_dir = temp.path().join("user");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::create_dir_all(&user_dir).unwrap();

        std::fs::write(
            project_dir.join("demo.yaml"),
            "app:\n  port: 10\n  timeout: 5s\n",
        )
        .unwrap();
        std::fs::write(user_dir.join("demo.toml"), "[app]\nport = 20\n").unwrap();

        let store = ConfigLoader::new("demo", settings())
            .with_paths(ConfigPaths::with_dirs(Some(project_dir), Some(user_dir)))
            .skip_env_vars()
            .load()
            .unwrap();

        assert_eq!(store.get_int("app.port"), 20);
        assert_eq!(store.get_duration("app.timeout"), Duration::from_secs(5));
    }

    #[test]
    fn test_defaults_files_and_overrides_layer() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("extra.json");
        std::fs::write(&file, r#"{"app":{"logger":{"level":"info"}}}"#).unwrap();

        let loader = ConfigLoader::new("demo", settings())
            .with_defaults(json!({"app": {"logger": {"level": "warn", "file": "out.log"}}}))
            .with_file(&file)
            .with_override("logger.level=debug")
            .with_override("verbose")
            .skip_env_vars();
        let store = loader.load().unwrap();

        assert_eq!(store.get_string("app.logger.level"), "debug");
        assert_eq!(store.get_string("app.logger.file"), "out.log");
        assert!(store.get_bool("app.verbose"));
    }

    #[test]
    fn test_reload_drops_stale_keys() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("demo.yaml");
        std::fs::write(&file, "app:\n  a: 1\n  b: 2\n").unwrap();

        let loader = ConfigLoader::new("demo", settings())
            .with_file(&file)
            .skip_env_vars();
        let store = loader.load().unwrap();
        assert_eq!(store.get_int("app.b"), 2);

        std::fs::write(&file, "app:\n  a: 3\n").unwrap();
        let loaded = loader.reload(&store).unwrap();

        assert_eq!(loaded, vec![file]);
        assert_eq!(store.get_int("app.a"), 3);
        assert!(!store.contains("app.b"));
        assert!(!store.get_map("app").unwrap().contains_key("b"));
    }

    #[test]
    fn test_failed_reload_keeps_store() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("demo.yaml");
        std::fs::write(&file, "app:\n  port: 8080\n").unwrap();

        let loader = ConfigLoader::new("demo", settings())
            .with_file(&file)
            .skip_env_vars();
        let store = loader.load().unwrap();

        std::fs::write(&file, "app:\n  port: [8080\n").unwrap();
        let result = loader.reload(&store);

        assert!(matches!(result, Err(StoreError::Decode { .. })));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_int("app.port"), 8080);
        assert!(store.get_map("app").is_some());
    }

    #[test]
    fn test_reload_picks_up_new_project_file() {
        let temp = TempDir::new().unwrap();
        let loader = ConfigLoader::new("demo", settings())
            .with_paths(ConfigPaths::with_dirs(Some(temp.path().to_path_buf()), None))
            .skip_env_vars();
        let store = loader.load().unwrap();
        assert!(store.is_empty());

        let created = temp.path().join("demo.toml");
        assert!(loader.watch_targets().contains(&created));

        std::fs::write(&created, "[app]\nport = 9000\n").unwrap();
        let loaded = loader.reload(&store).unwrap();

        assert_eq!(loaded, vec![created]);
        assert_eq!(store.get_int("app.port"), 9000);
    }

    #[test]
    fn test_watch_targets() {
        let loader = ConfigLoader::new("demo", settings())
            .with_paths(ConfigPaths::with_dirs(
                Some(PathBuf::from("proj")),
                Some(PathBuf::from("home")),
            ))
            .with_file("extra.json");
        let targets = loader.watch_targets();

        assert_eq!(targets.len(), 9);
        assert_eq!(targets[0], PathBuf::from("proj/demo.yaml"));
        assert!(targets.contains(&PathBuf::from("home/demo.toml")));
        assert_eq!(targets.last(), Some(&PathBuf::from("extra.json")));
    }
}
