//! File watcher that keeps a store in sync with its config files.
//!
//! Watches the directories holding the loaded files, and on a debounced
//! change to one of those files reloads the whole store through its
//! [`ConfigLoader`]. Outcomes are published through a tokio watch channel.

use super::loader::ConfigLoader;
use crate::store::OptionStore;
use notify_debouncer_mini::{DebouncedEventKind, new_debouncer};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Events emitted by the watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigChangeEvent {
    /// Files changed and the store was reloaded; holds the changed files.
    Reloaded(Vec<PathBuf>),
    /// Files changed but reloading failed; the store may be partially filled.
    ReloadFailed(String),
    /// Watcher encountered an error
    Error(String),
}

impl ConfigChangeEvent {
    /// Get the affected paths for this event.
    pub fn affected_paths(&self) -> Vec<&Path> {
        match self {
            ConfigChangeEvent::Reloaded(paths) => paths.iter().map(|p| p.as_path()).collect(),
            ConfigChangeEvent::ReloadFailed(_) | ConfigChangeEvent::Error(_) => vec![],
        }
    }
}

/// Configuration for the file watcher.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Debounce duration for coalescing rapid changes.
    pub debounce_duration: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_duration: Duration::from_millis(500),
        }
    }
}

/// Handle to control the config watcher.
pub struct ConfigWatcherHandle {
    /// Receiver for config change events.
    pub events: watch::Receiver<Option<ConfigChangeEvent>>,
    /// Handle to the watcher task (dropping this will stop the watcher).
    _task_handle: tokio::task::JoinHandle<()>,
}

impl ConfigWatcherHandle {
    /// Wait for the next config change event.
    pub async fn wait_for_change(&mut self) -> Option<ConfigChangeEvent> {
        loop {
            if self.events.changed().await.is_err() {
                return None;
            }
            let event = self.events.borrow().clone();
            if event.is_some() {
                return event;
            }
        }
    }

    /// Get the latest event without waiting.
    pub fn latest_event(&self) -> Option<ConfigChangeEvent> {
        self.events.borrow().clone()
    }
}

/// Starts watching `files` and reloading `store` when they change.
///
/// A file need not exist yet: its directory is watched, so creating it later
/// triggers a reload too. Must be called from within a tokio runtime.
pub fn start_config_watcher(
    files: Vec<PathBuf>,
    config: WatcherConfig,
    store: Arc<OptionStore>,
    loader: ConfigLoader,
) -> Result<ConfigWatcherHandle, notify::Error> {
    let (event_tx, event_rx) = watch::channel(None);
    let (notify_tx, notify_rx) = mpsc::channel();

    let mut debouncer = new_debouncer(config.debounce_duration, notify_tx)?;
    let watcher = debouncer.watcher();

    let mut watched: BTreeSet<PathBuf> = BTreeSet::new();
    let mut dirs: BTreeSet<PathBuf> = BTreeSet::new();
    for file in files {
        let file = absolute(&file);
        if let Some(dir) = file.parent() {
            dirs.insert(dir.to_path_buf());
        }
        watched.insert(file);
    }
    for dir in &dirs {
        if dir.exists() {
            info!("Watching config directory: {}", dir.display());
            watcher.watch(dir, notify::RecursiveMode::NonRecursive)?;
        } else {
            warn!(
                "Config directory does not exist, skipping watch: {}",
                dir.display()
            );
        }
    }

    let task_handle = tokio::task::spawn_blocking(move || {
        // Keep the debouncer alive
        let _debouncer = debouncer;
        process_notify_events(notify_rx, event_tx, &watched, &store, &loader);
    });

    Ok(ConfigWatcherHandle {
        events: event_rx,
        _task_handle: task_handle,
    })
}

/// Absolute form of `path` with `.` segments dropped, so `./demo.yaml`
/// matches the paths notify reports.
fn absolute(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    joined.components().collect()
}

/// Reload on every batch that touches a watched file.
fn process_notify_events(
    rx: mpsc::Receiver<Result<Vec<notify_debouncer_mini::DebouncedEvent>, notify::Error>>,
    tx: watch::Sender<Option<ConfigChangeEvent>>,
    watched: &BTreeSet<PathBuf>,
    store: &OptionStore,
    loader: &ConfigLoader,
) {
    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed = classify_events(events, watched);
                if changed.is_empty() {
                    continue;
                }
                debug!("Config change detected: {:?}", changed);
                let event = match loader.reload(store) {
                    Ok(_) => ConfigChangeEvent::Reloaded(changed),
                    Err(e) => {
                        error!("Failed to reload options: {}", e);
                        ConfigChangeEvent::ReloadFailed(e.to_string())
                    }
                };
                if tx.send(Some(event)).is_err() {
                    info!("Config watcher receiver dropped, stopping");
                    return;
                }
            }
            Ok(Err(e)) => {
                error!("File watcher error: {}", e);
                let _ = tx.send(Some(ConfigChangeEvent::Error(e.to_string())));
            }
            Err(_) => {
                info!("Config watcher channel closed, stopping");
                return;
            }
        }
    }
}

/// Watched files touched by a batch of debounced events.
fn classify_events(
    events: Vec<notify_debouncer_mini::DebouncedEvent>,
    watched: &BTreeSet<PathBuf>,
) -> Vec<PathBuf> {
    let mut changed = BTreeSet::new();
    for event in events {
        if !matches!(
            event.kind,
            DebouncedEventKind::Any | DebouncedEventKind::AnyContinuous
        ) {
            continue;
        }
        if watched.contains(&event.path) {
            changed.insert(event.path);
        }
    }
    changed.into_iter().collect()
}
