//! Store settings and tiered loading.
//!
//! Options are layered from lowest to highest priority:
//! 1. **Defaults** - a document supplied by the application
//! 2. **Project** - `./<app>.{yaml,yml,json,toml}`
//! 3. **User** - `~/.<app>/<app>.{yaml,yml,json,toml}`
//! 4. **Explicit** - files passed with `--config`
//! 5. **Environment** - `<ENV_PREFIX>_<KEY>` for every key already present
//! 6. **Command line** - `key=value` overrides
//!
//! ## Environment Variables
//! With the default settings, `app.logger.level` is overridden by
//! `APP_LOGGER_LEVEL`. Only keys that some earlier tier created are looked up.

mod loader;
mod types;
pub mod watcher;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier};
pub use types::*;
