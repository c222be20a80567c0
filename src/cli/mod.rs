//! CLI command definitions for optstore
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod export;
pub mod get;

use crate::config::{ConfigLoader, ConfigPaths, StoreSettings};
use clap::{Parser, Subcommand};
use export::ExportArgs;
use get::GetArgs;

/// Default application name, used for key and environment prefixes.
pub const DEFAULT_APP: &str = "app";

/// Layered option store: inspect, query and export resolved options
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to load (repeatable, later files win)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Vec<String>,

    /// Application name; sets the key prefix and environment prefix
    #[arg(long, default_value = DEFAULT_APP, global = true)]
    pub app: String,

    /// Skip discovery of project and user config files
    #[arg(long, global = true)]
    pub no_discover: bool,

    /// Skip environment variable overrides
    #[arg(long, global = true)]
    pub no_env: bool,

    /// Override an option, e.g. `-s logger.level=debug` (repeatable)
    #[arg(short, long = "set", global = true, value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every flat entry followed by the tree (default)
    Dump,

    /// Print one option
    Get(GetArgs),

    /// Write the option tree as YAML, JSON or TOML
    Export(ExportArgs),

    /// Keep the options loaded and reload them when config files change
    Watch,
}

impl Cli {
    /// Build the loader described by the global options.
    pub fn loader(&self) -> ConfigLoader {
        let mut loader = ConfigLoader::new(&self.app, StoreSettings::for_app(&self.app));
        if !self.no_discover {
            loader = loader.with_paths(ConfigPaths::discover(&self.app));
        }
        for file in &self.config {
            loader = loader.with_file(file);
        }
        for assignment in &self.set {
            loader = loader.with_override(assignment);
        }
        if self.no_env {
            loader = loader.skip_env_vars();
        }
        loader
    }
}
