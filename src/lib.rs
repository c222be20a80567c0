//! Option store library.
//!
//! This module exports the store, its settings and loaders for use by
//! command-line front ends and tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod format;
pub mod store;

pub use error::{Result, StoreError};
pub use format::DocumentFormat;
pub use store::{Node, OptionSource, OptionStore, Prefixed};
