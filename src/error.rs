//! Error types for store loading, exporting and strict lookups.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the option store.
///
/// Lenient typed accessors never produce these; they degrade to zero values.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a file failed.
    #[error("failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document could not be decoded.
    #[error("failed to decode {format} document: {message}")]
    Decode { format: &'static str, message: String },

    /// The hierarchy could not be encoded.
    #[error("failed to encode {format} document: {message}")]
    Encode { format: &'static str, message: String },

    /// A section did not survive the intermediate round trip.
    #[error("section '{path}' cannot be converted: {message}")]
    Section { path: String, message: String },

    /// No document format matches the file name.
    #[error("unknown document format for '{0}'")]
    UnknownFormat(String),

    /// Strict lookup of a key that is not present.
    #[error("option '{0}' is not set")]
    Missing(String),

    /// Strict lookup of a value that does not coerce to the wanted type.
    #[error("option '{key}' = '{value}' is not a valid {target}")]
    Coerce {
        key: String,
        value: String,
        target: &'static str,
    },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn decode(format: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            format,
            message: err.to_string(),
        }
    }

    pub fn encode(format: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Encode {
            format,
            message: err.to_string(),
        }
    }

    pub fn section(path: &str, err: impl std::fmt::Display) -> Self {
        Self::Section {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    pub fn coerce(key: &str, value: impl Into<String>, target: &'static str) -> Self {
        Self::Coerce {
            key: key.to_string(),
            value: value.into(),
            target,
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
