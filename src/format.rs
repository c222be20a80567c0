//! Document formats for loading and saving the option tree.

use crate::error::{Result, StoreError};
use crate::store::Node;
use serde_json::{Map, Value};
use std::path::Path;

/// Structured document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
    Toml,
}

impl DocumentFormat {
    /// All formats, in the order config files are probed.
    pub const ALL: [DocumentFormat; 3] = [
        DocumentFormat::Yaml,
        DocumentFormat::Json,
        DocumentFormat::Toml,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Some(DocumentFormat::Yaml),
            "json" => Some(DocumentFormat::Json),
            "toml" => Some(DocumentFormat::Toml),
            _ => None,
        }
    }

    /// Format implied by the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_str)
    }

    pub fn name(&self) -> &'static str {
        match self {
            DocumentFormat::Yaml => "yaml",
            DocumentFormat::Json => "json",
            DocumentFormat::Toml => "toml",
        }
    }

    /// File extensions recognised for this format.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            DocumentFormat::Yaml => &["yaml", "yml"],
            DocumentFormat::Json => &["json"],
            DocumentFormat::Toml => &["toml"],
        }
    }

    /// Decode `text` into a document node.
    pub fn decode(&self, text: &str) -> Result<Node> {
        let node = match self {
            DocumentFormat::Yaml => {
                let value: serde_yaml::Value =
                    serde_yaml::from_str(text).map_err(|e| StoreError::decode(self.name(), e))?;
                Node::from(value)
            }
            DocumentFormat::Json => {
                let value: Value =
                    serde_json::from_str(text).map_err(|e| StoreError::decode(self.name(), e))?;
                Node::from(value)
            }
            DocumentFormat::Toml => {
                let value: toml::Table =
                    toml::from_str(text).map_err(|e| StoreError::decode(self.name(), e))?;
                Node::from(toml::Value::Table(value))
            }
        };
        Ok(node)
    }

    /// Encode a tree as text.
    pub fn encode(&self, tree: &Map<String, Value>) -> Result<String> {
        match self {
            DocumentFormat::Yaml => {
                serde_yaml::to_string(tree).map_err(|e| StoreError::encode(self.name(), e))
            }
            DocumentFormat::Json => serde_json::to_string_pretty(tree)
                .map_err(|e| StoreError::encode(self.name(), e)),
            DocumentFormat::Toml => {
                toml::to_string_pretty(tree).map_err(|e| StoreError::encode(self.name(), e))
            }
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
