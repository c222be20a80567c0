//! Export subcommand for optstore CLI
//!
//! Writes the resolved option tree in a structured format that can be
//! loaded back with `--config`.

use crate::format::DocumentFormat;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// Format selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Yaml,
    Json,
    Toml,
}

impl From<ExportFormat> for DocumentFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Yaml => DocumentFormat::Yaml,
            ExportFormat::Json => DocumentFormat::Json,
            ExportFormat::Toml => DocumentFormat::Toml,
        }
    }
}

/// Arguments for the export subcommand
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file path (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (default: from the output extension, else YAML)
    #[arg(short, long, value_enum)]
    pub format: Option<ExportFormat>,
}

impl ExportArgs {
    /// Resolve the format: explicit flag, then output extension, then YAML.
    pub fn document_format(&self) -> DocumentFormat {
        self.format
            .map(DocumentFormat::from)
            .or_else(|| {
                self.output
                    .as_deref()
                    .and_then(DocumentFormat::from_path)
            })
            .unwrap_or(DocumentFormat::Yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_format() {
        let args = ExportArgs {
            output: Some(PathBuf::from("out.toml")),
            format: None,
        };
        assert_eq!(args.document_format(), DocumentFormat::Toml);

        let args = ExportArgs {
            output: Some(PathBuf::from("out.toml")),
            format: Some(ExportFormat::Json),
        };
        assert_eq!(args.document_format(), DocumentFormat::Json);

        let args = ExportArgs {
            output: None,
            format: None,
        };
        assert_eq!(args.document_format(), DocumentFormat::Yaml);
    }
}
