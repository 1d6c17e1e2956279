//! Error types for document and configuration loading.

use std::path::PathBuf;

use argz_core::UnionError;
use thiserror::Error;

/// Errors that can occur while loading documents or configuration.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A union in the document mixes incompatible options.
    #[error("invalid union at {location}: {source}")]
    InvalidUnion {
        /// Dotted key path of the union.
        location: String,
        /// Why construction failed.
        source: UnionError,
    },

    /// The file extension is neither JSON nor YAML.
    #[error("unsupported document format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// Convenience alias for results with [`DocumentError`].
pub type Result<T> = std::result::Result<T, DocumentError>;
