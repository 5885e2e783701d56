//! Crate-level error type
//!
//! Loader operations return [`LoaderError`] directly. This type wraps it
//! together with the configuration, logging and report failures that sit
//! around the loader.
//!
//! Copyright (c) 2026 GrantReady Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::LoaderError;
use std::io;
use std::path::PathBuf;

/// Result type alias for crate-level operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error loading or compiling a document
    #[error(transparent)]
    Loader(#[from] LoaderError),

    /// Invalid file format
    #[error("Invalid file format for {}: expected {}", path.display(), expected)]
    InvalidFormat { path: PathBuf, expected: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Logging setup error
    #[error("Logging error: {0}")]
    Logging(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML deserialization error
    #[error("TOML error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a logging error
    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging(message.into())
    }

    /// Whether this wraps a loader `NotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Loader(e) if e.is_not_found())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::error::DocumentKind;

    #[test]
    fn test_loader_errors_pass_through() {
        let err: Error = LoaderError::not_found(DocumentKind::Schema, "grant").into();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "schema 'grant' not found");
    }

    #[test]
    fn test_config_error_display() {
        let err = Error::config("unknown validation mode 'lenient'");
        assert_eq!(err.to_string(), "Configuration error: unknown validation mode 'lenient'");
        assert!(!err.is_not_found());
    }
}
