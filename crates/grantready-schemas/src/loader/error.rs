//! Error types for schema and example loading
//!
//! Copyright (c) 2026 GrantReady Team
//! Licensed under the Apache-2.0 license

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;

/// The kind of document a loader request was for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentKind {
    /// A JSON Schema definition
    Schema,
    /// An example payload
    Example,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema => write!(f, "schema"),
            Self::Example => write!(f, "example"),
        }
    }
}

/// Infrastructure errors raised while loading or compiling documents.
///
/// A payload that fails validation is never reported through this type;
/// it produces a normal [`crate::ValidationResult`] instead.
#[derive(Error, Debug)]
pub enum LoaderError {
    /// The requested identifier does not resolve to a stored document
    #[error("{kind} '{name}' not found")]
    NotFound { kind: DocumentKind, name: String },

    /// The schema document itself is unusable
    #[error("Schema '{name}' is malformed: {reason}")]
    SchemaMalformed { name: String, reason: String },

    /// A non-schema document failed to parse
    #[error("Failed to parse {kind} '{name}': {reason}")]
    MalformedDocument {
        kind: DocumentKind,
        name: String,
        reason: String,
    },

    /// File I/O errors
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Unsupported file format
    #[error("Unsupported document format for '{name}'. Expected .json, .yaml, or .yml")]
    UnsupportedFormat { name: String },

    /// Identifier escapes the store root
    #[error("Path traversal detected in document name '{name}'")]
    PathTraversal { name: String },

    /// Cache operation errors
    #[error("Cache operation failed: {reason}")]
    Cache { reason: String },
}

impl LoaderError {
    /// Create a not-found error
    pub fn not_found(kind: DocumentKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Create a malformed-schema error
    pub fn schema_malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaMalformed {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed-document error
    pub fn malformed_document(
        kind: DocumentKind,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedDocument {
            kind,
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an I/O error with path context
    pub fn io_error(path: PathBuf, error: std::io::Error) -> Self {
        Self::Io {
            path,
            source: error,
        }
    }

    /// Create an unsupported format error
    pub fn unsupported_format(name: impl Into<String>) -> Self {
        Self::UnsupportedFormat { name: name.into() }
    }

    /// Create a path traversal error
    pub fn path_traversal(name: impl Into<String>) -> Self {
        Self::PathTraversal { name: name.into() }
    }

    /// Create a cache error
    pub fn cache_error(reason: impl Into<String>) -> Self {
        Self::Cache {
            reason: reason.into(),
        }
    }

    /// Whether this is a `NotFound` error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this is a `SchemaMalformed` error
    pub fn is_schema_malformed(&self) -> bool {
        matches!(self, Self::SchemaMalformed { .. })
    }

    /// Document name associated with this error, if any
    pub fn document_name(&self) -> Option<&str> {
        match self {
            Self::NotFound { name, .. }
            | Self::SchemaMalformed { name, .. }
            | Self::MalformedDocument { name, .. }
            | Self::UnsupportedFormat { name }
            | Self::PathTraversal { name } => Some(name),
            Self::Io { .. } | Self::Cache { .. } => None,
        }
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Cache { .. })
    }
}
