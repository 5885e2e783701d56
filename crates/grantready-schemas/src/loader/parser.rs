//! Document parsing for JSON and YAML formats
//!
//! Copyright (c) 2026 GrantReady Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{DocumentKind, LoaderError, LoaderResult};
use serde_json::Value;
use std::path::Path;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml)
    Yaml,
}

impl Format {
    /// Lookup order used when a document name carries no extension
    pub const LOOKUP_ORDER: [Format; 2] = [Format::Json, Format::Yaml];

    /// Detect format from a document name or path
    pub fn from_name(name: &str) -> LoaderResult<Self> {
        Self::from_extension(Path::new(name).extension().and_then(|ext| ext.to_str()))
            .ok_or_else(|| LoaderError::unsupported_format(name))
    }

    /// Detect format from an optional extension
    pub fn from_extension(extension: Option<&str>) -> Option<Self> {
        match extension?.to_lowercase().as_str() {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            _ => None,
        }
    }

    /// Get file extensions for this format
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Format::Json => &["json"],
            Format::Yaml => &["yaml", "yml"],
        }
    }
}

/// Expand a document identifier into the concrete names to look up.
///
/// A name with a supported extension is used as-is; a bare name tries
/// `.json`, `.yaml` and `.yml` in that order.
pub fn candidate_names(name: &str) -> Vec<String> {
    if Format::from_name(name).is_ok() {
        return vec![name.to_string()];
    }

    Format::LOOKUP_ORDER
        .iter()
        .flat_map(|format| format.extensions().iter())
        .map(|ext| format!("{}.{}", name, ext))
        .collect()
}

/// Strip a supported extension from a document name
pub fn document_stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext)) if Format::from_extension(Some(ext)).is_some() => stem,
        _ => name,
    }
}

/// Parser turning document text into JSON values
#[derive(Debug, Default)]
pub struct DocumentParser;

impl DocumentParser {
    /// Create a new document parser
    pub fn new() -> Self {
        Self
    }

    /// Parse content with an explicit format.
    ///
    /// Parse failures of schema documents surface as `SchemaMalformed`;
    /// any other document kind yields `MalformedDocument`.
    pub fn parse_content(
        &self,
        content: &str,
        format: Format,
        kind: DocumentKind,
        name: &str,
    ) -> LoaderResult<Value> {
        let parsed = match format {
            Format::Json => self.parse_json(content),
            Format::Yaml => self.parse_yaml(content),
        };

        parsed.map_err(|reason| match kind {
            DocumentKind::Schema => LoaderError::schema_malformed(name, reason),
            DocumentKind::Example => LoaderError::malformed_document(kind, name, reason),
        })
    }

    fn parse_json(&self, content: &str) -> Result<Value, String> {
        serde_json::from_str(content).map_err(|e| format!("invalid JSON: {}", e))
    }

    fn parse_yaml(&self, content: &str) -> Result<Value, String> {
        // Go through serde_yaml::Value first to surface YAML-specific errors
        let yaml_value: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| format!("invalid YAML: {}", e))?;

        serde_json::to_value(yaml_value).map_err(|e| format!("YAML is not representable as JSON: {}", e))
    }

    /// Serialize a value back to text in the given format
    pub fn serialize(&self, value: &Value, format: Format) -> LoaderResult<String> {
        match format {
            Format::Json => serde_json::to_string_pretty(value)
                .map_err(|e| LoaderError::cache_error(format!("Failed to serialize JSON: {}", e))),
            Format::Yaml => serde_yaml::to_string(value)
                .map_err(|e| LoaderError::cache_error(format!("Failed to serialize YAML: {}", e))),
        }
    }
}
