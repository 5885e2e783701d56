//! Loaded schema and payload documents
//!
//! Copyright (c) 2026 GrantReady Team
//! Licensed under the Apache-2.0 license

pub mod references;
pub mod registry;

use crate::loader::error::{LoaderError, LoaderResult};
use crate::loader::parser::document_stem;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

pub use references::{check_references, collect_references, CrossReferenceError, SchemaReference};
pub use registry::SchemaRegistry;

static VERSION_REGEX: OnceLock<Regex> = OnceLock::new();

fn version_regex() -> &'static Regex {
    VERSION_REGEX.get_or_init(|| Regex::new(r"v(\d+\.\d+\.\d+)").unwrap())
}

/// Descriptive metadata extracted from a schema definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaMetadata {
    #[serde(rename = "$id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Version parsed from `$id` (`.../v2.1.0`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Meta-schema URI from `$schema`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<String>,
    /// Top-level required properties
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl SchemaMetadata {
    /// Extract metadata from a schema definition
    pub fn from_definition(definition: &Value) -> Self {
        let text = |key: &str| definition.get(key).and_then(Value::as_str).map(str::to_string);
        let id = text("$id");

        let version = id.as_deref().and_then(|id| {
            version_regex()
                .captures(id)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        });

        let required = definition
            .get("required")
            .and_then(Value::as_array)
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id,
            title: text("title"),
            description: text("description"),
            version,
            draft: text("$schema"),
            required,
        }
    }
}

/// A named, immutable schema definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    name: String,
    definition: Value,
    metadata: SchemaMetadata,
}

impl Schema {
    /// Wrap a schema definition.
    ///
    /// The root must be an object or a boolean; anything else is rejected
    /// as `SchemaMalformed`. Keyword-level problems are caught later, when
    /// a validator compiles the schema.
    pub fn new(name: impl Into<String>, definition: Value) -> LoaderResult<Self> {
        let name = name.into();
        if !(definition.is_object() || definition.is_boolean()) {
            return Err(LoaderError::schema_malformed(
                name,
                format!("schema root must be an object or boolean, found {}", json_type_name(&definition)),
            ));
        }

        let metadata = SchemaMetadata::from_definition(&definition);
        Ok(Self {
            name,
            definition,
            metadata,
        })
    }

    /// Identifier the schema was loaded under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier without a file extension (`grant.json` -> `grant`)
    pub fn stem(&self) -> &str {
        document_stem(&self.name)
    }

    /// The raw schema definition
    pub fn definition(&self) -> &Value {
        &self.definition
    }

    /// Extracted metadata
    pub fn metadata(&self) -> &SchemaMetadata {
        &self.metadata
    }

    /// All `$ref` values in this schema, in document order
    pub fn references(&self) -> Vec<String> {
        collect_references(&self.definition)
    }

    /// Whether any `$ref` leaves this document (other than to the JSON
    /// Schema meta-schemas)
    pub fn has_external_references(&self) -> bool {
        self.references().iter().any(|reference| {
            !matches!(
                SchemaReference::classify(reference),
                SchemaReference::Internal(_) | SchemaReference::Standard(_)
            )
        })
    }
}

/// A named, immutable example payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    name: String,
    document: Value,
}

impl Payload {
    /// Wrap a payload document
    pub fn new(name: impl Into<String>, document: Value) -> Self {
        Self {
            name: name.into(),
            document,
        }
    }

    /// Identifier the payload was loaded under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier without a file extension
    pub fn stem(&self) -> &str {
        document_stem(&self.name)
    }

    /// The payload document
    pub fn document(&self) -> &Value {
        &self.document
    }
}

/// JSON type name used in messages
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_metadata_extraction() {
        let schema = Schema::new(
            "grant.json",
            json!({
                "$schema": "https://json-schema.org/draft/2020-12/schema",
                "$id": "https://grantready.org/schemas/grant/v2.1.0",
                "title": "Grant",
                "type": "object",
                "required": ["grantId", "fundingAmount"]
            }),
        )
        .unwrap();

        let metadata = schema.metadata();
        assert_eq!(metadata.title.as_deref(), Some("Grant"));
        assert_eq!(metadata.version.as_deref(), Some("2.1.0"));
        assert_eq!(metadata.required, vec!["grantId", "fundingAmount"]);
        assert_eq!(schema.stem(), "grant");
    }

    #[test]
    fn test_schema_without_version() {
        let schema = Schema::new("amount", json!({"type": "object"})).unwrap();
        assert!(schema.metadata().version.is_none());
        assert!(schema.metadata().required.is_empty());
    }

    #[test]
    fn test_schema_root_must_be_object_or_bool() {
        assert!(Schema::new("open", json!(true)).is_ok());

        let err = Schema::new("broken", json!(["type", "object"])).unwrap_err();
        assert!(err.is_schema_malformed());
        assert!(err.to_string().contains("found array"));
    }

    #[test]
    fn test_payload_accessors() {
        let payload = Payload::new("grant-example.json", json!({"grantId": "GRANT-1"}));
        assert_eq!(payload.stem(), "grant-example");
        assert_eq!(payload.document()["grantId"], "GRANT-1");
    }
}
