//! `$ref` extraction and cross-schema reference checks
//!
//! Copyright (c) 2026 GrantReady Team
//! Licensed under the Apache-2.0 license

use crate::loader::parser::document_stem;
use crate::schema::Schema;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Base URI under which GrantReady publishes its schemas
pub const GRANTREADY_SCHEMA_BASE: &str = "https://grantready.org/schemas/";

const STANDARD_SCHEMA_BASE: &str = "https://json-schema.org/";

static GRANTREADY_REF_REGEX: OnceLock<Regex> = OnceLock::new();

fn grantready_ref_regex() -> &'static Regex {
    GRANTREADY_REF_REGEX
        .get_or_init(|| Regex::new(r"^https://grantready\.org/schemas/([^/#]+)").unwrap())
}

/// Classification of a single `$ref` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaReference {
    /// Same-document pointer (`#/$defs/money`)
    Internal(String),
    /// Reference into the JSON Schema meta-schemas
    Standard(String),
    /// Reference to another published GrantReady schema
    GrantReady { uri: String, schema: String },
    /// Relative file reference (`disbursement.json#/$defs/x`)
    Relative { uri: String, schema: String },
    /// Anything else (foreign absolute URIs)
    External(String),
}

impl SchemaReference {
    /// Classify a `$ref` value
    pub fn classify(reference: &str) -> Self {
        if reference.starts_with('#') {
            return Self::Internal(reference.to_string());
        }
        if reference.starts_with(STANDARD_SCHEMA_BASE) {
            return Self::Standard(reference.to_string());
        }
        if let Some(caps) = grantready_ref_regex().captures(reference) {
            if let Some(name) = caps.get(1) {
                return Self::GrantReady {
                    uri: reference.to_string(),
                    schema: name.as_str().to_string(),
                };
            }
        }
        if reference.contains("://") {
            return Self::External(reference.to_string());
        }

        let document = reference.split('#').next().unwrap_or_default();
        let file_name = document.rsplit('/').next().unwrap_or(document);
        Self::Relative {
            uri: reference.to_string(),
            schema: document_stem(file_name).to_string(),
        }
    }

    /// Name of the local schema this reference must resolve to, if any
    pub fn target_schema(&self) -> Option<&str> {
        match self {
            Self::GrantReady { schema, .. } | Self::Relative { schema, .. } => Some(schema),
            _ => None,
        }
    }
}

/// A reference that points at a missing or invalid schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReferenceError {
    /// Schema containing the reference
    pub schema: String,
    /// The `$ref` value
    pub reference: String,
    /// Explanation
    pub error: String,
}

/// Collect every `$ref` string in a schema definition, depth first
pub fn collect_references(value: &Value) -> Vec<String> {
    let mut references = Vec::new();
    collect_into(value, &mut references);
    references
}

fn collect_into(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match (key.as_str(), child) {
                    ("$ref", Value::String(reference)) => out.push(reference.clone()),
                    _ => collect_into(child, out),
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_into(item, out)),
        _ => {}
    }
}

/// Check that every cross-schema reference in `schema` names a schema in
/// `valid_schemas` (compared by stem)
pub fn check_references(schema: &Schema, valid_schemas: &BTreeSet<String>) -> Vec<CrossReferenceError> {
    schema
        .references()
        .into_iter()
        .filter_map(|reference| {
            let classified = SchemaReference::classify(&reference);
            let target = classified.target_schema()?;
            if valid_schemas.contains(target) {
                None
            } else {
                Some(CrossReferenceError {
                    schema: schema.stem().to_string(),
                    error: format!("Referenced schema {} not found or invalid", target),
                    reference,
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_references() {
        assert_eq!(
            SchemaReference::classify("#/$defs/currency"),
            SchemaReference::Internal("#/$defs/currency".to_string())
        );
        assert!(matches!(
            SchemaReference::classify("https://json-schema.org/draft/2020-12/schema"),
            SchemaReference::Standard(_)
        ));

        let reference = SchemaReference::classify("https://grantready.org/schemas/disbursement/v2.1.0");
        assert_eq!(reference.target_schema(), Some("disbursement"));

        let reference = SchemaReference::classify("audit.json#/$defs/finding");
        assert_eq!(reference.target_schema(), Some("audit"));

        let reference = SchemaReference::classify("https://example.com/other.json");
        assert!(matches!(reference, SchemaReference::External(_)));
        assert_eq!(reference.target_schema(), None);
    }

    #[test]
    fn test_collect_references_in_document_order() {
        let definition = json!({
            "properties": {
                "a": {"$ref": "#/$defs/a"},
                "b": {"items": [{"$ref": "audit.json"}]}
            }
        });
        assert_eq!(collect_references(&definition), vec!["#/$defs/a", "audit.json"]);
    }

    #[test]
    fn test_check_references() {
        let schema = Schema::new(
            "grant.json",
            json!({
                "properties": {
                    "disbursements": {
                        "type": "array",
                        "items": {"$ref": "https://grantready.org/schemas/disbursement/v2.1.0"}
                    },
                    "audit": {"$ref": "https://grantready.org/schemas/audit/v2.1.0"},
                    "currency": {"$ref": "#/$defs/currency"}
                }
            }),
        )
        .unwrap();

        let valid: BTreeSet<String> = ["grant", "disbursement"].iter().map(|s| s.to_string()).collect();
        let errors = check_references(&schema, &valid);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].schema, "grant");
        assert_eq!(errors[0].reference, "https://grantready.org/schemas/audit/v2.1.0");
        assert!(errors[0].error.contains("audit"));
    }
}
