//! Local resolution of cross-schema `$ref`s
//!
//! Validators never fetch remote documents. Every `$ref` leaving the
//! current schema is answered from a [`SchemaRegistry`] filled with the
//! schemas of a store, matched by `$id` or by schema name.
//!
//! Copyright (c) 2026 GrantReady Team
//! Licensed under the Apache-2.0 license

use crate::loader::parser::{document_stem, Format};
use crate::schema::{Schema, SchemaReference};
use jsonschema::{Retrieve, Uri};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Schemas that `$ref`s may resolve to
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    by_id: HashMap<String, Arc<Value>>,
    by_name: HashMap<String, Arc<Value>>,
}

impl SchemaRegistry {
    /// Empty registry; every cross-schema reference fails to resolve
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema under its name and, if present, its `$id`
    pub fn insert(&mut self, schema: &Schema) {
        let definition = Arc::new(schema.definition().clone());
        if let Some(id) = &schema.metadata().id {
            self.by_id.insert(strip_fragment(id).to_string(), Arc::clone(&definition));
        }
        self.by_name.insert(schema.stem().to_string(), definition);
    }

    /// Builder-style variant of [`SchemaRegistry::insert`]
    pub fn with(mut self, schema: &Schema) -> Self {
        self.insert(schema);
        self
    }

    /// Number of registered schemas
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Whether a schema is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Definition a resolved reference URI points at.
    ///
    /// Tried in order: exact `$id`, a trailing document file name
    /// (`.../grant.json`), then the GrantReady URI layout
    /// (`https://grantready.org/schemas/<name>/...`).
    pub fn resolve(&self, uri: &str) -> Option<&Value> {
        let uri = strip_fragment(uri);
        if let Some(definition) = self.by_id.get(uri) {
            return Some(definition);
        }

        let file_name = uri.rsplit('/').next().unwrap_or(uri);
        if Format::from_name(file_name).is_ok() {
            return self.by_name.get(document_stem(file_name)).map(Arc::as_ref);
        }

        match SchemaReference::classify(uri) {
            SchemaReference::GrantReady { schema, .. } => self.by_name.get(&schema).map(Arc::as_ref),
            _ => None,
        }
    }
}

impl Retrieve for SchemaRegistry {
    fn retrieve(&self, uri: &Uri<String>) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        self.resolve(uri.as_str())
            .cloned()
            .ok_or_else(|| format!("'{}' is not a known local schema", uri.as_str()).into())
    }
}

fn strip_fragment(uri: &str) -> &str {
    uri.split('#').next().unwrap_or(uri)
}
