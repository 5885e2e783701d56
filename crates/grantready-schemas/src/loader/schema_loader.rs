//! Schema and example loader with caching
//!
//! Copyright (c) 2026 GrantReady Team
//! Licensed under the Apache-2.0 license

use crate::bundled;
use crate::config::Config;
use crate::loader::{
    cache::{CacheConfig, CacheEntry, CacheStats, DocumentCache},
    error::{DocumentKind, LoaderError, LoaderResult},
    parser::{document_stem, DocumentParser},
    store::{DirectoryStore, DocumentStore},
};
use crate::schema::{Payload, Schema, SchemaRegistry};
use crate::validation::{JsonSchemaValidator, RuleSet, SchemaValidator, ValidationConfig, ValidationResult, ValidatorOptions};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, trace};

/// Loads named schemas and example payloads from document stores
#[derive(Debug)]
pub struct SchemaLoader {
    schemas: Box<dyn DocumentStore>,
    examples: Box<dyn DocumentStore>,
    parser: DocumentParser,
    cache: DocumentCache,
    validation: ValidationConfig,
}

impl SchemaLoader {
    /// Create a loader over explicit schema and example stores
    pub fn new<S, E>(schemas: S, examples: E) -> Self
    where
        S: DocumentStore + 'static,
        E: DocumentStore + 'static,
    {
        Self {
            schemas: Box::new(schemas),
            examples: Box::new(examples),
            parser: DocumentParser::new(),
            cache: DocumentCache::new(),
            validation: ValidationConfig::default(),
        }
    }

    /// Create a loader reading from two directories
    pub fn from_dirs(schemas_dir: impl Into<PathBuf>, examples_dir: impl Into<PathBuf>) -> Self {
        Self::new(DirectoryStore::new(schemas_dir), DirectoryStore::new(examples_dir))
    }

    /// Create a loader from a configuration
    pub fn from_config(config: &Config) -> Self {
        Self::from_dirs(config.schemas_dir.clone(), config.examples_dir.clone())
            .with_cache_config(config.cache.clone())
            .with_validation_config(config.validation.clone())
    }

    /// Create a loader over the GrantReady schemas compiled into the crate
    pub fn bundled() -> LoaderResult<Self> {
        Ok(Self::new(bundled::schema_store()?, bundled::example_store()?))
    }

    /// Replace the cache configuration, dropping cached documents
    pub fn with_cache_config(mut self, config: CacheConfig) -> Self {
        self.cache = DocumentCache::with_config(config);
        self
    }

    /// Replace the configuration used by [`SchemaLoader::validator_for`]
    pub fn with_validation_config(mut self, config: ValidationConfig) -> Self {
        self.validation = config;
        self
    }

    /// Validation configuration applied to validators built by this loader
    pub fn validation_config(&self) -> &ValidationConfig {
        &self.validation
    }

    /// Load a schema by identifier (`grant`, `grant.json`, `grant.yaml`)
    pub fn load_schema(&mut self, name: &str) -> LoaderResult<Schema> {
        let (document_name, definition) = self.load_document(DocumentKind::Schema, name)?;
        Schema::new(document_name, definition)
    }

    /// Load an example payload by identifier
    pub fn load_example(&mut self, name: &str) -> LoaderResult<Payload> {
        let (document_name, document) = self.load_document(DocumentKind::Example, name)?;
        Ok(Payload::new(document_name, document))
    }

    /// Load a schema bypassing the cache
    pub fn reload_schema(&mut self, name: &str) -> LoaderResult<Schema> {
        self.cache.remove(&(DocumentKind::Schema, name.to_string()));
        self.load_schema(name)
    }

    /// Whether a document is currently cached under `name`
    pub fn is_cached(&self, kind: DocumentKind, name: &str) -> bool {
        self.cache.contains(&(kind, name.to_string()))
    }

    /// Schema identifiers available in the schema store, without extensions
    pub fn schema_names(&self) -> LoaderResult<Vec<String>> {
        Self::stems(self.schemas.as_ref())
    }

    /// Example identifiers available in the example store, without extensions
    pub fn example_names(&self) -> LoaderResult<Vec<String>> {
        Self::stems(self.examples.as_ref())
    }

    /// Registry of every schema in the schema store that loads. Schemas that
    /// fail to load are left out.
    pub fn registry(&mut self) -> LoaderResult<SchemaRegistry> {
        let mut registry = SchemaRegistry::new();
        for name in self.schema_names()? {
            match self.load_schema(&name) {
                Ok(schema) => registry.insert(&schema),
                Err(e) => debug!(schema = %name, error = %e, "Schema left out of registry"),
            }
        }
        Ok(registry)
    }

    /// Build a validator for a schema, applying the loader's validation
    /// configuration and, when enabled, the schema's business rules.
    /// `$ref`s to other schemas resolve against this loader's schema store.
    pub fn validator_for(&mut self, name: &str) -> LoaderResult<JsonSchemaValidator> {
        let schema = self.load_schema(name)?;
        let registry = if schema.has_external_references() {
            self.registry()?
        } else {
            SchemaRegistry::new()
        };
        self.build_validator(&schema, &registry)
    }

    /// Like [`SchemaLoader::validator_for`] for an already loaded schema and
    /// a prepared registry
    pub fn build_validator(&self, schema: &Schema, registry: &SchemaRegistry) -> LoaderResult<JsonSchemaValidator> {
        let validator =
            JsonSchemaValidator::with_registry(schema, ValidatorOptions::from(&self.validation), registry)?;

        if self.validation.business_rules {
            Ok(validator.with_rules(RuleSet::for_schema(schema.stem())))
        } else {
            Ok(validator)
        }
    }

    /// Validate a payload against a named schema
    pub fn validate(&mut self, schema: &str, payload: &Value) -> LoaderResult<ValidationResult> {
        Ok(self.validator_for(schema)?.validate(payload))
    }

    /// Clear all cached documents
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Get cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop expired cache entries
    pub fn cleanup_cache(&mut self) -> usize {
        self.cache.cleanup_expired()
    }

    fn load_document(&mut self, kind: DocumentKind, name: &str) -> LoaderResult<(String, Value)> {
        let store = match kind {
            DocumentKind::Schema => &self.schemas,
            DocumentKind::Example => &self.examples,
        };
        let key = (kind, name.to_string());

        let current_mtime = store.modified(name)?;
        if let Some(entry) = self.cache.get(&key, current_mtime) {
            trace!(%kind, name, "Cache hit");
            return Ok((entry.document_name, entry.content));
        }

        let stored = store
            .read(name)?
            .ok_or_else(|| LoaderError::not_found(kind, name))?;
        let value = self
            .parser
            .parse_content(&stored.content, stored.format, kind, &stored.name)?;

        debug!(%kind, name = %stored.name, store = %store.describe(), "Loaded document");

        self.cache.put(
            key,
            CacheEntry::new(value.clone(), stored.name.clone(), stored.modified),
        );
        Ok((stored.name, value))
    }

    fn stems(store: &dyn DocumentStore) -> LoaderResult<Vec<String>> {
        let names: BTreeSet<String> = store
            .list()?
            .iter()
            .map(|name| document_stem(name).to_string())
            .collect();
        Ok(names.into_iter().collect())
    }
}
