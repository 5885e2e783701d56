//! JSON Schema validator compiled from a loaded [`Schema`]
//!
//! Copyright (c) 2026 GrantReady Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use crate::schema::{Payload, Schema, SchemaRegistry};
use crate::validation::base::{SchemaValidator, ValidationContext, ValidationMode};
use crate::validation::error::{ValidationIssue, ValidationResult};
use crate::validation::keywords::{compliance_reference, COMPLIANCE_REFERENCE};
use crate::validation::rules::RuleSet;
use crate::validation::ValidationConfig;
use chrono::NaiveDate;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Options fixed when a validator is built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Mode used by [`SchemaValidator::validate`]
    pub mode: ValidationMode,
    /// Whether `format` keywords are asserted
    pub validate_formats: bool,
    /// Reference day for time-relative rules
    pub reference_date: Option<NaiveDate>,
    /// Stop collecting issues after this many
    pub max_errors: Option<usize>,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            mode: ValidationMode::Strict,
            validate_formats: true,
            reference_date: None,
            max_errors: None,
        }
    }
}

impl From<&ValidationConfig> for ValidatorOptions {
    fn from(config: &ValidationConfig) -> Self {
        Self {
            mode: config.mode,
            validate_formats: config.validate_formats,
            reference_date: config.reference_date,
            max_errors: config.max_errors,
        }
    }
}

/// Validates payloads against one compiled schema, plus optional rules.
///
/// The compiled form is shared behind an `Arc`, so clones are cheap and a
/// validator can be used from several threads at once.
#[derive(Clone)]
pub struct JsonSchemaValidator {
    schema: Arc<Schema>,
    compiled: Arc<jsonschema::Validator>,
    options: ValidatorOptions,
    rules: RuleSet,
}

impl fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaValidator")
            .field("schema", &self.schema.name())
            .field("options", &self.options)
            .field("rules", &self.rules)
            .finish()
    }
}

impl JsonSchemaValidator {
    /// Compile a schema with default options and no business rules
    pub fn new(schema: &Schema) -> LoaderResult<Self> {
        Self::with_options(schema, ValidatorOptions::default())
    }

    /// Compile a schema with explicit options. Cross-schema references
    /// cannot resolve; use [`JsonSchemaValidator::with_registry`] for those.
    pub fn with_options(schema: &Schema, options: ValidatorOptions) -> LoaderResult<Self> {
        Self::with_registry(schema, options, &SchemaRegistry::new())
    }

    /// Compile a schema whose `$ref`s to other schemas resolve from
    /// `registry`. Nothing is fetched over the network.
    pub fn with_registry(
        schema: &Schema,
        options: ValidatorOptions,
        registry: &SchemaRegistry,
    ) -> LoaderResult<Self> {
        let compiled = jsonschema::options()
            .should_validate_formats(options.validate_formats)
            .with_retriever(registry.clone())
            .with_keyword(COMPLIANCE_REFERENCE, compliance_reference)
            .build(schema.definition())
            .map_err(|e| LoaderError::schema_malformed(schema.name(), e.to_string()))?;

        debug!(
            schema = schema.name(),
            mode = %options.mode,
            registered = registry.len(),
            "Compiled schema validator"
        );

        Ok(Self {
            schema: Arc::new(schema.clone()),
            compiled: Arc::new(compiled),
            options,
            rules: RuleSet::new(),
        })
    }

    /// Check a schema definition against its JSON Schema meta-schema,
    /// without resolving any `$ref`
    pub fn check_schema(schema: &Schema) -> LoaderResult<()> {
        match jsonschema::meta::try_validate(schema.definition()) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(LoaderError::schema_malformed(schema.name(), e.to_string())),
            Err(e) => Err(LoaderError::schema_malformed(schema.name(), e.to_string())),
        }
    }

    /// Attach business rules
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// The schema this validator was built from
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Options the validator was built with
    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Attached business rules
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Validate a loaded example payload
    pub fn validate_payload(&self, payload: &Payload) -> ValidationResult {
        self.validate(payload.document())
    }

    fn schema_issues(&self, input: &Value, ctx: &ValidationContext) -> Vec<ValidationIssue> {
        self.compiled
            .iter_errors(input)
            .map(|error| {
                let instance_path = error.instance_path.to_string();
                let schema_path = error.schema_path.to_string();
                let keyword = schema_path
                    .rsplit('/')
                    .next()
                    .filter(|segment| !segment.is_empty())
                    .unwrap_or("schema")
                    .to_string();

                ValidationIssue::schema(
                    ctx.at_pointer(&instance_path).path,
                    error.to_string(),
                    keyword,
                    Some(schema_path),
                )
            })
            .collect()
    }
}

impl SchemaValidator for JsonSchemaValidator {
    type Input = Value;

    fn mode(&self) -> ValidationMode {
        self.options.mode
    }

    fn context(&self) -> ValidationContext {
        let ctx = ValidationContext::new(self.mode());
        match self.options.reference_date {
            Some(date) => ctx.with_reference_date(date),
            None => ctx,
        }
    }

    fn validate_with_context(&self, input: &Value, context: &ValidationContext) -> ValidationResult {
        let mut issues = self.schema_issues(input, context);
        issues.extend(self.rules.check(input, context));

        if let Some(max) = self.options.max_errors {
            issues.truncate(max);
        }

        trace!(
            schema = self.schema.name(),
            path = %context.path,
            issues = issues.len(),
            "Validated payload"
        );

        ValidationResult::from_issues(issues)
    }
}
