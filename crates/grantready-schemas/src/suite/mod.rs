//! Whole-repository validation run
//!
//! A suite run checks every schema in the loader's schema store against its
//! meta-schema, compiles the valid ones with `$ref`s resolving among each
//! other, validates every example against the schema it belongs to, checks
//! cross-schema references and returns a [`ValidationReport`].
//!
//! Copyright (c) 2026 GrantReady Team
//! Licensed under the Apache-2.0 license

pub mod report;

use crate::config::Config;
use crate::loader::{LoaderResult, SchemaLoader};
use crate::logging::{generate_run_id, timing::Timer};
use crate::schema::{check_references, Schema, SchemaRegistry};
use crate::validation::{JsonSchemaValidator, SchemaValidator};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

pub use report::{ExampleReport, ReportSummary, SchemaReport, SkippedExample, ValidationReport};

const EXAMPLE_SUFFIX: &str = "-example";

/// Picks the schema an example payload should be validated against
#[derive(Debug, Clone, Default)]
pub struct SchemaDetector {
    schemas: BTreeSet<String>,
}

impl SchemaDetector {
    /// Detector over the given schema names
    pub fn new<I, S>(schemas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schemas: schemas.into_iter().map(Into::into).collect(),
        }
    }

    /// Schema for an example: `<name>-example` maps to `<name>`, otherwise
    /// the document's identifying fields decide
    pub fn detect(&self, example_name: &str, document: &Value) -> Option<String> {
        if let Some(stem) = example_name.strip_suffix(EXAMPLE_SUFFIX) {
            if self.schemas.contains(stem) {
                return Some(stem.to_string());
            }
        }

        let has = |field: &str| document.get(field).is_some_and(|v| !v.is_null());
        let detected = if has("grantId") && has("grantNumber") {
            "grant"
        } else if has("disbursementId") && has("grantId") {
            "disbursement"
        } else if has("auditId") && has("findings") {
            "audit"
        } else {
            return None;
        };

        Some(detected.to_string())
    }
}

/// Runs schema, example and cross-reference checks over a loader
#[derive(Debug)]
pub struct ValidationSuite {
    loader: SchemaLoader,
}

impl ValidationSuite {
    /// Suite over an existing loader
    pub fn new(loader: SchemaLoader) -> Self {
        Self { loader }
    }

    /// Suite reading the directories named in a configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(SchemaLoader::from_config(config))
    }

    /// The underlying loader
    pub fn loader_mut(&mut self) -> &mut SchemaLoader {
        &mut self.loader
    }

    /// Run every check and build the report.
    ///
    /// Problems with individual documents are recorded in the report; only
    /// failures to list the stores are returned as errors.
    pub fn run(&mut self) -> LoaderResult<ValidationReport> {
        let timer = Timer::new("validation_suite");
        let mut report = ValidationReport::new(generate_run_id());

        let compiled = {
            let _entered = timer.span().enter();
            let loaded = self.load_schemas(&mut report)?;
            let validators = self.compile_schemas(&loaded, &mut report);
            self.validate_examples(&validators, &mut report)?;
            Self::check_cross_references(&loaded, &mut report);
            validators.len()
        };

        report.summary.update_success_rate();
        let summary = &report.summary;
        info!(
            run_id = %report.run_id,
            schemas = summary.total_schemas,
            valid_schemas = summary.valid_schemas,
            examples = summary.total_examples,
            valid_examples = summary.valid_examples,
            skipped = summary.skipped_examples.len(),
            cross_reference_errors = summary.cross_reference_errors.len(),
            success_rate = summary.success_rate,
            compiled,
            "Validation suite finished"
        );

        timer.finish();
        Ok(report)
    }

    /// Parse every schema and check it against its meta-schema. Schemas
    /// passing both are returned by name.
    fn load_schemas(&mut self, report: &mut ValidationReport) -> LoaderResult<BTreeMap<String, Schema>> {
        let names = self.loader.schema_names()?;
        report.summary.total_schemas = names.len();

        let mut loaded = BTreeMap::new();
        for name in names {
            let (entry, schema) = match self.loader.load_schema(&name) {
                Ok(schema) => match JsonSchemaValidator::check_schema(&schema) {
                    Ok(()) => (SchemaReport::valid(schema.metadata().clone()), Some(schema)),
                    Err(e) => (SchemaReport::invalid(Some(schema.metadata().clone()), e.to_string()), None),
                },
                Err(e) => (SchemaReport::invalid(None, e.to_string()), None),
            };

            if let Some(error) = entry.errors.first() {
                warn!(schema = %name, error = %error, "Schema invalid");
            }
            if let Some(schema) = schema {
                loaded.insert(name.clone(), schema);
            }
            report.schemas.insert(name, entry);
        }

        Ok(loaded)
    }

    /// Compile the loaded schemas with `$ref`s resolving among themselves.
    ///
    /// A schema that fails to compile only because a cross-schema reference
    /// has no target stays valid; the broken reference is reported by the
    /// cross-reference check and its examples are skipped.
    fn compile_schemas(
        &self,
        loaded: &BTreeMap<String, Schema>,
        report: &mut ValidationReport,
    ) -> BTreeMap<String, JsonSchemaValidator> {
        let registry = loaded.values().fold(SchemaRegistry::new(), |registry, schema| registry.with(schema));
        let known: BTreeSet<String> = loaded.keys().cloned().collect();

        let mut validators = BTreeMap::new();
        for (name, schema) in loaded {
            match self.loader.build_validator(schema, &registry) {
                Ok(validator) => {
                    debug!(schema = %name, "Schema valid");
                    validators.insert(name.clone(), validator);
                }
                Err(e) if !check_references(schema, &known).is_empty() => {
                    debug!(schema = %name, error = %e, "Schema not compiled, unresolved references");
                }
                Err(e) => {
                    warn!(schema = %name, error = %e, "Schema invalid");
                    if let Some(entry) = report.schemas.get_mut(name) {
                        entry.valid = false;
                        entry.errors.push(e.to_string());
                    }
                }
            }
        }

        report.summary.valid_schemas = report.schemas.values().filter(|entry| entry.valid).count();
        validators
    }

    fn validate_examples(
        &mut self,
        validators: &BTreeMap<String, JsonSchemaValidator>,
        report: &mut ValidationReport,
    ) -> LoaderResult<()> {
        let names = self.loader.example_names()?;
        report.summary.total_examples = names.len();
        let detector = SchemaDetector::new(report.schemas.keys().cloned());

        for name in names {
            let payload = match self.loader.load_example(&name) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(example = %name, error = %e, "Example could not be loaded");
                    report.examples.insert(
                        name,
                        ExampleReport {
                            valid: false,
                            schema: None,
                            errors: Vec::new(),
                            load_error: Some(e.to_string()),
                        },
                    );
                    continue;
                }
            };

            let detected = detector.detect(&name, payload.document());
            let Some((schema, validator)) = detected
                .as_ref()
                .and_then(|schema| validators.get(schema).map(|v| (schema.clone(), v)))
            else {
                let reason = match detected {
                    Some(schema) if report.schemas.get(&schema).is_some_and(|entry| entry.valid) => {
                        format!("schema '{}' has unresolved references", schema)
                    }
                    Some(schema) => format!("schema '{}' is missing or invalid", schema),
                    None => "no matching schema".to_string(),
                };
                warn!(example = %name, reason = %reason, "Skipping example");
                report.summary.skipped_examples.push(SkippedExample { example: name, reason });
                continue;
            };

            let result = validator.validate(payload.document());
            if result.is_valid() {
                report.summary.valid_examples += 1;
                debug!(example = %name, schema = %schema, "Example valid");
            } else {
                warn!(example = %name, schema = %schema, errors = result.error_count(), "Example invalid");
            }

            report.examples.insert(
                name,
                ExampleReport {
                    valid: result.is_valid(),
                    schema: Some(schema),
                    errors: result.into_errors(),
                    load_error: None,
                },
            );
        }

        Ok(())
    }

    /// Report `$ref`s of valid schemas that name a schema which is missing
    /// or invalid
    fn check_cross_references(loaded: &BTreeMap<String, Schema>, report: &mut ValidationReport) {
        let valid: BTreeSet<String> = report
            .schemas
            .iter()
            .filter(|(_, entry)| entry.valid)
            .map(|(name, _)| name.clone())
            .collect();

        for (_, schema) in loaded.iter().filter(|(name, _)| valid.contains(*name)) {
            let errors = check_references(schema, &valid);
            for error in &errors {
                warn!(
                    schema = %error.schema,
                    reference = %error.reference,
                    "Broken cross-reference"
                );
            }
            report.summary.cross_reference_errors.extend(errors);
        }
    }
}
