//! Validation of GrantReady payloads
//!
//! Payloads are checked against a compiled JSON Schema and, optionally, a
//! set of business rules. Modes control how much runs:
//!
//! - **Basic**: JSON Schema validation only
//! - **Partial**: Schema + rules that need no outside context
//! - **Strict**: Schema + all rules
//!
//! A payload that fails never produces an `Err`; the outcome is always a
//! [`ValidationResult`].
//!
//! Copyright (c) 2026 GrantReady Team
//! Licensed under the Apache-2.0 license

pub mod base;
pub mod error;
pub mod keywords;
pub mod rules;
pub mod validator;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

// Re-export commonly used types
pub use base::{SchemaValidator, ValidationContext, ValidationHelpers, ValidationMode};
pub use error::{IssueSource, ValidationIssue, ValidationResult, Violation};
pub use rules::{Rule, RuleSet};
pub use validator::{JsonSchemaValidator, ValidatorOptions};

/// Validation settings shared by loaders, batches and suites
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Validation mode to use
    pub mode: ValidationMode,
    /// Whether `format` keywords are asserted
    pub validate_formats: bool,
    /// Whether built-in business rules are attached to validators
    pub business_rules: bool,
    /// Whether a batch stops at the first invalid payload
    pub fail_fast: bool,
    /// Maximum number of errors to collect
    pub max_errors: Option<usize>,
    /// Reference day for time-relative rules
    pub reference_date: Option<NaiveDate>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            mode: ValidationMode::Strict,
            validate_formats: true,
            business_rules: false,
            fail_fast: false,
            max_errors: None,
            reference_date: None,
        }
    }
}

impl ValidationConfig {
    /// Create a configuration for strict validation
    pub fn strict() -> Self {
        Self::default()
    }

    /// Create a configuration for partial validation
    pub fn partial() -> Self {
        Self {
            mode: ValidationMode::Partial,
            ..Self::default()
        }
    }

    /// Create a configuration for basic validation
    pub fn basic() -> Self {
        Self {
            mode: ValidationMode::Basic,
            ..Self::default()
        }
    }

    /// Attach the built-in business rules
    pub fn with_business_rules(mut self) -> Self {
        self.business_rules = true;
        self
    }

    /// Enable fail-fast mode
    pub fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Set maximum number of errors to collect
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = Some(max_errors);
        self
    }

    /// Set the reference day for time-relative rules
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }
}

/// Results of validating several payloads with one validator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    /// One result per payload validated, in input order
    pub results: Vec<ValidationResult>,
    /// Whether the batch stopped before the last payload
    pub stopped_early: bool,
}

impl BatchOutcome {
    /// Whether every validated payload conforms
    pub fn all_valid(&self) -> bool {
        self.results.iter().all(ValidationResult::is_valid)
    }

    /// Total issues across all results
    pub fn error_count(&self) -> usize {
        self.results.iter().map(ValidationResult::error_count).sum()
    }

    /// Indices of payloads that failed
    pub fn failed_indices(&self) -> Vec<usize> {
        self.results
            .iter()
            .enumerate()
            .filter(|(_, result)| !result.is_valid())
            .map(|(i, _)| i)
            .collect()
    }
}

/// Validate several payloads, reporting paths as `$[i].field`
pub fn validate_batch<V>(validator: &V, payloads: &[Value], config: &ValidationConfig) -> BatchOutcome
where
    V: SchemaValidator<Input = Value>,
{
    let mut context = validator.context().with_mode(config.mode);
    if let Some(date) = config.reference_date {
        context = context.with_reference_date(date);
    }

    let mut outcome = BatchOutcome::default();
    let mut collected = 0usize;

    for (i, payload) in payloads.iter().enumerate() {
        let result = validator.validate_with_context(payload, &context.child_index(i));
        let failed = !result.is_valid();
        collected += result.error_count();
        outcome.results.push(result);

        let limit_reached = config.max_errors.is_some_and(|max| collected >= max);
        if failed && (config.fail_fast || limit_reached) && i + 1 < payloads.len() {
            outcome.stopped_early = true;
            break;
        }
    }

    debug!(
        payloads = payloads.len(),
        validated = outcome.results.len(),
        errors = collected,
        "Batch validation finished"
    );
    outcome
}
