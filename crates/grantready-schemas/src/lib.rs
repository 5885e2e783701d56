//! GrantReady Schemas - schema loading and payload validation
//!
//! This crate loads the GrantReady JSON Schemas (`grant`, `disbursement`,
//! `audit`) and their example payloads, and validates payloads against them.
//!
//! ## Features
//!
//! - **Schema Validation**: JSON Schema drafts 4 to 2020-12, detected from `$schema`
//! - **Business Rules**: Domain checks layered on top of the schemas
//! - **Multiple Validation Modes**: Basic, Partial, and Strict validation
//! - **Batch Processing**: Validation of many payloads with one validator
//! - **Suite Reports**: Whole-repository checks with cross-reference analysis
//!
//! ## Quick Start
//!
//! ```rust
//! use grantready_schemas::{SchemaLoader, SchemaValidator, JsonSchemaValidator};
//!
//! let mut loader = SchemaLoader::bundled()?;
//! let schema = loader.load_schema("grant.json")?;
//! let example = loader.load_example("grant-example.json")?;
//!
//! let validator = JsonSchemaValidator::new(&schema)?;
//! let result = validator.validate(example.document());
//!
//! assert!(result.is_valid());
//! assert!(result.errors().is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! A payload that does not conform is not an error:
//!
//! ```rust
//! use grantready_schemas::{SchemaValidator, create_validator};
//! use serde_json::json;
//!
//! let validator = create_validator("disbursement")?;
//! let result = validator.validate(&json!({"disbursementId": "DISB-1", "amount": "100"}));
//!
//! assert!(!result.is_valid());
//! assert!(result.errors_at("$.amount").count() > 0);
//! # Ok::<(), grantready_schemas::LoaderError>(())
//! ```
//!
//! ## Validation Modes
//!
//! - **Basic**: JSON Schema validation only
//! - **Partial**: Schema + rules that need no outside context
//! - **Strict**: Schema + all rules, including date windows
//!
//! Copyright (c) 2026 GrantReady Team
//! Licensed under the Apache-2.0 license

pub mod bundled;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod schema;
pub mod suite;
pub mod validation;

/// Version of the GrantReady API these schemas describe
pub const API_VERSION: &str = "2.1.0";

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::{Error, Result};
pub use loader::{DocumentKind, LoaderError, LoaderResult, SchemaLoader};
pub use schema::{Payload, Schema, SchemaMetadata};
pub use suite::{ValidationReport, ValidationSuite};
pub use validation::{
    validate_batch, BatchOutcome, JsonSchemaValidator, RuleSet, SchemaValidator, ValidationConfig,
    ValidationContext, ValidationIssue, ValidationMode, ValidationResult, ValidatorOptions,
};

/// Validator for one of the bundled GrantReady schemas, without business rules
pub fn create_validator(schema: &str) -> LoaderResult<JsonSchemaValidator> {
    SchemaLoader::bundled()?.validator_for(schema)
}
