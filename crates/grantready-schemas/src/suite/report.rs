//! Validation report produced by [`super::ValidationSuite`]
//!
//! Copyright (c) 2026 GrantReady Team
//! Licensed under the Apache-2.0 license

use crate::error::Result;
use crate::schema::{CrossReferenceError, SchemaMetadata};
use crate::validation::ValidationIssue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Outcome for one schema document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaReport {
    pub valid: bool,
    pub errors: Vec<String>,
    /// Present whenever the document parsed, even if it is not a valid schema
    pub metadata: Option<SchemaMetadata>,
}

impl SchemaReport {
    pub fn valid(metadata: SchemaMetadata) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            metadata: Some(metadata),
        }
    }

    pub fn invalid(metadata: Option<SchemaMetadata>, error: impl Into<String>) -> Self {
        Self {
            valid: false,
            errors: vec![error.into()],
            metadata,
        }
    }
}

/// Outcome for one example payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleReport {
    pub valid: bool,
    /// Schema the example was validated against
    pub schema: Option<String>,
    pub errors: Vec<ValidationIssue>,
    /// Why the example could not be loaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
}

/// An example that was not validated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedExample {
    pub example: String,
    pub reason: String,
}

/// Totals across a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_schemas: usize,
    pub valid_schemas: usize,
    pub total_examples: usize,
    pub valid_examples: usize,
    pub skipped_examples: Vec<SkippedExample>,
    /// Percentage of valid schemas, one decimal place
    pub success_rate: f64,
    pub cross_reference_errors: Vec<CrossReferenceError>,
}

impl ReportSummary {
    /// Recompute `success_rate` from the schema totals
    pub fn update_success_rate(&mut self) {
        self.success_rate = if self.total_schemas == 0 {
            0.0
        } else {
            let rate = self.valid_schemas as f64 / self.total_schemas as f64 * 100.0;
            (rate * 10.0).round() / 10.0
        };
    }
}

/// Full report of a validation suite run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub timestamp: DateTime<Utc>,
    pub run_id: String,
    pub api_version: String,
    pub schemas: BTreeMap<String, SchemaReport>,
    pub examples: BTreeMap<String, ExampleReport>,
    pub summary: ReportSummary,
}

impl ValidationReport {
    /// An empty report stamped with the current time
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            run_id: run_id.into(),
            api_version: crate::API_VERSION.to_string(),
            schemas: BTreeMap::new(),
            examples: BTreeMap::new(),
            summary: ReportSummary::default(),
        }
    }

    /// True when every schema is valid and no cross-reference is broken
    pub fn is_success(&self) -> bool {
        self.summary.valid_schemas == self.summary.total_schemas
            && self.summary.cross_reference_errors.is_empty()
    }

    /// Names of examples that failed validation
    pub fn failed_examples(&self) -> Vec<&str> {
        self.examples
            .iter()
            .filter(|(_, report)| !report.valid)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Write the report as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Read a report previously written with [`ValidationReport::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
