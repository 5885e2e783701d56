//! Business rules layered on top of JSON Schema validation
//!
//! Rules cover constraints a schema cannot express well: aggregate limits,
//! cross-field conditions and dates relative to a reference day. They run
//! in `Partial` and `Strict` modes only; rules marked `strict_only` are
//! skipped in `Partial`.
//!
//! Copyright (c) 2026 GrantReady Team
//! Licensed under the Apache-2.0 license

use crate::validation::base::{ValidationContext, ValidationHelpers, ValidationMode};
use crate::validation::error::ValidationIssue;
use chrono::{DateTime, Duration, NaiveDate};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

const MIB: u64 = 1024 * 1024;

/// MIME types accepted for grant attachments
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "image/jpeg",
    "image/png",
    "image/gif",
    "text/plain",
    "text/csv",
];

/// A check applied to a payload after schema validation
pub trait Rule: Send + Sync {
    /// Stable rule name, used as the issue keyword
    fn name(&self) -> &'static str;

    /// Whether the rule only runs in `Strict` mode
    fn strict_only(&self) -> bool {
        false
    }

    /// Check a payload, returning every issue found
    fn check(&self, payload: &Value, ctx: &ValidationContext) -> Vec<ValidationIssue>;
}

/// Ordered collection of rules, cheap to clone
#[derive(Clone, Default)]
pub struct RuleSet {
    rules: Vec<Arc<dyn Rule>>,
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl RuleSet {
    /// Create an empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule
    pub fn with<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// The built-in rules for a GrantReady schema, by stem
    pub fn for_schema(stem: &str) -> Self {
        match stem {
            "grant" => Self::grant(),
            "disbursement" => Self::disbursement(),
            "audit" => Self::audit(),
            _ => Self::new(),
        }
    }

    /// Rules for grant documents
    pub fn grant() -> Self {
        Self::new()
            .with(EligibilityCriteriaRule)
            .with(MetadataSizeRule::new("metadata", 10_000))
            .with(AttachmentLimitsRule::default())
            .with(DeadlineWindowRule::new("deadline", 365))
    }

    /// Rules for disbursement documents
    pub fn disbursement() -> Self {
        Self::new()
            .with(ConditionalFieldRule::new("status", "processed", "transactionId"))
            .with(ConditionalFieldRule::new("status", "failed", "notes"))
    }

    /// Rules for audit documents
    pub fn audit() -> Self {
        Self::new().with(AuditOutcomeRule)
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule names in order
    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Run every rule applicable to the context's mode
    pub fn check(&self, payload: &Value, ctx: &ValidationContext) -> Vec<ValidationIssue> {
        self.rules
            .iter()
            .filter(|rule| match ctx.mode {
                ValidationMode::Basic => false,
                ValidationMode::Partial => !rule.strict_only(),
                ValidationMode::Strict => true,
            })
            .flat_map(|rule| rule.check(payload, ctx))
            .collect()
    }
}

/// Eligibility criteria must contain text, not just whitespace
#[derive(Debug, Clone, Copy)]
pub struct EligibilityCriteriaRule;

impl Rule for EligibilityCriteriaRule {
    fn name(&self) -> &'static str {
        "eligibility_criteria"
    }

    fn check(&self, payload: &Value, ctx: &ValidationContext) -> Vec<ValidationIssue> {
        let Some(criteria) = payload.get("eligibilityCriteria").and_then(Value::as_array) else {
            return Vec::new();
        };

        let field_ctx = ctx.child("eligibilityCriteria");
        criteria
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let text = item.as_str()?;
                ValidationHelpers::validate_non_blank(
                    text,
                    &format!("Eligibility criteria at index {}", index),
                    &field_ctx.child_index(index),
                )
                .err()
            })
            .collect()
    }
}

/// Serialized size cap for a free-form object field
#[derive(Debug, Clone)]
pub struct MetadataSizeRule {
    field: &'static str,
    max_bytes: usize,
}

impl MetadataSizeRule {
    pub fn new(field: &'static str, max_bytes: usize) -> Self {
        Self { field, max_bytes }
    }
}

impl Rule for MetadataSizeRule {
    fn name(&self) -> &'static str {
        "metadata_size"
    }

    fn check(&self, payload: &Value, ctx: &ValidationContext) -> Vec<ValidationIssue> {
        payload
            .get(self.field)
            .and_then(|value| {
                ValidationHelpers::validate_serialized_size(
                    value,
                    self.max_bytes,
                    "Metadata",
                    &ctx.child(self.field),
                )
                .err()
            })
            .into_iter()
            .collect()
    }
}

/// Count, size, MIME type and URL limits for attachments
#[derive(Debug, Clone)]
pub struct AttachmentLimitsRule {
    pub max_count: usize,
    pub max_size_bytes: u64,
    pub max_total_bytes: u64,
}

impl Default for AttachmentLimitsRule {
    fn default() -> Self {
        Self {
            max_count: 10,
            max_size_bytes: 10 * MIB,
            max_total_bytes: 50 * MIB,
        }
    }
}

impl Rule for AttachmentLimitsRule {
    fn name(&self) -> &'static str {
        "attachment_limits"
    }

    fn check(&self, payload: &Value, ctx: &ValidationContext) -> Vec<ValidationIssue> {
        let Some(attachments) = payload.get("attachments").and_then(Value::as_array) else {
            return Vec::new();
        };

        let list_ctx = ctx.child("attachments");
        let mut issues = Vec::new();

        if attachments.len() > self.max_count {
            issues.push(ValidationIssue::with_violations(
                &list_ctx.path,
                format!("Cannot have more than {} attachments", self.max_count),
                vec![ValidationIssue::create_violation(
                    "max_attachments",
                    format!("at most {} attachments", self.max_count),
                    format!("{} attachments", attachments.len()),
                )],
            ));
        }

        let mut total: u64 = 0;
        for (index, attachment) in attachments.iter().enumerate() {
            let item_ctx = list_ctx.child_index(index);

            if let Some(mime) = attachment.get("type").and_then(Value::as_str) {
                if let Err(mut issue) =
                    ValidationHelpers::validate_enum_value(mime, ALLOWED_MIME_TYPES, "type", &item_ctx.child("type"))
                {
                    issue.message = format!("Attachment at index {} has invalid MIME type", index);
                    issues.push(issue);
                }
            }

            if let Some(url) = attachment.get("url").and_then(Value::as_str) {
                if let Err(mut issue) =
                    ValidationHelpers::validate_url_scheme(url, &["http", "https"], &item_ctx.child("url"))
                {
                    issue.message = format!("Attachment at index {} has invalid URL", index);
                    issues.push(issue);
                }
            }

            if let Some(size) = attachment.get("size").and_then(Value::as_u64) {
                if size > self.max_size_bytes {
                    issues.push(ValidationIssue::with_violations(
                        item_ctx.child("size").path,
                        format!(
                            "Attachment at index {} exceeds {}MB size limit",
                            index,
                            self.max_size_bytes / MIB
                        ),
                        vec![ValidationIssue::create_violation(
                            "max_attachment_size",
                            format!("at most {} bytes", self.max_size_bytes),
                            format!("{} bytes", size),
                        )],
                    ));
                }
                total = total.saturating_add(size);
            }
        }

        if total > self.max_total_bytes {
            issues.push(ValidationIssue::with_violations(
                &list_ctx.path,
                format!("Total attachment size exceeds {}MB limit", self.max_total_bytes / MIB),
                vec![ValidationIssue::create_violation(
                    "max_total_attachment_size",
                    format!("at most {} bytes", self.max_total_bytes),
                    format!("{} bytes", total),
                )],
            ));
        }

        issues
    }
}

/// A date field must fall after the reference date and within a window.
///
/// Skipped when the context carries no reference date, so plain
/// validation never depends on the wall clock.
#[derive(Debug, Clone)]
pub struct DeadlineWindowRule {
    field: &'static str,
    max_days: i64,
}

impl DeadlineWindowRule {
    pub fn new(field: &'static str, max_days: i64) -> Self {
        Self { field, max_days }
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

impl Rule for DeadlineWindowRule {
    fn name(&self) -> &'static str {
        "deadline_window"
    }

    fn strict_only(&self) -> bool {
        true
    }

    fn check(&self, payload: &Value, ctx: &ValidationContext) -> Vec<ValidationIssue> {
        let Some(reference) = ctx.reference_date() else {
            return Vec::new();
        };
        // Unparsable dates are left to the schema's `format` check
        let Some(deadline) = payload.get(self.field).and_then(Value::as_str).and_then(parse_date) else {
            return Vec::new();
        };

        let path = ctx.child(self.field).path;
        // No upper bound when the window runs past the last representable date
        let latest = Duration::try_days(self.max_days).and_then(|window| reference.checked_add_signed(window));

        if deadline <= reference {
            vec![ValidationIssue::with_violations(
                path,
                "Deadline must be in the future",
                vec![ValidationIssue::create_violation(
                    self.name(),
                    format!("a date after {}", reference),
                    deadline.to_string(),
                )],
            )]
        } else if let Some(latest) = latest.filter(|latest| deadline > *latest) {
            vec![ValidationIssue::with_violations(
                path,
                "Deadline cannot be more than one year in the future",
                vec![ValidationIssue::create_violation(
                    self.name(),
                    format!("a date on or before {}", latest),
                    deadline.to_string(),
                )],
            )]
        } else {
            Vec::new()
        }
    }
}

/// `required` must be present when `field == value`
#[derive(Debug, Clone)]
pub struct ConditionalFieldRule {
    field: &'static str,
    value: &'static str,
    required: &'static str,
}

impl ConditionalFieldRule {
    pub fn new(field: &'static str, value: &'static str, required: &'static str) -> Self {
        Self { field, value, required }
    }
}

impl Rule for ConditionalFieldRule {
    fn name(&self) -> &'static str {
        "conditional_field"
    }

    fn check(&self, payload: &Value, ctx: &ValidationContext) -> Vec<ValidationIssue> {
        let condition = payload.get(self.field).and_then(Value::as_str) == Some(self.value);

        ValidationHelpers::validate_conditional_field(
            condition,
            payload.get(self.required),
            self.required,
            &ctx.child(self.required),
        )
        .map_err(|mut issue| {
            issue.message = format!("{} is required when {} is {}", self.required, self.field, self.value);
            issue
        })
        .err()
        .into_iter()
        .collect()
    }
}

/// An audit cannot pass outright while serious findings are unresolved
#[derive(Debug, Clone, Copy)]
pub struct AuditOutcomeRule;

impl Rule for AuditOutcomeRule {
    fn name(&self) -> &'static str {
        "audit_outcome"
    }

    fn check(&self, payload: &Value, ctx: &ValidationContext) -> Vec<ValidationIssue> {
        if payload.get("overallStatus").and_then(Value::as_str) != Some("passed") {
            return Vec::new();
        }

        let unresolved: Vec<String> = payload
            .get("findings")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter(|finding| {
                let severe = matches!(
                    finding.get("severity").and_then(Value::as_str),
                    Some("high") | Some("critical")
                );
                let resolved = finding.get("resolved").and_then(Value::as_bool).unwrap_or(false);
                severe && !resolved
            })
            .map(|finding| {
                finding
                    .get("code")
                    .and_then(Value::as_str)
                    .unwrap_or("<unknown>")
                    .to_string()
            })
            .collect();

        if unresolved.is_empty() {
            return Vec::new();
        }

        vec![ValidationIssue::with_violations(
            ctx.child("overallStatus").path,
            format!(
                "overallStatus cannot be passed with unresolved high or critical findings: {}",
                unresolved.join(", ")
            ),
            vec![ValidationIssue::create_violation(
                self.name(),
                "passed_with_findings or failed",
                "passed",
            )],
        )]
    }
}
