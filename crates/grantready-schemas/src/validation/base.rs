//! Base validation trait and common utilities
//!
//! Copyright (c) 2026 GrantReady Team
//! Licensed under the Apache-2.0 license

use crate::validation::error::{ValidationIssue, ValidationResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Result of a single helper check
pub type IssueResult = Result<(), ValidationIssue>;

const REFERENCE_DATE_KEY: &str = "reference_date";

/// Validation mode for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Schema plus every business rule
    Strict,
    /// Schema plus rules that do not depend on context
    Partial,
    /// JSON Schema only
    Basic,
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Partial => write!(f, "partial"),
            Self::Basic => write!(f, "basic"),
        }
    }
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "partial" => Ok(Self::Partial),
            "basic" => Ok(Self::Basic),
            other => Err(format!("unknown validation mode '{}'", other)),
        }
    }
}

/// Validation context for passing additional information
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationContext {
    /// Current JSON path
    pub path: String,
    /// Validation mode
    pub mode: ValidationMode,
    /// Additional context data
    pub context: HashMap<String, Value>,
}

impl ValidationContext {
    /// Create a new validation context
    pub fn new(mode: ValidationMode) -> Self {
        Self {
            path: "$".to_string(),
            mode,
            context: HashMap::new(),
        }
    }

    /// Create a child context with updated path
    pub fn child<P: AsRef<str>>(&self, path_segment: P) -> Self {
        Self {
            path: format!("{}.{}", self.path, path_segment.as_ref()),
            mode: self.mode,
            context: self.context.clone(),
        }
    }

    /// Create a child context for array index
    pub fn child_index(&self, index: usize) -> Self {
        Self {
            path: format!("{}[{}]", self.path, index),
            mode: self.mode,
            context: self.context.clone(),
        }
    }

    /// Descend along a JSON pointer (`/findings/0/severity`)
    pub fn at_pointer(&self, pointer: &str) -> Self {
        pointer
            .split('/')
            .skip(1)
            .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
            .fold(self.clone(), |ctx, segment| match segment.parse::<usize>() {
                Ok(index) if !segment.starts_with('+') => ctx.child_index(index),
                _ => ctx.child(segment),
            })
    }

    /// Same context with another mode
    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Add context data
    pub fn with_context<K: Into<String>>(mut self, key: K, value: Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }

    /// Get context data
    pub fn get_context(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }

    /// Date that time-relative rules measure against
    pub fn with_reference_date(self, date: NaiveDate) -> Self {
        self.with_context(REFERENCE_DATE_KEY, Value::String(date.to_string()))
    }

    /// The reference date, if one was set
    pub fn reference_date(&self) -> Option<NaiveDate> {
        self.get_context(REFERENCE_DATE_KEY)
            .and_then(Value::as_str)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    }
}

/// Base trait for payload validators
pub trait SchemaValidator {
    /// The type being validated
    type Input: ?Sized;

    /// Mode used by [`SchemaValidator::validate`]
    fn mode(&self) -> ValidationMode {
        ValidationMode::Strict
    }

    /// Root context used by the convenience methods
    fn context(&self) -> ValidationContext {
        ValidationContext::new(self.mode())
    }

    /// Validate with the validator's own mode
    fn validate(&self, input: &Self::Input) -> ValidationResult {
        self.validate_with_context(input, &self.context())
    }

    /// Validate with specific context and mode
    fn validate_with_context(&self, input: &Self::Input, context: &ValidationContext) -> ValidationResult;

    /// Validate in partial mode
    fn validate_partial(&self, input: &Self::Input) -> ValidationResult {
        let context = self.context().with_mode(ValidationMode::Partial);
        self.validate_with_context(input, &context)
    }

    /// Validate basic schema compliance only
    fn validate_basic(&self, input: &Self::Input) -> ValidationResult {
        let context = self.context().with_mode(ValidationMode::Basic);
        self.validate_with_context(input, &context)
    }

    /// Shortcut for `validate(input).is_valid()`
    fn is_valid(&self, input: &Self::Input) -> bool {
        self.validate(input).is_valid()
    }
}

/// Helper functions for common rule checks
pub struct ValidationHelpers;

impl ValidationHelpers {
    /// Validate URL scheme matches expected protocols
    pub fn validate_url_scheme(url: &str, allowed_schemes: &[&str], context: &ValidationContext) -> IssueResult {
        let Some(colon_pos) = url.find(':') else {
            return Err(ValidationIssue::with_violations(
                &context.path,
                format!("Invalid URL format: {}", url),
                vec![ValidationIssue::create_violation(
                    "url_format",
                    "valid URL with scheme",
                    url.to_string(),
                )],
            ));
        };

        let scheme = url[..colon_pos].to_lowercase();
        if allowed_schemes.contains(&scheme.as_str()) {
            Ok(())
        } else {
            Err(ValidationIssue::with_violations(
                &context.path,
                format!("Invalid URL scheme: {}", scheme),
                vec![ValidationIssue::create_violation(
                    "url_scheme",
                    format!("one of: {}", allowed_schemes.join(", ")),
                    scheme,
                )],
            ))
        }
    }

    /// Validate that a field exists when a condition is met
    pub fn validate_conditional_field(
        condition: bool,
        field_value: Option<&Value>,
        field_name: &str,
        context: &ValidationContext,
    ) -> IssueResult {
        let present = field_value.is_some_and(|v| !v.is_null());
        if condition && !present {
            Err(ValidationIssue::with_violations(
                &context.path,
                format!("Field {} is required when condition is met", field_name),
                vec![ValidationIssue::create_violation(
                    "conditional_field",
                    format!("{} to be present", field_name),
                    "field is missing".to_string(),
                )],
            ))
        } else {
            Ok(())
        }
    }

    /// Validate that a string is one of allowed values (case-insensitive)
    pub fn validate_enum_value(
        value: &str,
        allowed_values: &[&str],
        field_name: &str,
        context: &ValidationContext,
    ) -> IssueResult {
        let lowered = value.to_lowercase();
        if allowed_values.contains(&lowered.as_str()) {
            Ok(())
        } else {
            Err(ValidationIssue::with_violations(
                &context.path,
                format!("Invalid value for {}: {}", field_name, value),
                vec![ValidationIssue::create_violation(
                    "enum_value",
                    format!("one of: {}", allowed_values.join(", ")),
                    value.to_string(),
                )],
            ))
        }
    }

    /// Validate that the serialized size of a value stays under a limit
    pub fn validate_serialized_size(
        value: &Value,
        max_bytes: usize,
        field_name: &str,
        context: &ValidationContext,
    ) -> IssueResult {
        let size = serde_json::to_string(value).map(|s| s.len()).unwrap_or(0);
        if size <= max_bytes {
            Ok(())
        } else {
            Err(ValidationIssue::with_violations(
                &context.path,
                format!("{} size exceeds limit", field_name),
                vec![ValidationIssue::create_violation(
                    "max_serialized_size",
                    format!("at most {} bytes", max_bytes),
                    format!("{} bytes", size),
                )],
            ))
        }
    }

    /// Validate that a string has content after trimming
    pub fn validate_non_blank(value: &str, field_name: &str, context: &ValidationContext) -> IssueResult {
        if value.trim().is_empty() {
            Err(ValidationIssue::with_violations(
                &context.path,
                format!("{} must be a non-empty string", field_name),
                vec![ValidationIssue::create_violation(
                    "non_blank",
                    "non-whitespace content",
                    "blank string".to_string(),
                )],
            ))
        } else {
            Ok(())
        }
    }
}
