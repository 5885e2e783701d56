//! Validation issue and result types
//!
//! Copyright (c) 2026 GrantReady Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;

/// A rule violation with expected/actual detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// The validation rule that was violated
    pub rule: String,
    /// What was expected
    pub expected: String,
    /// What was actually found
    pub actual: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rule '{}' violated: expected {}, but found {}",
            self.rule, self.expected, self.actual
        )
    }
}

/// Where an issue was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSource {
    /// A JSON Schema keyword
    Schema,
    /// A business rule layered on top of the schema
    Rule,
}

/// A single violation found in a payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// Path of the violating value (`$.findings[0].severity`)
    pub path: String,
    /// Human-readable error message
    pub message: String,
    /// Schema keyword or rule name that failed
    pub keyword: String,
    /// Schema or rule
    pub source: IssueSource,
    /// JSON pointer into the schema, for schema issues
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<String>,
    /// Detailed rule violations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl ValidationIssue {
    /// Create an issue reported by a schema keyword
    pub fn schema<P, M, K>(path: P, message: M, keyword: K, schema_path: Option<String>) -> Self
    where
        P: Into<String>,
        M: Into<String>,
        K: Into<String>,
    {
        Self {
            path: path.into(),
            message: message.into(),
            keyword: keyword.into(),
            source: IssueSource::Schema,
            schema_path,
            violations: Vec::new(),
        }
    }

    /// Create an issue reported by a business rule
    pub fn rule<P, M, K>(path: P, message: M, rule: K) -> Self
    where
        P: Into<String>,
        M: Into<String>,
        K: Into<String>,
    {
        Self {
            path: path.into(),
            message: message.into(),
            keyword: rule.into(),
            source: IssueSource::Rule,
            schema_path: None,
            violations: Vec::new(),
        }
    }

    /// Create a rule issue with violations
    pub fn with_violations<P, M>(path: P, message: M, violations: Vec<Violation>) -> Self
    where
        P: Into<String>,
        M: Into<String>,
    {
        let rule = violations
            .first()
            .map(|v| v.rule.clone())
            .unwrap_or_else(|| "custom".to_string());

        Self {
            violations,
            ..Self::rule(path, message, rule)
        }
    }

    /// Add a violation to this issue
    pub fn add_violation(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Create a violation for a specific rule
    pub fn create_violation<R, E, A>(rule: R, expected: E, actual: A) -> Violation
    where
        R: Into<String>,
        E: Into<String>,
        A: Into<String>,
    {
        Violation {
            rule: rule.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Outcome of validating one payload.
///
/// `valid` is true exactly when `errors` is empty; the only constructor
/// derives one from the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    valid: bool,
    errors: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Build a result from the collected issues
    pub fn from_issues(errors: Vec<ValidationIssue>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// A result with no issues
    pub fn success() -> Self {
        Self::from_issues(Vec::new())
    }

    /// Whether the payload conforms
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Issues in the order they were found
    pub fn errors(&self) -> &[ValidationIssue] {
        &self.errors
    }

    /// Number of issues
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Issues rendered as `path: message` strings
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Issues reported at exactly `path`
    pub fn errors_at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a ValidationIssue> + 'a {
        self.errors.iter().filter(move |issue| issue.path == path)
    }

    /// Consume the result, returning its issues
    pub fn into_errors(self) -> Vec<ValidationIssue> {
        self.errors
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::success()
    }
}

impl From<Vec<ValidationIssue>> for ValidationResult {
    fn from(errors: Vec<ValidationIssue>) -> Self {
        Self::from_issues(errors)
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            return write!(f, "valid");
        }

        write!(f, "{} validation error(s):", self.errors.len())?;
        for (i, issue) in self.errors.iter().enumerate() {
            write!(f, "\n{}. {}", i + 1, issue)?;
            for violation in &issue.violations {
                write!(f, "\n   - {}", violation)?;
            }
        }
        Ok(())
    }
}
