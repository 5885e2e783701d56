//! GrantReady-specific JSON Schema keywords
//!
//! `complianceReference` tags a property with the regulation it implements
//! (`"complianceReference": "2 CFR 200.305"`). The keyword value must be a
//! string, and an instance governed by it must be a non-empty string.
//!
//! Copyright (c) 2026 GrantReady Team
//! Licensed under the Apache-2.0 license

use jsonschema::paths::{LazyLocation, Location};
use jsonschema::{Keyword, ValidationError};
use serde_json::{Map, Value};

/// Name of the compliance citation keyword
pub const COMPLIANCE_REFERENCE: &str = "complianceReference";

struct ComplianceReference {
    citation: String,
    location: Location,
}

impl Keyword for ComplianceReference {
    fn validate<'i>(&self, instance: &'i Value, location: &LazyLocation) -> Result<(), ValidationError<'i>> {
        if self.is_valid(instance) {
            return Ok(());
        }
        Err(ValidationError::custom(
            self.location.clone(),
            location.into(),
            instance,
            format!("{} is not a non-empty string (required by {})", instance, self.citation),
        ))
    }

    fn is_valid(&self, instance: &Value) -> bool {
        matches!(instance, Value::String(s) if !s.is_empty())
    }
}

/// Factory registered with `jsonschema::options().with_keyword`
pub(crate) fn compliance_reference<'a>(
    _parent: &'a Map<String, Value>,
    value: &'a Value,
    location: Location,
) -> Result<Box<dyn Keyword>, ValidationError<'a>> {
    match value {
        Value::String(citation) => Ok(Box::new(ComplianceReference {
            citation: citation.clone(),
            location,
        })),
        other => Err(ValidationError::custom(
            location,
            Location::new(),
            other,
            format!("{} must be a string citation", COMPLIANCE_REFERENCE),
        )),
    }
}
