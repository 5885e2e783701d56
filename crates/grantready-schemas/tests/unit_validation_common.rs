//! Common validation tests against the bundled GrantReady schemas
//!
//! Covers required fields, type checks, nested paths, error collection,
//! idempotence and sharing a validator across threads.

use grantready_schemas::{
    create_validator, JsonSchemaValidator, LoaderError, Schema, SchemaLoader, SchemaValidator,
};
use serde_json::{json, Value};

fn bundled_example(name: &str) -> Value {
    let mut loader = SchemaLoader::bundled().unwrap();
    loader.load_example(name).unwrap().document().clone()
}

#[cfg(test)]
mod amount_scenario {
    use super::*;

    fn validator() -> JsonSchemaValidator {
        let schema = Schema::new(
            "amount",
            json!({
                "type": "object",
                "properties": {"amount": {"type": "number"}},
                "required": ["amount"]
            }),
        )
        .unwrap();
        JsonSchemaValidator::new(&schema).unwrap()
    }

    #[test]
    fn test_string_amount_is_rejected() {
        let result = validator().validate(&json!({"amount": "100"}));

        assert!(!result.is_valid());
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.errors()[0].path, "$.amount");
        assert!(result.messages()[0].starts_with("$.amount: "));
    }

    #[test]
    fn test_numeric_amount_is_accepted() {
        let result = validator().validate(&json!({"amount": 100}));

        assert!(result.is_valid());
        assert!(result.errors().is_empty());
    }
}

#[cfg(test)]
mod bundled_examples {
    use super::*;

    #[test]
    fn test_examples_conform() {
        for (schema, example) in [
            ("grant", "grant-example"),
            ("disbursement", "disbursement-example"),
            ("audit", "audit-example"),
        ] {
            let validator = create_validator(schema).unwrap();
            let result = validator.validate(&bundled_example(example));
            assert!(result.is_valid(), "{} failed: {}", example, result);
        }
    }

    #[test]
    fn test_grant_example_through_loader() {
        let mut loader = SchemaLoader::bundled().unwrap();
        let schema = loader.load_schema("grant.json").unwrap();
        let example = loader.load_example("grant-example.json").unwrap();

        let validator = JsonSchemaValidator::new(&schema).unwrap();
        let result = validator.validate_payload(&example);

        assert!(result.is_valid());
        assert!(result.errors().is_empty());
    }
}

#[cfg(test)]
mod required_field_validation {
    use super::*;

    #[test]
    fn test_missing_required_field() {
        let mut grant = bundled_example("grant-example");
        grant.as_object_mut().unwrap().remove("grantId");

        let result = create_validator("grant").unwrap().validate(&grant);

        assert!(!result.is_valid());
        assert_eq!(result.error_count(), 1);
        let issue = &result.errors()[0];
        assert_eq!(issue.path, "$");
        assert_eq!(issue.keyword, "required");
        assert!(issue.message.contains("grantId"));
    }

    #[test]
    fn test_nested_required_field() {
        let mut audit = bundled_example("audit-example");
        audit["findings"][0].as_object_mut().unwrap().remove("resolved");

        let result = create_validator("audit").unwrap().validate(&audit);

        assert_eq!(result.error_count(), 1);
        assert_eq!(result.errors()[0].path, "$.findings[0]");
        assert!(result.errors()[0].message.contains("resolved"));
    }

    #[test]
    fn test_empty_object_reports_every_missing_field() {
        let result = create_validator("disbursement").unwrap().validate(&json!({}));

        assert!(!result.is_valid());
        assert_eq!(result.error_count(), 8);
        assert!(result.errors().iter().all(|issue| issue.keyword == "required"));
    }
}

#[cfg(test)]
mod constraint_validation {
    use super::*;

    #[test]
    fn test_collects_all_violations() {
        let mut grant = bundled_example("grant-example");
        grant["currency"] = json!("usd");
        grant["fundingAmount"] = json!(0);
        grant["status"] = json!("pending");

        let result = create_validator("grant").unwrap().validate(&grant);

        assert_eq!(result.error_count(), 3);
        assert_eq!(result.errors_at("$.currency").next().unwrap().keyword, "pattern");
        assert_eq!(
            result.errors_at("$.fundingAmount").next().unwrap().keyword,
            "exclusiveMinimum"
        );
        assert_eq!(result.errors_at("$.status").next().unwrap().keyword, "enum");
    }

    #[test]
    fn test_nested_enum_path() {
        let mut audit = bundled_example("audit-example");
        audit["findings"][0]["severity"] = json!("severe");

        let result = create_validator("audit").unwrap().validate(&audit);

        assert_eq!(result.error_count(), 1);
        assert_eq!(result.errors()[0].path, "$.findings[0].severity");
    }

    #[test]
    fn test_format_is_asserted() {
        let mut disbursement = bundled_example("disbursement-example");
        disbursement["disbursementDate"] = json!("15/08/2026");

        let result = create_validator("disbursement").unwrap().validate(&disbursement);

        assert_eq!(result.error_count(), 1);
        assert_eq!(result.errors()[0].keyword, "format");
    }

    #[test]
    fn test_non_object_payload() {
        let result = create_validator("grant").unwrap().validate(&json!([1, 2, 3]));

        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].path, "$");
        assert_eq!(result.errors()[0].keyword, "type");
    }
}

#[cfg(test)]
mod purity {
    use super::*;

    #[test]
    fn test_validation_is_idempotent() {
        let validator = create_validator("disbursement").unwrap();
        let payload = json!({"disbursementId": "", "amount": -5});

        let first = validator.validate(&payload);
        let second = validator.validate(&payload);
        assert_eq!(first, second);
        assert!(!first.is_valid());
    }

    #[test]
    fn test_validator_shared_across_threads() {
        let validator = create_validator("grant").unwrap();
        let valid = bundled_example("grant-example");
        let mut invalid = valid.clone();
        invalid["grantTitle"] = json!("");

        std::thread::scope(|scope| {
            for i in 0..4 {
                let validator = &validator;
                let payload = if i % 2 == 0 { &valid } else { &invalid };
                scope.spawn(move || {
                    let result = validator.validate(payload);
                    assert_eq!(result.is_valid(), i % 2 == 0);
                });
            }
        });
    }

    #[test]
    fn test_cloned_validator_behaves_identically() {
        let validator = create_validator("audit").unwrap();
        let clone = validator.clone();
        let payload = json!({"auditId": "AUD-1"});

        assert_eq!(validator.validate(&payload), clone.validate(&payload));
    }
}

#[cfg(test)]
mod infrastructure_errors {
    use super::*;

    #[test]
    fn test_malformed_schema() {
        let schema = Schema::new("broken", json!({"type": 12})).unwrap();
        let err = JsonSchemaValidator::new(&schema).unwrap_err();
        assert!(matches!(err, LoaderError::SchemaMalformed { .. }));
    }

    #[test]
    fn test_unknown_schema() {
        let err = create_validator("invoice").unwrap_err();
        assert!(err.is_not_found());
    }
}
