//! Validation suite tests over on-disk schema repositories

use grantready_schemas::bundled;
use grantready_schemas::suite::ValidationReport;
use grantready_schemas::{Config, SchemaLoader, ValidationSuite};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

/// A schema repository seeded with the bundled documents
fn seeded_repository() -> TempDir {
    let dir = tempdir().unwrap();
    let examples = dir.path().join("examples");
    fs::create_dir_all(&examples).unwrap();

    for (name, content) in bundled::SCHEMAS {
        fs::write(dir.path().join(name), content).unwrap();
    }
    for (name, content) in bundled::EXAMPLES {
        fs::write(examples.join(name), content).unwrap();
    }
    dir
}

fn run(root: &Path) -> ValidationReport {
    let loader = SchemaLoader::from_dirs(root, root.join("examples"));
    ValidationSuite::new(loader).run().unwrap()
}

#[test]
fn test_clean_repository() {
    let repo = seeded_repository();
    let report = run(repo.path());

    assert!(report.is_success());
    assert_eq!(report.summary.valid_schemas, 3);
    assert_eq!(report.summary.total_examples, 3);
    assert_eq!(report.summary.valid_examples, 3);
    assert!(report.failed_examples().is_empty());
}

#[test]
fn test_invalid_schema_skips_its_examples() {
    let repo = seeded_repository();
    fs::write(repo.path().join("audit.json"), r#"{"type": "objekt"}"#).unwrap();

    let report = run(repo.path());

    assert!(!report.is_success());
    assert_eq!(report.summary.valid_schemas, 2);
    assert_eq!(report.summary.success_rate, 66.7);
    assert!(!report.schemas["audit"].valid);
    assert!(report.schemas["audit"].metadata.is_some());

    let skipped = &report.summary.skipped_examples;
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].example, "audit-example");
    assert!(!report.examples.contains_key("audit-example"));
}

#[test]
fn test_invalid_example_is_reported() {
    let repo = seeded_repository();
    fs::write(
        repo.path().join("examples/second-disbursement.json"),
        r#"{"disbursementId": "DSB-2", "grantId": "GRANT-1", "amount": "100"}"#,
    )
    .unwrap();

    let report = run(repo.path());

    // Example failures do not fail the run
    assert!(report.is_success());
    assert_eq!(report.summary.total_examples, 4);
    assert_eq!(report.summary.valid_examples, 3);
    assert_eq!(report.failed_examples(), vec!["second-disbursement"]);

    let entry = &report.examples["second-disbursement"];
    assert_eq!(entry.schema.as_deref(), Some("disbursement"));
    assert!(entry.errors.iter().any(|issue| issue.path == "$.amount"));
}

#[test]
fn test_unparsable_example() {
    let repo = seeded_repository();
    fs::write(repo.path().join("examples/broken.json"), "{").unwrap();

    let report = run(repo.path());

    let entry = &report.examples["broken"];
    assert!(!entry.valid);
    assert!(entry.schema.is_none());
    assert!(entry.load_error.is_some());
}

fn write_program(root: &Path, properties: &str) {
    let schema = format!(r#"{{"type": "object", "properties": {}}}"#, properties);
    fs::write(root.join("program.json"), schema).unwrap();
}

#[test]
fn test_resolved_cross_references() {
    let repo = seeded_repository();
    write_program(
        repo.path(),
        r#"{
            "grant": {"$ref": "https://grantready.org/schemas/grant/v2.1.0"},
            "payment": {"$ref": "disbursement.json"}
        }"#,
    );
    fs::write(
        repo.path().join("examples/program-example.json"),
        r#"{"payment": {"amount": "100"}}"#,
    )
    .unwrap();

    let report = run(repo.path());

    assert!(report.is_success());
    assert!(report.schemas["program"].valid);
    assert_eq!(report.summary.valid_schemas, 4);
    assert!(report.summary.cross_reference_errors.is_empty());

    // The payment subschema came from disbursement.json
    let entry = &report.examples["program-example"];
    assert_eq!(entry.schema.as_deref(), Some("program"));
    assert!(!entry.valid);
    assert!(entry.errors.iter().all(|issue| issue.path.starts_with("$.payment")));
    assert!(entry.errors.iter().any(|issue| issue.path == "$.payment.amount"));
}

#[test]
fn test_broken_cross_reference() {
    let repo = seeded_repository();
    write_program(
        repo.path(),
        r#"{
            "grant": {"$ref": "https://grantready.org/schemas/grant/v2.1.0"},
            "budget": {"$ref": "https://grantready.org/schemas/budget/v2.1.0"}
        }"#,
    );
    fs::write(repo.path().join("examples/program-example.json"), "{}").unwrap();

    let report = run(repo.path());

    assert!(!report.is_success());
    assert!(report.schemas["program"].valid);
    assert_eq!(report.summary.valid_schemas, 4);

    let errors = &report.summary.cross_reference_errors;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].schema, "program");
    assert_eq!(errors[0].reference, "https://grantready.org/schemas/budget/v2.1.0");

    let skipped = &report.summary.skipped_examples;
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].example, "program-example");
    assert!(skipped[0].reason.contains("unresolved references"));
}

#[test]
fn test_missing_relative_reference() {
    let repo = seeded_repository();
    write_program(repo.path(), r#"{"budget": {"$ref": "budget.json#/$defs/line"}}"#);

    let report = run(repo.path());

    assert!(!report.is_success());
    let errors = &report.summary.cross_reference_errors;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].reference, "budget.json#/$defs/line");
    assert!(errors[0].error.contains("budget"));
}

#[test]
fn test_reference_to_invalid_schema() {
    let repo = seeded_repository();
    fs::write(repo.path().join("audit.json"), r#"{"type": "objekt"}"#).unwrap();
    write_program(repo.path(), r#"{"review": {"$ref": "audit.json"}}"#);

    let report = run(repo.path());

    assert!(!report.schemas["audit"].valid);
    assert!(report.schemas["program"].valid);
    let errors = &report.summary.cross_reference_errors;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].schema, "program");
    assert_eq!(errors[0].reference, "audit.json");
}

#[test]
fn test_compliance_reference_enforced_on_examples() {
    let repo = seeded_repository();
    write_program(
        repo.path(),
        r#"{"basis": {"complianceReference": "2 CFR 200.305"}}"#,
    );
    fs::write(
        repo.path().join("examples/program-example.json"),
        r#"{"basis": ""}"#,
    )
    .unwrap();

    let report = run(repo.path());

    assert!(report.schemas["program"].valid);
    let entry = &report.examples["program-example"];
    assert!(!entry.valid);
    assert_eq!(entry.errors.len(), 1);
    assert_eq!(entry.errors[0].path, "$.basis");
}

#[test]
fn test_malformed_compliance_reference_invalidates_schema() {
    let repo = seeded_repository();
    write_program(repo.path(), r#"{"basis": {"complianceReference": 200}}"#);

    let report = run(repo.path());

    assert!(!report.is_success());
    assert!(!report.schemas["program"].valid);
    assert!(report.schemas["program"].errors[0].contains("complianceReference"));
    assert!(report.summary.cross_reference_errors.is_empty());
}

#[test]
fn test_report_saved_to_configured_path() {
    let repo = seeded_repository();
    let config = Config {
        schemas_dir: repo.path().to_path_buf(),
        examples_dir: repo.path().join("examples"),
        report_path: repo.path().join("out/validation-report.json"),
        ..Config::default()
    };

    let report = ValidationSuite::from_config(&config).run().unwrap();
    report.save(&config.report_path).unwrap();

    let saved = ValidationReport::load(&config.report_path).unwrap();
    assert_eq!(saved.run_id, report.run_id);
    assert_eq!(saved.summary, report.summary);
    assert_eq!(saved.api_version, grantready_schemas::API_VERSION);
}
