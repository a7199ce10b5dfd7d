use std::fs;
use std::path::Path;

use intake_cli::commands::{load_rules, run_annotate, run_validate};
use intake_config::ConfigOrigin;
use intake_model::{RuleType, SourceKind};
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

const RULES: &str = r#"
required_columns = ["Email", "Age"]

[validations.Age]
type = "number"
required = true
min = 0
max = 130

[validations.Email]
type = "text"
required = true
regex = "[^@\\s]+@[^@\\s]+"
"#;

fn write_rules(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("rules.toml");
    fs::write(&path, RULES).unwrap();
    path
}

fn write_workbook(path: &Path) {
    let mut book = Workbook::new();
    let sheet = book.add_worksheet();
    sheet.write_string(0, 0, "Email").unwrap();
    sheet.write_string(0, 1, "Age").unwrap();
    sheet.write_string(1, 0, "ann@example.com").unwrap();
    sheet.write_number(1, 1, 31.0).unwrap();
    sheet.write_string(2, 0, "not-an-email").unwrap();
    sheet.write_string(2, 1, "").unwrap();
    book.save(path).unwrap();
}

#[test]
fn rules_load_from_explicit_path() {
    let dir = TempDir::new().unwrap();
    let path = write_rules(dir.path());

    let loaded = load_rules(Some(&path)).unwrap();
    assert_eq!(loaded.location.origin, ConfigOrigin::Flag);
    assert_eq!(loaded.config.rules.required_columns, vec!["Email", "Age"]);
    assert_eq!(
        loaded.config.rules.validations["Age"].rule_type,
        Some(RuleType::Number)
    );
}

#[test]
fn missing_explicit_rules_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let error = load_rules(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(error.to_string().starts_with("load rules from"));
}

#[test]
fn validate_json_reports_violations() {
    let dir = TempDir::new().unwrap();
    let rules = write_rules(dir.path());
    let data = dir.path().join("people.json");
    fs::write(
        &data,
        r#"[{"Email": "ann@example.com", "Age": 31}, {"Email": "bob", "Age": -1}]"#,
    )
    .unwrap();

    let outcome = run_validate(&data, Some(&rules)).unwrap();
    assert_eq!(outcome.report.file_type, SourceKind::Json);
    assert_eq!(
        outcome.report.errors,
        vec![
            "Row 2: Email format is invalid",
            "Row 2: Age must be >= 0.0",
        ]
    );
}

#[test]
fn annotate_writes_highlighted_copy_next_to_input() {
    let dir = TempDir::new().unwrap();
    let rules = write_rules(dir.path());
    let input = dir.path().join("staff.xlsx");
    write_workbook(&input);

    let outcome = run_annotate(&input, Some(&rules), None).unwrap();
    assert_eq!(outcome.output, dir.path().join("staff_highlighted.xlsx"));
    assert_eq!(outcome.error_count, 2);
    let bytes = fs::read(&outcome.output).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn annotate_honours_explicit_output() {
    let dir = TempDir::new().unwrap();
    let rules = write_rules(dir.path());
    let input = dir.path().join("staff.xlsx");
    write_workbook(&input);
    let output = dir.path().join("out").join("marked.xlsx");
    fs::create_dir_all(output.parent().unwrap()).unwrap();

    let outcome = run_annotate(&input, Some(&rules), Some(&output)).unwrap();
    assert_eq!(outcome.output, output);
    assert!(output.exists());
}
