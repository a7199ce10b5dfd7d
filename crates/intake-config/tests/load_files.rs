use std::fs;
use std::path::Path;

use intake_config::{
    ConfigError, ConfigFormat, ConfigLocation, ConfigOrigin, load_config, parse_config,
};
use intake_model::RuleType;
use tempfile::tempdir;

#[test]
fn loads_toml_rule_file_from_disk() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("intake.toml");
    fs::write(
        &path,
        r#"
required_columns = ["Email", "Age"]

[validations.Joining_Date]
type = "date"
format = "dd/MM/yyyy"

[validations.Email]
type = "text"
regex = "[^@]+@[^@]+"

[store]
ttl_secs = 60
sweep_interval_secs = 5
"#,
    )
    .expect("write rules");

    let config = load_config(&ConfigLocation {
        path,
        origin: ConfigOrigin::Flag,
    })
    .expect("load rules");

    let date = &config.rules.validations["Joining_Date"];
    assert_eq!(date.rule_type, Some(RuleType::Date));
    assert_eq!(date.format.as_deref(), Some("dd/MM/yyyy"));
    assert_eq!(config.store.ttl_secs, 60);
    assert_eq!(config.rules.required_columns.len(), 2);
}

#[test]
fn loads_json_rule_file_by_extension() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("rules.json");
    fs::write(
        &path,
        r#"{"validations": {"Amount": {"type": "currency", "min": 0}}}"#,
    )
    .expect("write rules");

    let config = load_config(&ConfigLocation {
        path,
        origin: ConfigOrigin::Environment,
    })
    .expect("load rules");
    assert_eq!(
        config.rules.validations["Amount"].rule_type,
        Some(RuleType::Currency)
    );
}

#[test]
fn missing_default_file_yields_empty_config() {
    let dir = tempdir().expect("temp dir");
    let config = load_config(&ConfigLocation {
        path: dir.path().join("intake.toml"),
        origin: ConfigOrigin::Default,
    })
    .expect("default config");
    assert!(config.rules.validations.is_empty());
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempdir().expect("temp dir");
    let result = load_config(&ConfigLocation {
        path: dir.path().join("absent.toml"),
        origin: ConfigOrigin::Flag,
    });
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn unknown_keys_are_rejected() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("intake.toml");
    fs::write(&path, "[validations.Age]\nkind = \"number\"\n").expect("write rules");
    let result = load_config(&ConfigLocation {
        path,
        origin: ConfigOrigin::Flag,
    });
    assert!(matches!(result, Err(ConfigError::Toml { .. })));
}

#[test]
fn bundled_sample_rule_file_parses() {
    let text = include_str!("../../../intake.toml");
    let config = parse_config(text, ConfigFormat::Toml, Path::new("intake.toml")).unwrap();
    assert_eq!(config.rules.validations.len(), 6);
    assert_eq!(config.rules.required_columns, vec!["Email", "Age"]);
    assert_eq!(
        config.rules.validations["Commission_Rate"].rule_type,
        Some(RuleType::Percent)
    );
    assert_eq!(config.store.sweep_interval_secs, 1800);
}
