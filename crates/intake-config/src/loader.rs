//! Rule file deserialization.

use std::collections::BTreeMap;
use std::path::Path;

use intake_model::{
    AnnotationOptions, ColumnValidationRule, RuleType, StoreOptions, ValidationConfig,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, Result};
use crate::paths::{ConfigFormat, ConfigLocation, ConfigOrigin};

/// Everything the intake pipeline reads from its rule file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntakeConfig {
    pub rules: ValidationConfig,
    pub annotation: AnnotationOptions,
    pub store: StoreOptions,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    required_columns: Vec<String>,
    #[serde(default)]
    validations: BTreeMap<String, RawRule>,
    #[serde(default)]
    annotation: AnnotationOptions,
    #[serde(default)]
    store: StoreOptions,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRule {
    #[serde(rename = "type", default)]
    rule_type: Option<String>,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
    #[serde(default)]
    regex: Option<String>,
}

impl RawRule {
    fn into_rule(self, column: &str) -> ColumnValidationRule {
        let rule_type = self.rule_type.as_deref().and_then(|raw| {
            raw.parse::<RuleType>()
                .inspect_err(|_| {
                    warn!(column = %column, rule_type = %raw, "unknown rule type, column will only be checked for presence");
                })
                .ok()
        });
        ColumnValidationRule {
            rule_type,
            format: self.format,
            required: self.required,
            min: self.min,
            max: self.max,
            regex: self.regex,
        }
    }
}

/// Parse rule file text in the given format.
///
/// `origin` is only used to label errors.
pub fn parse_config(text: &str, format: ConfigFormat, origin: &Path) -> Result<IntakeConfig> {
    let raw: RawConfig = match format {
        ConfigFormat::Toml => toml::from_str(text).map_err(|source| ConfigError::Toml {
            path: origin.to_path_buf(),
            source,
        })?,
        ConfigFormat::Json => serde_json::from_str(text).map_err(|source| ConfigError::Json {
            path: origin.to_path_buf(),
            source,
        })?,
    };

    let mut validations = BTreeMap::new();
    for (column, raw_rule) in raw.validations {
        if column.trim().is_empty() {
            return Err(ConfigError::InvalidRule {
                column,
                message: "column key must not be blank".to_string(),
            });
        }
        let rule = raw_rule.into_rule(&column);
        if let (Some(min), Some(max)) = (rule.min, rule.max)
            && min > max
        {
            warn!(column = %column, min, max, "min is greater than max, both bounds can fire");
        }
        validations.insert(column, rule);
    }

    if raw.store.ttl_secs == 0 || raw.store.sweep_interval_secs == 0 {
        return Err(ConfigError::InvalidRule {
            column: "[store]".to_string(),
            message: "ttl_secs and sweep_interval_secs must be positive".to_string(),
        });
    }

    Ok(IntakeConfig {
        rules: ValidationConfig {
            validations,
            required_columns: raw.required_columns,
        },
        annotation: raw.annotation,
        store: raw.store,
    })
}

/// Load the rule file at `location`.
///
/// A missing file is only tolerated for the default location, where it
/// yields an empty configuration.
pub fn load_config(location: &ConfigLocation) -> Result<IntakeConfig> {
    if location.origin == ConfigOrigin::Default && !location.path.exists() {
        info!(
            path = %location.path.display(),
            "no rule file found, running without column rules"
        );
        return Ok(IntakeConfig::default());
    }
    let text = std::fs::read_to_string(&location.path)
        .map_err(|error| ConfigError::io(&location.path, error))?;
    let config = parse_config(&text, location.format(), &location.path)?;
    debug!(
        path = %location.path.display(),
        rules = config.rules.validations.len(),
        required_columns = config.rules.required_columns.len(),
        "loaded rule file"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_model::Rgb;

    fn parse_toml(text: &str) -> Result<IntakeConfig> {
        parse_config(text, ConfigFormat::Toml, Path::new("test.toml"))
    }

    #[test]
    fn parses_rules_and_defaults() {
        let config = parse_toml(
            r#"
required_columns = ["Email"]

[validations.Age]
type = "NUMBER"
required = true
min = 0
max = 130
"#,
        )
        .unwrap();
        let age = &config.rules.validations["Age"];
        assert_eq!(age.rule_type, Some(RuleType::Number));
        assert!(age.required);
        assert_eq!(age.min, Some(0.0));
        assert_eq!(age.max, Some(130.0));
        assert_eq!(config.rules.required_columns, vec!["Email"]);
        assert_eq!(config.annotation, AnnotationOptions::default());
        assert_eq!(config.store, StoreOptions::default());
    }

    #[test]
    fn unknown_type_loads_as_untyped() {
        let config = parse_toml(
            r#"
[validations.Code]
type = "decimal"
required = true
"#,
        )
        .unwrap();
        let code = &config.rules.validations["Code"];
        assert_eq!(code.rule_type, None);
        assert!(code.required);
    }

    #[test]
    fn annotation_table_overrides_defaults() {
        let config = parse_toml(
            r##"
[annotation]
fill_color = "#FFFF00"
author = "Intake"
include_cell_value = false
"##,
        )
        .unwrap();
        assert_eq!(config.annotation.fill_color, Rgb::from_rgb(0xFF, 0xFF, 0x00));
        assert_eq!(config.annotation.author, "Intake");
        assert!(!config.annotation.include_cell_value);
        assert_eq!(config.annotation.label, "Validation Error:");
        assert_eq!(config.annotation.note_columns, 3);
    }

    #[test]
    fn rejects_bad_color_and_zero_ttl() {
        assert!(matches!(
            parse_toml("[annotation]\nfill_color = \"red\"\n"),
            Err(ConfigError::Toml { .. })
        ));
        assert!(matches!(
            parse_toml("[store]\nttl_secs = 0\n"),
            Err(ConfigError::InvalidRule { .. })
        ));
    }

    #[test]
    fn parses_json_shape() {
        let config = parse_config(
            r#"{"validations": {"Rate": {"type": "percent", "min": 0, "max": 100}}, "required_columns": ["Rate"]}"#,
            ConfigFormat::Json,
            Path::new("rules.json"),
        )
        .unwrap();
        assert_eq!(
            config.rules.validations["Rate"].rule_type,
            Some(RuleType::Percent)
        );
    }
}
