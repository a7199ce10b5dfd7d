//! Column validation rules as configured by the operator.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// The value shape a column is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    /// Plain decimal, thousands separators allowed, no `%` sign.
    Number,
    /// Decimal followed by a trailing `%`.
    Percent,
    /// Plain decimal with optional thousands separators.
    Currency,
    /// Date matching the rule's `format` pattern.
    Date,
    /// Free text, optionally constrained by a regex.
    Text,
}

impl RuleType {
    pub const ALL: [RuleType; 5] = [
        RuleType::Number,
        RuleType::Percent,
        RuleType::Currency,
        RuleType::Date,
        RuleType::Text,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuleType::Number => "number",
            RuleType::Percent => "percent",
            RuleType::Currency => "currency",
            RuleType::Date => "date",
            RuleType::Text => "text",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleType {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        RuleType::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ModelError::UnknownRuleType(trimmed.to_string()))
    }
}

/// Declarative constraint for a single column.
///
/// A rule without a type only enforces `required`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnValidationRule {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<RuleType>,
    /// Date pattern (`dd/MM/yyyy` style tokens), only meaningful for dates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

impl ColumnValidationRule {
    pub fn new(rule_type: RuleType) -> Self {
        Self {
            rule_type: Some(rule_type),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    #[must_use]
    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    #[must_use]
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    #[must_use]
    pub fn with_regex(mut self, regex: impl Into<String>) -> Self {
        self.regex = Some(regex.into());
        self
    }
}

/// The full rule configuration: per-column rules plus required column names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub validations: BTreeMap<String, ColumnValidationRule>,
    #[serde(default)]
    pub required_columns: Vec<String>,
}

impl ValidationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rule(mut self, column: impl Into<String>, rule: ColumnValidationRule) -> Self {
        self.validations.insert(column.into(), rule);
        self
    }

    #[must_use]
    pub fn with_required_column(mut self, column: impl Into<String>) -> Self {
        self.required_columns.push(column.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_type_parses_case_insensitively() {
        assert_eq!("NUMBER".parse::<RuleType>().unwrap(), RuleType::Number);
        assert_eq!(" Percent ".parse::<RuleType>().unwrap(), RuleType::Percent);
        assert!("decimal".parse::<RuleType>().is_err());
    }

    #[test]
    fn builder_sets_fields() {
        let rule = ColumnValidationRule::new(RuleType::Number)
            .required()
            .with_min(0.0)
            .with_max(10.0);
        assert!(rule.required);
        assert_eq!(rule.min, Some(0.0));
        assert_eq!(rule.max, Some(10.0));
        assert_eq!(rule.format, None);
    }
}
