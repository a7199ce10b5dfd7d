//! Compiled rule set and header-to-rule resolution.

use std::collections::HashMap;
use std::sync::Arc;

use intake_model::{ColumnValidationRule, RuleType, ValidationConfig};
use regex::Regex;
use tracing::{debug, warn};

use crate::date_pattern::DatePattern;
use crate::error::{Result, RuleError};
use crate::normalize::normalize_header;

/// Type-specific state compiled from a rule.
#[derive(Debug, Clone)]
pub(crate) enum Check {
    Presence,
    Number,
    Percent,
    Currency,
    Date(Option<DatePattern>),
    Text(Option<Regex>),
}

/// A configured rule with its regex and date pattern compiled.
#[derive(Debug, Clone)]
pub struct ColumnRule {
    key: String,
    rule: ColumnValidationRule,
    pub(crate) check: Check,
}

impl ColumnRule {
    pub fn compile(key: &str, rule: &ColumnValidationRule) -> Result<Self> {
        let check = match rule.rule_type {
            None => Check::Presence,
            Some(RuleType::Number) => Check::Number,
            Some(RuleType::Percent) => Check::Percent,
            Some(RuleType::Currency) => Check::Currency,
            Some(RuleType::Date) => {
                let pattern = rule
                    .format
                    .as_deref()
                    .filter(|format| !format.trim().is_empty())
                    .map(|format| {
                        DatePattern::compile(format).map_err(|source| RuleError::DatePattern {
                            column: key.to_string(),
                            pattern: format.to_string(),
                            source,
                        })
                    })
                    .transpose()?;
                Check::Date(pattern)
            }
            Some(RuleType::Text) => {
                let regex = rule
                    .regex
                    .as_deref()
                    .filter(|pattern| !pattern.is_empty())
                    .map(|pattern| {
                        Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
                            RuleError::InvalidRegex {
                                column: key.to_string(),
                                source,
                            }
                        })
                    })
                    .transpose()?;
                Check::Text(regex)
            }
        };
        Ok(Self {
            key: key.to_string(),
            rule: rule.clone(),
            check,
        })
    }

    /// The column key as written in the configuration.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn rule(&self) -> &ColumnValidationRule {
        &self.rule
    }
}

/// Immutable lookup from column headers to compiled rules.
///
/// Every configured key is registered under its normalized form plus the
/// space/underscore swapped variants; all three point at the same rule.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    by_key: HashMap<String, Arc<ColumnRule>>,
    configured: Vec<Arc<ColumnRule>>,
    required_columns: Vec<String>,
}

impl RuleSet {
    pub fn new(config: &ValidationConfig) -> Result<Self> {
        let mut set = RuleSet {
            required_columns: config.required_columns.clone(),
            ..RuleSet::default()
        };

        for (key, rule) in &config.validations {
            let compiled = Arc::new(ColumnRule::compile(key, rule)?);
            let normalized = normalize_header(key);
            let variants = [
                normalized.replace(' ', "_"),
                normalized.replace('_', " "),
                normalized,
            ];
            for variant in variants {
                match set.by_key.get(&variant) {
                    Some(existing) if existing.key != compiled.key => {
                        warn!(
                            variant = %variant,
                            kept = %existing.key,
                            ignored = %compiled.key,
                            "two configured columns normalize to the same key"
                        );
                    }
                    Some(_) => {}
                    None => {
                        set.by_key.insert(variant, Arc::clone(&compiled));
                    }
                }
            }
            set.configured.push(compiled);
        }

        debug!(
            rules = set.configured.len(),
            keys = set.by_key.len(),
            "compiled rule set"
        );
        Ok(set)
    }

    /// Rule for `header`, or `None` when the column is unconstrained.
    ///
    /// Tries the normalized header, then its spaces-to-underscores and
    /// underscores-to-spaces variants, then a case-insensitive match on
    /// the configured keys.
    pub fn resolve(&self, header: &str) -> Option<&ColumnRule> {
        let normalized = normalize_header(header);
        self.by_key
            .get(&normalized)
            .or_else(|| self.by_key.get(&normalized.replace(' ', "_")))
            .or_else(|| self.by_key.get(&normalized.replace('_', " ")))
            .or_else(|| {
                self.configured
                    .iter()
                    .find(|rule| rule.key.eq_ignore_ascii_case(header))
            })
            .map(Arc::as_ref)
    }

    pub fn required_columns(&self) -> &[String] {
        &self.required_columns
    }

    /// Configured rules in key order.
    pub fn rules(&self) -> impl Iterator<Item = &ColumnRule> {
        self.configured.iter().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.configured.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configured.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_set(keys: &[&str]) -> RuleSet {
        let mut config = ValidationConfig::new();
        for key in keys {
            config = config.with_rule(*key, ColumnValidationRule::new(RuleType::Text));
        }
        RuleSet::new(&config).unwrap()
    }

    #[test]
    fn resolves_separator_and_case_variants() {
        let rules = rule_set(&["Joining_Date"]);
        for header in [
            "Joining_Date",
            "Joining Date",
            "JOINING DATE",
            "joining_date",
            " Joining  Date ",
        ] {
            assert_eq!(
                rules.resolve(header).map(ColumnRule::key),
                Some("Joining_Date"),
                "header {header:?}"
            );
        }
        assert!(rules.resolve("JoiningDate").is_none());
        assert!(rules.resolve("Leaving Date").is_none());
    }

    #[test]
    fn resolves_space_keyed_rule_from_underscore_header() {
        let rules = rule_set(&["Full Name"]);
        assert_eq!(rules.resolve("full_name").map(ColumnRule::key), Some("Full Name"));
        assert_eq!(rules.resolve("FULL-NAME!").map(ColumnRule::key), None);
    }

    #[test]
    fn first_configured_key_wins_on_collision() {
        let rules = rule_set(&["Start Date", "start_date"]);
        assert_eq!(rules.resolve("START DATE").map(ColumnRule::key), Some("Start Date"));
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn invalid_regex_is_a_config_error() {
        let config = ValidationConfig::new()
            .with_rule("Code", ColumnValidationRule::new(RuleType::Text).with_regex("[a-"));
        assert!(matches!(
            RuleSet::new(&config),
            Err(RuleError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn unsupported_date_letter_is_a_config_error() {
        let config = ValidationConfig::new().with_rule(
            "When",
            ColumnValidationRule::new(RuleType::Date).with_format("dd/MM/yyyy Q"),
        );
        assert!(matches!(
            RuleSet::new(&config),
            Err(RuleError::DatePattern { .. })
        ));
    }
}
