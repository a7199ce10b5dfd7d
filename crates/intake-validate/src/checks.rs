//! Typed cell checks.

use crate::rules::{Check, ColumnRule};

const REQUIRED: &str = "is required";

/// Violations for one cell; empty when the value is acceptable.
///
/// A blank value only fails when the rule is required, and is never
/// checked further.
pub fn validate_cell(value: &str, rule: &ColumnRule) -> Vec<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return if rule.rule().required {
            vec![REQUIRED.to_string()]
        } else {
            Vec::new()
        };
    }

    let bounds = Bounds {
        min: rule.rule().min,
        max: rule.rule().max,
    };
    match &rule.check {
        Check::Presence => Vec::new(),
        Check::Number => check_number(trimmed, bounds),
        Check::Percent => check_percent(trimmed, bounds),
        Check::Currency => check_currency(trimmed, bounds),
        Check::Date(None) => vec!["date format not specified in configuration".to_string()],
        Check::Date(Some(pattern)) => {
            if pattern.matches(trimmed) {
                Vec::new()
            } else {
                vec![format!(
                    "must match date format {} (current value: '{trimmed}')",
                    pattern.as_str()
                )]
            }
        }
        Check::Text(None) => Vec::new(),
        Check::Text(Some(regex)) => {
            if regex.is_match(value) {
                Vec::new()
            } else {
                vec!["format is invalid".to_string()]
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    min: Option<f64>,
    max: Option<f64>,
}

impl Bounds {
    fn violations(self, number: f64, suffix: &str) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(min) = self.min
            && number < min
        {
            out.push(format!("must be >= {min:?}{suffix}"));
        }
        if let Some(max) = self.max
            && number > max
        {
            out.push(format!("must be <= {max:?}{suffix}"));
        }
        out
    }
}

/// `nan`, `inf` and `infinity` parse as `f64` but are not numbers here.
fn parse_decimal(text: &str) -> Option<f64> {
    text.replace(',', "")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

fn check_number(trimmed: &str, bounds: Bounds) -> Vec<String> {
    if trimmed.ends_with('%') {
        return vec!["must be a numeric value (no % sign)".to_string()];
    }
    match parse_decimal(trimmed) {
        Some(number) => bounds.violations(number, ""),
        None => vec!["must be a number".to_string()],
    }
}

fn check_percent(trimmed: &str, bounds: Bounds) -> Vec<String> {
    let Some(number_part) = trimmed.strip_suffix('%') else {
        return vec!["must be a percentage string ending with % (e.g. 12.00%)".to_string()];
    };
    match parse_decimal(number_part) {
        Some(number) => bounds.violations(number, "%"),
        None => vec!["must be a percentage number like 12.00%".to_string()],
    }
}

fn check_currency(trimmed: &str, bounds: Bounds) -> Vec<String> {
    match parse_decimal(trimmed) {
        Some(number) => bounds.violations(number, ""),
        None => vec!["must be a currency numeric value (e.g. 86,000,000.00)".to_string()],
    }
}
