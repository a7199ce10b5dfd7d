use intake_model::{ColumnValidationRule, RuleType, ValidationConfig};
use intake_validate::{ColumnRule, RuleSet, normalize_header, validate_cell};
use proptest::prelude::*;

fn rule_type() -> impl Strategy<Value = RuleType> {
    prop::sample::select(RuleType::ALL.to_vec())
}

/// Re-spell a header: random case, punctuation sprinkled in, doubled spaces.
fn respell(header: &str, seed: &[u8]) -> String {
    let mut out = String::new();
    for (index, ch) in header.chars().enumerate() {
        let noise = seed.get(index % seed.len().max(1)).copied().unwrap_or(0);
        match noise % 4 {
            0 => out.push(ch.to_ascii_uppercase()),
            1 => out.push(ch.to_ascii_lowercase()),
            2 => {
                out.push(ch);
                out.push('-');
            }
            _ => {
                out.push(ch);
                if ch == ' ' {
                    out.push(' ');
                }
            }
        }
    }
    out
}

proptest! {
    #[test]
    fn normalize_is_idempotent(raw in ".{0,40}") {
        let once = normalize_header(&raw);
        prop_assert_eq!(normalize_header(&once), once);
    }

    #[test]
    fn respelled_headers_resolve_to_the_same_rule(
        key in "[A-Za-z][A-Za-z0-9_ ]{0,15}",
        other in "[A-Za-z][A-Za-z0-9_ ]{0,15}",
        seed in prop::collection::vec(any::<u8>(), 1..16),
    ) {
        let config = ValidationConfig::new()
            .with_rule(key.clone(), ColumnValidationRule::new(RuleType::Text))
            .with_rule(other, ColumnValidationRule::new(RuleType::Number));
        let rules = RuleSet::new(&config).unwrap();

        let variant = respell(&key, &seed);
        prop_assert_eq!(normalize_header(&variant).replace(' ', "_"), normalize_header(&key).replace(' ', "_"));
        prop_assert_eq!(
            rules.resolve(&key).map(ColumnRule::key),
            rules.resolve(&variant).map(ColumnRule::key)
        );
        prop_assert!(rules.resolve(&key).is_some());
    }

    #[test]
    fn required_blank_is_always_required(kind in rule_type(), blank in "[ \t]{0,4}") {
        let rule = ColumnRule::compile(
            "Column",
            &ColumnValidationRule::new(kind).required().with_format("dd/MM/yyyy"),
        )
        .unwrap();
        prop_assert_eq!(validate_cell(&blank, &rule), vec!["is required".to_string()]);
    }

    #[test]
    fn unbounded_number_accepts_floats_and_rejects_percent(
        value in prop::num::f64::POSITIVE
            | prop::num::f64::NEGATIVE
            | prop::num::f64::NORMAL
            | prop::num::f64::SUBNORMAL
            | prop::num::f64::ZERO
    ) {
        let rule = ColumnRule::compile("Amount", &ColumnValidationRule::new(RuleType::Number)).unwrap();
        let text = value.to_string();
        prop_assert!(validate_cell(&text, &rule).is_empty());
        prop_assert_eq!(
            validate_cell(&format!("{text}%"), &rule),
            vec!["must be a numeric value (no % sign)".to_string()]
        );
    }

    #[test]
    fn grouped_integers_are_numbers(value in any::<i64>()) {
        let rule = ColumnRule::compile("Amount", &ColumnValidationRule::new(RuleType::Currency)).unwrap();
        let digits = value.unsigned_abs().to_string();
        let mut grouped = String::new();
        for (index, ch) in digits.chars().enumerate() {
            if index > 0 && (digits.len() - index) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        prop_assert!(validate_cell(&grouped, &rule).is_empty());
    }
}
