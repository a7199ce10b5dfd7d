use crate::date_pattern::DatePatternError;

#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("invalid regex for column '{column}': {source}")]
    InvalidRegex {
        column: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid date format '{pattern}' for column '{column}': {source}")]
    DatePattern {
        column: String,
        pattern: String,
        #[source]
        source: DatePatternError,
    },
}

pub type Result<T> = std::result::Result<T, RuleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_pattern_error_names_column_and_pattern() {
        let error = RuleError::DatePattern {
            column: "Joining Date".to_string(),
            pattern: "dd/QQ".to_string(),
            source: DatePatternError::UnsupportedLetter('Q'),
        };
        assert_eq!(
            error.to_string(),
            "invalid date format 'dd/QQ' for column 'Joining Date': unsupported pattern letter 'Q'"
        );
    }
}
