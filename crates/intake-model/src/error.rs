use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown rule type '{0}' (expected number, percent, currency, date or text)")]
    UnknownRuleType(String),
    #[error("invalid color '{0}' (expected #RRGGBB)")]
    InvalidColor(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
