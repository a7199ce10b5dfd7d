//! Rule-driven validation of column-oriented grids.
//!
//! Headers are normalized and resolved against a compiled [`RuleSet`];
//! every cell of a constrained column goes through the typed checks and
//! failures come back as both flat messages and positioned
//! [`ValidationError`](intake_model::ValidationError)s.

mod checks;
mod date_pattern;
mod engine;
mod error;
mod normalize;
mod rules;

pub use checks::validate_cell;
pub use date_pattern::{DatePattern, DatePatternError};
pub use engine::{GridValidation, validate_grid};
pub use error::{Result, RuleError};
pub use normalize::normalize_header;
pub use rules::{ColumnRule, RuleSet};
