//! Grid-level validation.

use std::collections::HashSet;

use intake_model::{ColumnGrid, ValidationError};
use tracing::{debug, debug_span, trace};

use crate::checks::validate_cell;
use crate::normalize::normalize_header;
use crate::rules::RuleSet;

/// Everything one validation pass found, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridValidation {
    /// Human-readable lines, one per detailed error.
    pub messages: Vec<String>,
    pub errors: Vec<ValidationError>,
}

impl GridValidation {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, error: ValidationError) {
        self.messages.push(error.message.clone());
        self.errors.push(error);
    }
}

/// Validate every constrained column of `grid`.
///
/// Missing required columns are reported first (row 0, no position);
/// then each column is checked in grid order, rows in order. `row_offset`
/// is the source row number of the first data row (2 for spreadsheets
/// with a header row, 1 for JSON).
pub fn validate_grid(
    grid: &ColumnGrid,
    required_columns: &[String],
    rules: &RuleSet,
    row_offset: usize,
) -> GridValidation {
    let span = debug_span!("validate_grid", columns = grid.len(), rows = grid.row_count());
    let _guard = span.enter();

    let mut result = GridValidation::default();
    let present: HashSet<String> = grid.column_names().map(normalize_header).collect();

    for required in required_columns {
        if required.trim().is_empty() {
            continue;
        }
        if !present.contains(&normalize_header(required)) {
            debug!(column = %required, "required column missing");
            result.push(ValidationError::missing_column(required));
        }
    }

    for (name, column) in grid.iter() {
        let Some(rule) = rules.resolve(name) else {
            trace!(column = %name, "no rule configured");
            continue;
        };
        trace!(column = %name, rule = %rule.key(), "validating column");
        for (index, value) in column.values.iter().enumerate() {
            let row_number = index + row_offset;
            for violation in validate_cell(value, rule) {
                trace!(column = %name, row = row_number, "cell failed validation");
                result.push(ValidationError::cell(
                    name,
                    row_number,
                    column.position,
                    format!("Row {row_number}: {name} {violation}"),
                    value,
                ));
            }
        }
    }

    debug!(error_count = result.errors.len(), "grid validated");
    result
}
