use serde::{Deserialize, Serialize};

/// A structured validation failure with its exact location.
///
/// `row_number` is 1-based in source terms (header row included for
/// spreadsheets); `0` marks a missing column with no specific row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub column_name: String,
    pub row_number: usize,
    pub column_index: Option<usize>,
    pub message: String,
    pub cell_value: Option<String>,
}

impl ValidationError {
    pub fn missing_column(column: &str) -> Self {
        Self {
            column_name: column.to_string(),
            row_number: 0,
            column_index: None,
            message: format!("Missing required column: {column}"),
            cell_value: None,
        }
    }

    pub fn cell(
        column: &str,
        row_number: usize,
        column_index: Option<usize>,
        message: impl Into<String>,
        value: &str,
    ) -> Self {
        Self {
            column_name: column.to_string(),
            row_number,
            column_index,
            message: message.into(),
            cell_value: Some(value.to_string()),
        }
    }

    /// The `(row, column)` the error can be anchored to, if any.
    pub fn cell_position(&self) -> Option<(usize, usize)> {
        match (self.row_number, self.column_index) {
            (0, _) | (_, None) => None,
            (row, Some(column)) => Some((row, column)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_has_no_position() {
        let error = ValidationError::missing_column("Email");
        assert_eq!(error.message, "Missing required column: Email");
        assert_eq!(error.row_number, 0);
        assert_eq!(error.column_index, None);
        assert_eq!(error.cell_value, None);
        assert_eq!(error.cell_position(), None);
    }

    #[test]
    fn cell_error_is_anchored() {
        let error = ValidationError::cell("Age", 3, Some(1), "Row 3: Age must be a number", "abc");
        assert_eq!(error.cell_position(), Some((3, 1)));
        let positionless = ValidationError::cell("Age", 3, None, "x", "abc");
        assert_eq!(positionless.cell_position(), None);
    }
}
