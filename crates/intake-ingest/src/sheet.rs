//! Data sheet selection and grid extraction.

use intake_model::{ColumnGrid, Sheet, Workbook};
use tracing::debug;

use crate::error::{IngestError, Result};

/// Sheet used when a workbook has more than one sheet.
pub const DATA_SHEET_NAME: &str = "Data";

/// Index of the sheet to validate: the only sheet, or the one named `Data`.
///
/// The name is matched ignoring ASCII case, so `data` and `DATA` are
/// accepted too; spreadsheet applications treat sheet names that differ
/// only in case as the same sheet.
pub fn select_data_sheet(workbook: &Workbook) -> Result<usize> {
    match workbook.sheet_count() {
        0 => Err(IngestError::NoSheets),
        1 => Ok(0),
        count => workbook
            .position_ignore_case(DATA_SHEET_NAME)
            .ok_or_else(|| IngestError::MissingDataSheet {
                count,
                names: workbook.sheet_names().join(", "),
            }),
    }
}

/// Column grid of `sheet`: row 0 is the header, data runs to the last
/// row with any non-blank cell under a header.
pub fn extract_grid(sheet: &Sheet) -> Result<ColumnGrid> {
    let no_header = || IngestError::NoHeaderRow {
        sheet: sheet.name.clone(),
    };
    let header = sheet.row(0).ok_or_else(no_header)?;
    let last_header_column = header
        .cells()
        .filter(|(_, cell)| !cell.text.trim().is_empty())
        .map(|(column, _)| column)
        .last()
        .ok_or_else(no_header)?;

    let last_data_row = (1..=sheet.last_row_index().unwrap_or(0))
        .rev()
        .find(|&row| {
            (0..=last_header_column).any(|column| !sheet.cell_text(row, column).trim().is_empty())
        })
        .unwrap_or(0);

    let mut grid = ColumnGrid::new();
    for column in 0..=last_header_column {
        let raw = sheet.cell_text(0, column).trim();
        let name = if raw.is_empty() {
            format!("Column_{}", usize::from(column) + 1)
        } else {
            raw.to_string()
        };
        let values = (1..=last_data_row)
            .map(|row| sheet.cell_text(row, column).trim().to_string())
            .collect();
        if grid.column(&name).is_some() {
            debug!(column = %name, "duplicate header, later column replaces earlier");
        }
        grid.insert_column(name, Some(usize::from(column)), values);
    }

    debug!(
        sheet = %sheet.name,
        columns = grid.len(),
        rows = grid.row_count(),
        "extracted grid"
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_model::Cell;

    fn sheet(rows: &[&[&str]]) -> Sheet {
        let mut sheet = Sheet::new("Data");
        for (row, values) in rows.iter().enumerate() {
            for (column, value) in values.iter().enumerate() {
                if !value.is_empty() {
                    sheet.set_cell(row as u32, column as u16, Cell::text(*value));
                }
            }
        }
        sheet
    }

    #[test]
    fn single_sheet_is_selected_regardless_of_name() {
        let mut workbook = Workbook::new();
        workbook.push_sheet(Sheet::new("Anything"));
        assert_eq!(select_data_sheet(&workbook).unwrap(), 0);
    }

    #[test]
    fn data_sheet_name_ignores_case() {
        let mut workbook = Workbook::new();
        workbook.push_sheet(Sheet::new("Summary"));
        workbook.push_sheet(Sheet::new("DATA"));
        assert_eq!(select_data_sheet(&workbook).unwrap(), 1);
    }

    #[test]
    fn data_sheet_is_selected_among_many() {
        let mut workbook = Workbook::new();
        workbook.push_sheet(Sheet::new("Summary"));
        workbook.push_sheet(Sheet::new("data"));
        assert_eq!(select_data_sheet(&workbook).unwrap(), 1);

        workbook.sheets.remove(1);
        workbook.push_sheet(Sheet::new("Notes"));
        assert!(matches!(
            select_data_sheet(&workbook),
            Err(IngestError::MissingDataSheet { count: 2, .. })
        ));
        assert!(matches!(
            select_data_sheet(&Workbook::new()),
            Err(IngestError::NoSheets)
        ));
    }

    #[test]
    fn extracts_columns_and_trims_trailing_blank_rows() {
        let mut data = sheet(&[
            &["Name", "", "Age"],
            &[" Ann ", "x", "25"],
            &["Bob", "", ""],
            &["", "", ""],
        ]);
        data.set_cell(6, 0, Cell::text("   "));

        let grid = extract_grid(&data).unwrap();
        let names: Vec<&str> = grid.column_names().collect();
        assert_eq!(names, vec!["Name", "Column_2", "Age"]);
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.values("Name").unwrap(), &["Ann".to_string(), "Bob".to_string()]);
        assert_eq!(grid.values("Age").unwrap(), &["25".to_string(), String::new()]);
        assert_eq!(grid.position("Age"), Some(2));
    }

    #[test]
    fn cells_beyond_header_width_are_ignored() {
        let data = sheet(&[&["A"], &["1", "stray"], &["", "stray"]]);
        let grid = extract_grid(&data).unwrap();
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.row_count(), 1);
    }

    #[test]
    fn missing_or_blank_header_is_an_error() {
        let mut blank = Sheet::new("Data");
        blank.set_cell(1, 0, Cell::text("value"));
        assert!(matches!(
            extract_grid(&blank),
            Err(IngestError::NoHeaderRow { .. })
        ));

        blank.set_cell(0, 0, Cell::text("  "));
        assert!(matches!(
            extract_grid(&blank),
            Err(IngestError::NoHeaderRow { .. })
        ));
    }

    #[test]
    fn header_only_sheet_has_no_rows() {
        let grid = extract_grid(&sheet(&[&["A", "B"]])).unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.row_count(), 0);
    }
}
