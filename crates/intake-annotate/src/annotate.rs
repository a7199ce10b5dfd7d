//! The annotation pass: fill and note every cell a validation error
//! points at.

use intake_model::{AnnotationOptions, CellNote, Sheet, ValidationError};
use tracing::{debug, info_span, trace, warn};

/// Rows in an xlsx worksheet.
pub const MAX_ROWS: u32 = 1_048_576;
/// Columns in an xlsx worksheet.
pub const MAX_COLUMNS: u16 = 16_384;

/// Outcome of [`annotate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotationSummary {
    /// Errors written onto a cell.
    pub annotated: usize,
    /// Errors with no cell to anchor to, or anchored outside the sheet.
    pub skipped: usize,
}

/// Note body for `error`.
pub fn note_text(error: &ValidationError, options: &AnnotationOptions) -> String {
    let mut text = format!("{}\n{}", options.label, error.message);
    if options.include_cell_value {
        text.push_str("\nCurrent value: ");
        text.push_str(error.cell_value.as_deref().unwrap_or_default());
    }
    text
}

/// Marks each cell named by `errors` with the alarm fill and a note.
///
/// Rows and cells missing from the sheet are created. The existing style is
/// kept apart from the fill. When several errors target one cell, the last
/// one's note stays.
pub fn annotate(
    sheet: &mut Sheet,
    errors: &[ValidationError],
    options: &AnnotationOptions,
) -> AnnotationSummary {
    let _span = info_span!("annotate", sheet = %sheet.name, errors = errors.len()).entered();
    let mut summary = AnnotationSummary::default();

    for error in errors {
        let Some((row_number, column_index)) = error.cell_position() else {
            trace!(column = %error.column_name, "no cell position, not annotated");
            summary.skipped += 1;
            continue;
        };
        let Some((row, column)) = grid_position(row_number, column_index) else {
            warn!(
                column = %error.column_name,
                row = row_number,
                column_index,
                "error position outside worksheet bounds, skipped"
            );
            summary.skipped += 1;
            continue;
        };

        let cell = sheet.get_or_create_cell(row, column);
        let mut style = cell.style.clone();
        style.fill = Some(options.fill_color);
        cell.style = style;
        cell.note = Some(CellNote {
            author: options.author.clone(),
            text: note_text(error, options),
            columns: options.note_columns,
            rows: options.note_rows,
        });
        summary.annotated += 1;
    }

    debug!(
        annotated = summary.annotated,
        skipped = summary.skipped,
        "annotation pass finished"
    );
    summary
}

/// Zero-based sheet coordinates for a 1-based row number and a column index.
fn grid_position(row_number: usize, column_index: usize) -> Option<(u32, u16)> {
    let row = u32::try_from(row_number.checked_sub(1)?).ok()?;
    let column = u16::try_from(column_index).ok()?;
    (row < MAX_ROWS && column < MAX_COLUMNS).then_some((row, column))
}
