//! Workbook model into xlsx bytes, via `rust_xlsxwriter`.

use chrono::NaiveTime;
use intake_model::{BorderKind, BorderLine, Cell, CellStyle, CellValue, Sheet, Workbook};
use rust_xlsxwriter::utility::row_col_to_cell;
use rust_xlsxwriter::{
    Color, Format, FormatBorder, FormatPattern, FormatUnderline, Formula, Note, Worksheet,
    XlsxError,
};
use tracing::{debug, warn};

use crate::error::{AnnotateError, Result};

/// Note box size per grid unit, in pixels.
const NOTE_COLUMN_PX: u32 = 64;
const NOTE_ROW_PX: u32 = 20;

/// Serializes every sheet in order: column widths, merged ranges, values,
/// formulas with their cached results, styles and notes.
pub fn write_workbook(workbook: &Workbook) -> Result<Vec<u8>> {
    let mut book = rust_xlsxwriter::Workbook::new();
    for sheet in &workbook.sheets {
        let worksheet = book.add_worksheet();
        worksheet
            .set_name(&sheet.name)
            .map_err(|source| AnnotateError::SheetName {
                sheet: sheet.name.clone(),
                source,
            })?;
        write_sheet(worksheet, sheet)?;
    }
    let bytes = book.save_to_buffer().map_err(AnnotateError::Encode)?;
    debug!(sheets = workbook.sheet_count(), bytes = bytes.len(), "wrote workbook");
    Ok(bytes)
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<()> {
    for (column, width) in sheet.column_widths() {
        worksheet
            .set_column_width(column, width)
            .map_err(|source| AnnotateError::Cell {
                sheet: sheet.name.clone(),
                cell: row_col_to_cell(0, column),
                source,
            })?;
    }

    // Merging pads the range with blanks; the cells written below replace them.
    for range in sheet.merged_ranges() {
        if range.is_single_cell() {
            continue;
        }
        let anchor = sheet.cell(range.first_row, range.first_column);
        let format = anchor.map_or_else(Format::new, |cell| build_format(&cell.style));
        let text = anchor.map_or("", |cell| cell.text.as_str());
        if let Err(error) = worksheet.merge_range(
            range.first_row,
            range.first_column,
            range.last_row,
            range.last_column,
            text,
            &format,
        ) {
            warn!(
                sheet = %sheet.name,
                range = %row_col_to_cell(range.first_row, range.first_column),
                %error,
                "merged range skipped"
            );
        }
    }

    for (row, cells) in sheet.rows() {
        for (column, cell) in cells.cells() {
            if cell.is_vacant() {
                continue;
            }
            write_cell(worksheet, row, column, cell).map_err(|source| AnnotateError::Cell {
                sheet: sheet.name.clone(),
                cell: row_col_to_cell(row, column),
                source,
            })?;
        }
    }
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    column: u16,
    cell: &Cell,
) -> std::result::Result<(), XlsxError> {
    let mut format = build_format(&cell.style);

    if let Some(formula) = &cell.formula {
        let formula = Formula::new(formula).set_result(cell.value.plain_text());
        worksheet.write_formula_with_format(row, column, formula, &format)?;
    } else {
        match &cell.value {
            CellValue::Empty => {
                worksheet.write_blank(row, column, &format)?;
            }
            CellValue::Text(text) | CellValue::Error(text) => {
                worksheet.write_string_with_format(row, column, text, &format)?;
            }
            CellValue::Number(number) => {
                worksheet.write_number_with_format(row, column, *number, &format)?;
            }
            CellValue::Bool(flag) => {
                worksheet.write_boolean_with_format(row, column, *flag, &format)?;
            }
            CellValue::DateTime(datetime) => {
                if cell.style.number_format.is_none() {
                    let code = if datetime.time() == NaiveTime::MIN {
                        "yyyy-mm-dd"
                    } else {
                        "yyyy-mm-dd hh:mm:ss"
                    };
                    format = format.set_num_format(code);
                }
                worksheet.write_datetime_with_format(row, column, datetime, &format)?;
            }
        }
    }

    if let Some(note) = &cell.note {
        let note = Note::new(&note.text)
            .add_author_prefix(false)
            .set_author(&note.author)
            .set_width(NOTE_COLUMN_PX * u32::from(note.columns.max(1)))
            .set_height(NOTE_ROW_PX * u32::from(note.rows.max(1)));
        worksheet.insert_note(row, column, &note)?;
    }
    Ok(())
}

fn build_format(style: &CellStyle) -> Format {
    let mut format = Format::new();
    let font = &style.font;
    if font.bold {
        format = format.set_bold();
    }
    if font.italic {
        format = format.set_italic();
    }
    if font.underline {
        format = format.set_underline(FormatUnderline::Single);
    }
    if font.strikethrough {
        format = format.set_font_strikethrough();
    }
    if let Some(name) = &font.name {
        format = format.set_font_name(name);
    }
    if let Some(size) = font.size {
        format = format.set_font_size(size);
    }
    if let Some(color) = font.color {
        format = format.set_font_color(Color::RGB(color.value()));
    }
    if let Some(fill) = style.fill {
        format = format
            .set_background_color(Color::RGB(fill.value()))
            .set_pattern(FormatPattern::Solid);
    }
    if let Some(line) = &style.borders.top {
        format = format.set_border_top(border_kind(line));
        if let Some(color) = line.color {
            format = format.set_border_top_color(Color::RGB(color.value()));
        }
    }
    if let Some(line) = &style.borders.bottom {
        format = format.set_border_bottom(border_kind(line));
        if let Some(color) = line.color {
            format = format.set_border_bottom_color(Color::RGB(color.value()));
        }
    }
    if let Some(line) = &style.borders.left {
        format = format.set_border_left(border_kind(line));
        if let Some(color) = line.color {
            format = format.set_border_left_color(Color::RGB(color.value()));
        }
    }
    if let Some(line) = &style.borders.right {
        format = format.set_border_right(border_kind(line));
        if let Some(color) = line.color {
            format = format.set_border_right_color(Color::RGB(color.value()));
        }
    }
    if let Some(code) = &style.number_format {
        format = format.set_num_format(code);
    }
    format
}

fn border_kind(line: &BorderLine) -> FormatBorder {
    match line.kind {
        BorderKind::Thin => FormatBorder::Thin,
        BorderKind::Medium => FormatBorder::Medium,
        BorderKind::Thick => FormatBorder::Thick,
        BorderKind::Dashed => FormatBorder::Dashed,
        BorderKind::Dotted => FormatBorder::Dotted,
        BorderKind::Double => FormatBorder::Double,
        BorderKind::Hair => FormatBorder::Hair,
        BorderKind::MediumDashed => FormatBorder::MediumDashed,
        BorderKind::DashDot => FormatBorder::DashDot,
        BorderKind::MediumDashDot => FormatBorder::MediumDashDot,
        BorderKind::DashDotDot => FormatBorder::DashDotDot,
        BorderKind::MediumDashDotDot => FormatBorder::MediumDashDotDot,
        BorderKind::SlantDashDot => FormatBorder::SlantDashDot,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_workbook_still_encodes() {
        let mut workbook = Workbook::new();
        workbook.push_sheet(Sheet::new("Data"));
        let bytes = write_workbook(&workbook).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn invalid_sheet_name_is_reported() {
        let mut workbook = Workbook::new();
        workbook.push_sheet(Sheet::new("bad[name]"));
        assert!(matches!(
            write_workbook(&workbook),
            Err(AnnotateError::SheetName { .. })
        ));
    }
}
