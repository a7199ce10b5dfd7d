//! xlsx bytes into the workbook model, via `calamine-styles`.

use std::collections::HashMap;
use std::io::Cursor;

use calamine_styles::{
    BorderStyle as CalBorderStyle, Color, Data, FillPattern, FontStyle as CalFontStyle,
    FontWeight, Reader, Style, StyleRange, UnderlineStyle, Xlsx,
};
use chrono::NaiveDateTime;
use intake_model::{
    BorderKind, BorderLine, Borders, Cell, CellNote, CellStyle, CellValue, FontStyle, MergedRange,
    Rgb, Sheet, Workbook,
};
use tracing::{debug, warn};

use crate::display::display_text;
use crate::error::{IngestError, Result};
use crate::package::{SheetParts, read_sheet_parts};

type XlsxReader = Xlsx<Cursor<Vec<u8>>>;

/// Note box size given to notes read from a file; the stored size lives
/// in VML drawings, which are not read.
const READ_NOTE_COLUMNS: u16 = 2;
const READ_NOTE_ROWS: u16 = 4;

/// Decode every sheet of an xlsx package.
///
/// Cells carry their typed value, cached formula text, style, note and
/// the display text produced through their number format. Sheets keep
/// their custom column widths and merged ranges.
pub fn read_workbook(bytes: &[u8]) -> Result<Workbook> {
    let mut xlsx: XlsxReader =
        Xlsx::new(Cursor::new(bytes.to_vec())).map_err(IngestError::Workbook)?;
    let names = xlsx.sheet_names().to_vec();
    let mut parts = match read_sheet_parts(bytes) {
        Ok(parts) => parts,
        Err(error) => {
            warn!(%error, "column widths and notes unavailable, reading cells only");
            HashMap::new()
        }
    };

    let mut workbook = Workbook::new();
    for name in names {
        let extra = parts.remove(&name).unwrap_or_default();
        let sheet = read_sheet(&mut xlsx, &name, extra)?;
        debug!(sheet = %name, rows = sheet.last_row_index().map_or(0, |row| row + 1), "read sheet");
        workbook.push_sheet(sheet);
    }
    Ok(workbook)
}

fn read_sheet(xlsx: &mut XlsxReader, name: &str, extra: SheetParts) -> Result<Sheet> {
    let range = xlsx
        .worksheet_range(name)
        .map_err(|source| IngestError::Sheet {
            sheet: name.to_string(),
            source,
        })?;
    let styles = match xlsx.worksheet_style(name) {
        Ok(styles) => Some(styles),
        Err(error) => {
            warn!(sheet = %name, %error, "cell styles unavailable, reading values only");
            None
        }
    };

    let mut sheet = Sheet::new(name);
    let (origin_row, origin_col) = range.start().unwrap_or((0, 0));
    for (row, col, data) in range.used_cells() {
        let Some((row, col)) = absolute(origin_row, origin_col, row, col) else {
            continue;
        };
        sheet.set_cell(row, col, Cell::new(convert_data(data)));
    }

    // Formulas keep the cached result read above.
    if let Ok(formulas) = xlsx.worksheet_formula(name) {
        let (origin_row, origin_col) = formulas.start().unwrap_or((0, 0));
        for (row, col, formula) in formulas.used_cells() {
            if formula.is_empty() {
                continue;
            }
            let Some((row, col)) = absolute(origin_row, origin_col, row, col) else {
                continue;
            };
            sheet.get_or_create_cell(row, col).formula = Some(formula.clone());
        }
    }

    for note in extra.notes {
        sheet.get_or_create_cell(note.row, note.column).note = Some(CellNote {
            author: note.author,
            text: note.text,
            columns: READ_NOTE_COLUMNS,
            rows: READ_NOTE_ROWS,
        });
    }
    for (column, width) in extra.column_widths {
        sheet.set_column_width(column, width);
    }
    match xlsx.worksheet_merge_cells(name) {
        Some(Ok(ranges)) => {
            for range in ranges {
                let (Ok(first_column), Ok(last_column)) =
                    (u16::try_from(range.start.1), u16::try_from(range.end.1))
                else {
                    continue;
                };
                sheet.add_merged_range(MergedRange {
                    first_row: range.start.0,
                    first_column,
                    last_row: range.end.0,
                    last_column,
                });
            }
        }
        Some(Err(error)) => warn!(sheet = %name, %error, "merged ranges unavailable"),
        None => {}
    }

    let positions: Vec<(u32, u16)> = sheet
        .rows()
        .flat_map(|(row, cells)| cells.cells().map(move |(col, _)| (row, col)))
        .collect();
    for (row, col) in positions {
        let style = styles
            .as_ref()
            .and_then(|styles| style_at(styles, row, col))
            .map(convert_style)
            .unwrap_or_default();
        let cell = sheet.get_or_create_cell(row, col);
        cell.text = display_text(&cell.value, style.number_format.as_deref());
        cell.style = style;
    }

    Ok(sheet)
}

fn absolute(origin_row: u32, origin_col: u32, row: usize, col: usize) -> Option<(u32, u16)> {
    let row = origin_row.checked_add(u32::try_from(row).ok()?)?;
    let col = origin_col.checked_add(u32::try_from(col).ok()?)?;
    Some((row, u16::try_from(col).ok()?))
}

fn style_at(styles: &StyleRange, row: u32, col: u16) -> Option<&Style> {
    let (origin_row, origin_col) = styles.start().unwrap_or((0, 0));
    let col = u32::from(col);
    if row < origin_row || col < origin_col {
        return None;
    }
    styles.get(((row - origin_row) as usize, (col - origin_col) as usize))
}

fn convert_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(text) => CellValue::Text(text.clone()),
        Data::RichText(text) => CellValue::Text(text.plain_text()),
        Data::Float(number) => CellValue::Number(*number),
        Data::Int(number) => CellValue::Number(*number as f64),
        Data::Bool(flag) => CellValue::Bool(*flag),
        Data::DateTime(datetime) => datetime
            .as_datetime()
            .map_or(CellValue::Number(datetime.as_f64()), CellValue::DateTime),
        Data::DateTimeIso(text) => parse_iso_datetime(text)
            .map_or_else(|| CellValue::Text(text.clone()), CellValue::DateTime),
        Data::DurationIso(text) => CellValue::Text(text.clone()),
        Data::Error(error) => CellValue::Error(error.to_string()),
    }
}

fn parse_iso_datetime(text: &str) -> Option<NaiveDateTime> {
    let raw = text.trim_end_matches('Z');
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn rgb(color: &Color) -> Rgb {
    Rgb::from_rgb(color.red, color.green, color.blue)
}

fn border_line(border: &calamine_styles::Border) -> Option<BorderLine> {
    let kind = match border.style {
        CalBorderStyle::None => return None,
        CalBorderStyle::Thin => BorderKind::Thin,
        CalBorderStyle::Medium => BorderKind::Medium,
        CalBorderStyle::Thick => BorderKind::Thick,
        CalBorderStyle::Double => BorderKind::Double,
        CalBorderStyle::Hair => BorderKind::Hair,
        CalBorderStyle::Dashed => BorderKind::Dashed,
        CalBorderStyle::Dotted => BorderKind::Dotted,
        CalBorderStyle::MediumDashed => BorderKind::MediumDashed,
        CalBorderStyle::DashDot => BorderKind::DashDot,
        CalBorderStyle::DashDotDot => BorderKind::DashDotDot,
        CalBorderStyle::SlantDashDot => BorderKind::SlantDashDot,
    };
    Some(BorderLine {
        kind,
        color: border.color.as_ref().map(rgb),
    })
}

fn convert_style(style: &Style) -> CellStyle {
    let mut out = CellStyle::default();
    if let Some(font) = &style.font {
        out.font = FontStyle {
            name: font.name.clone(),
            size: font.size,
            bold: font.weight == FontWeight::Bold,
            italic: font.style == CalFontStyle::Italic,
            underline: font.underline != UnderlineStyle::None,
            strikethrough: font.strikethrough,
            color: font.color.as_ref().map(rgb),
        };
    }
    if let Some(fill) = &style.fill
        && fill.pattern != FillPattern::None
    {
        out.fill = fill.get_color().as_ref().map(rgb);
    }
    if let Some(borders) = &style.borders {
        out.borders = Borders {
            left: border_line(&borders.left),
            right: border_line(&borders.right),
            top: border_line(&borders.top),
            bottom: border_line(&borders.bottom),
        };
    }
    if let Some(format) = &style.number_format
        && !format.format_code.eq_ignore_ascii_case("general")
    {
        out.number_format = Some(format.format_code.clone());
    }
    out
}
