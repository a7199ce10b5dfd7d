//! In-memory spreadsheet: sheets of sparse rows of styled cells.
//!
//! This is the shape the reader produces, the annotation pass mutates and
//! the writer serializes. Rows and cells are sparse; `get_or_create_*`
//! materializes them on demand and leaves existing entries untouched.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// 24-bit RGB colour, written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(u32);

impl Rgb {
    pub const RED: Rgb = Rgb(0xFF_00_00);
    pub const BLACK: Rgb = Rgb(0x00_00_00);

    pub const fn new(value: u32) -> Self {
        Rgb(value & 0xFF_FF_FF)
    }

    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Rgb(((red as u32) << 16) | ((green as u32) << 8) | blue as u32)
    }

    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

impl FromStr for Rgb {
    type Err = ModelError;

    /// Accepts `#RRGGBB`, `RRGGBB` and ARGB `AARRGGBB` (alpha dropped).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let hex = value.trim().trim_start_matches('#');
        let hex = match hex.len() {
            6 => hex,
            8 => &hex[2..],
            _ => return Err(ModelError::InvalidColor(value.to_string())),
        };
        u32::from_str_radix(hex, 16)
            .map(Rgb::new)
            .map_err(|_| ModelError::InvalidColor(value.to_string()))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// Typed content of a cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    /// Spreadsheet error literal such as `#DIV/0!`.
    Error(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    /// Text without any number format applied.
    pub fn plain_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(text) | CellValue::Error(text) => text.clone(),
            CellValue::Number(number) => {
                if number.fract() == 0.0 && number.abs() < 1e15 {
                    format!("{number:.0}")
                } else {
                    number.to_string()
                }
            }
            CellValue::Bool(true) => "TRUE".to_string(),
            CellValue::Bool(false) => "FALSE".to_string(),
            CellValue::DateTime(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderKind {
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
    Hair,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderLine {
    pub kind: BorderKind,
    pub color: Option<Rgb>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Borders {
    pub left: Option<BorderLine>,
    pub right: Option<BorderLine>,
    pub top: Option<BorderLine>,
    pub bottom: Option<BorderLine>,
}

impl Borders {
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none() && self.top.is_none() && self.bottom.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontStyle {
    pub name: Option<String>,
    pub size: Option<f64>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub color: Option<Rgb>,
}

/// Visual attributes of a cell. `fill` is a solid background colour.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellStyle {
    pub font: FontStyle,
    pub fill: Option<Rgb>,
    pub borders: Borders,
    pub number_format: Option<String>,
}

impl CellStyle {
    pub fn is_default(&self) -> bool {
        *self == CellStyle::default()
    }
}

/// Comment attached to a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellNote {
    pub author: String,
    pub text: String,
    /// Width of the note box in grid columns.
    pub columns: u16,
    /// Height of the note box in grid rows.
    pub rows: u16,
}

/// A single cell: typed value, the text a user sees, optional formula,
/// style and note.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub text: String,
    pub formula: Option<String>,
    pub style: CellStyle,
    pub note: Option<CellNote>,
}

impl Cell {
    pub fn new(value: CellValue) -> Self {
        let text = value.plain_text();
        Self {
            value,
            text,
            ..Self::default()
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(CellValue::Text(value.into()))
    }

    pub fn number(value: f64) -> Self {
        Self::new(CellValue::Number(value))
    }

    #[must_use]
    pub fn with_display(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: CellStyle) -> Self {
        self.style = style;
        self
    }

    /// True when the cell carries nothing worth writing back.
    pub fn is_vacant(&self) -> bool {
        self.value.is_empty()
            && self.formula.is_none()
            && self.note.is_none()
            && self.style.is_default()
    }
}

/// Sparse row keyed by zero-based column index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: BTreeMap<u16, Cell>,
}

impl Row {
    pub fn cell(&self, column: u16) -> Option<&Cell> {
        self.cells.get(&column)
    }

    pub fn cell_mut(&mut self, column: u16) -> Option<&mut Cell> {
        self.cells.get_mut(&column)
    }

    /// Returns the cell at `column`, inserting an empty one if absent.
    pub fn get_or_create_cell(&mut self, column: u16) -> &mut Cell {
        self.cells.entry(column).or_default()
    }

    pub fn set_cell(&mut self, column: u16, cell: Cell) {
        self.cells.insert(column, cell);
    }

    pub fn cells(&self) -> impl Iterator<Item = (u16, &Cell)> {
        self.cells.iter().map(|(column, cell)| (*column, cell))
    }

    pub fn last_column_index(&self) -> Option<u16> {
        self.cells.keys().next_back().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Inclusive block of merged cells, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MergedRange {
    pub first_row: u32,
    pub first_column: u16,
    pub last_row: u32,
    pub last_column: u16,
}

impl MergedRange {
    pub fn is_single_cell(&self) -> bool {
        self.first_row == self.last_row && self.first_column == self.last_column
    }
}

/// A named worksheet of sparse rows keyed by zero-based row index, plus
/// the sheet layout that survives a rewrite: custom column widths (in
/// character units) and merged ranges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub name: String,
    rows: BTreeMap<u32, Row>,
    column_widths: BTreeMap<u16, f64>,
    merged_ranges: Vec<MergedRange>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn set_column_width(&mut self, column: u16, width: f64) {
        self.column_widths.insert(column, width);
    }

    pub fn column_width(&self, column: u16) -> Option<f64> {
        self.column_widths.get(&column).copied()
    }

    pub fn column_widths(&self) -> impl Iterator<Item = (u16, f64)> {
        self.column_widths
            .iter()
            .map(|(column, width)| (*column, *width))
    }

    pub fn add_merged_range(&mut self, range: MergedRange) {
        self.merged_ranges.push(range);
    }

    pub fn merged_ranges(&self) -> &[MergedRange] {
        &self.merged_ranges
    }

    pub fn row(&self, row: u32) -> Option<&Row> {
        self.rows.get(&row)
    }

    pub fn row_mut(&mut self, row: u32) -> Option<&mut Row> {
        self.rows.get_mut(&row)
    }

    /// Returns the row at `row`, inserting an empty one if absent.
    pub fn get_or_create_row(&mut self, row: u32) -> &mut Row {
        self.rows.entry(row).or_default()
    }

    pub fn cell(&self, row: u32, column: u16) -> Option<&Cell> {
        self.rows.get(&row).and_then(|cells| cells.cell(column))
    }

    /// Returns the cell at `(row, column)`, materializing row and cell.
    pub fn get_or_create_cell(&mut self, row: u32, column: u16) -> &mut Cell {
        self.get_or_create_row(row).get_or_create_cell(column)
    }

    pub fn set_cell(&mut self, row: u32, column: u16, cell: Cell) {
        self.get_or_create_row(row).set_cell(column, cell);
    }

    /// Display text at `(row, column)`, empty when the cell is absent.
    pub fn cell_text(&self, row: u32, column: u16) -> &str {
        self.cell(row, column)
            .map_or("", |cell| cell.text.as_str())
    }

    pub fn rows(&self) -> impl Iterator<Item = (u32, &Row)> {
        self.rows.iter().map(|(index, row)| (*index, row))
    }

    pub fn last_row_index(&self) -> Option<u32> {
        self.rows.keys().next_back().copied()
    }
}

/// An ordered collection of sheets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|sheet| sheet.name.clone()).collect()
    }

    /// Index of the sheet whose name matches ignoring ASCII case.
    pub fn position_ignore_case(&self, name: &str) -> Option<usize> {
        self.sheets
            .iter()
            .position(|sheet| sheet.name.eq_ignore_ascii_case(name))
    }

    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    pub fn sheet_mut(&mut self, index: usize) -> Option<&mut Sheet> {
        self.sheets.get_mut(index)
    }
}
