//! Ingestion: xlsx bytes or JSON bytes into a [`ColumnGrid`](intake_model::ColumnGrid).

pub mod display;
pub mod error;
pub mod json;
pub mod package;
pub mod sheet;
pub mod xlsx;

pub use display::display_text;
pub use error::{IngestError, Result};
pub use json::{JSON_SHEET_NAME, decode_json};
pub use package::{SheetNote, SheetParts, read_sheet_parts};
pub use sheet::{DATA_SHEET_NAME, extract_grid, select_data_sheet};
pub use xlsx::read_workbook;
