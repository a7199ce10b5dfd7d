//! Error types for workbook output.

use rust_xlsxwriter::XlsxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnotateError {
    /// The sheet name was rejected by the xlsx writer.
    #[error("invalid sheet name '{sheet}': {source}")]
    SheetName {
        sheet: String,
        #[source]
        source: XlsxError,
    },

    #[error("failed to write cell {cell} in sheet '{sheet}': {source}")]
    Cell {
        sheet: String,
        cell: String,
        #[source]
        source: XlsxError,
    },

    /// The finished workbook could not be packaged.
    #[error("failed to encode workbook: {0}")]
    Encode(#[source] XlsxError),
}

/// Result type for annotation output.
pub type Result<T> = std::result::Result<T, AnnotateError>;
