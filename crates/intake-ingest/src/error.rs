//! Error types for workbook and JSON ingestion.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    // === Workbook Errors ===
    /// The bytes are not a readable xlsx package.
    #[error("failed to open workbook: {0}")]
    Workbook(#[source] calamine_styles::XlsxError),

    /// A worksheet could not be decoded.
    #[error("failed to read sheet '{sheet}': {source}")]
    Sheet {
        sheet: String,
        #[source]
        source: calamine_styles::XlsxError,
    },

    #[error("workbook contains no sheets")]
    NoSheets,

    /// Several sheets and none of them is named `Data`.
    #[error("workbook has {count} sheets ({names}) but no sheet named 'Data'")]
    MissingDataSheet { count: usize, names: String },

    #[error("no header row found in sheet '{sheet}'")]
    NoHeaderRow { sheet: String },

    /// A package part read outside calamine (column spans, notes).
    #[error("failed to read package part '{part}': {message}")]
    Package { part: String, message: String },

    // === JSON Errors ===
    /// Neither an array of records nor an object of arrays.
    #[error(
        "unsupported JSON shape: not an array of objects ({array}) and not an object of arrays ({object})"
    )]
    JsonShape { array: String, object: String },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
