//! Error types for the intake flows.

use intake_annotate::AnnotateError;
use intake_ingest::IngestError;
use intake_store::StoreError;
use intake_validate::RuleError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IntakeError {
    // === Request Errors ===
    #[error("file is empty")]
    EmptyUpload,

    /// Neither the file name nor the MIME type names a supported format.
    #[error("only .xlsx and .json files are supported (got '{file_name}')")]
    UnsupportedFileType { file_name: String },

    /// Unknown id, or the record has expired.
    #[error("file not found or expired: {file_id}")]
    FileNotFound { file_id: String },

    #[error("error highlighting is only supported for Excel (.xlsx) files")]
    NotSpreadsheet { file_id: String },

    // === Wrapped Errors ===
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Rules(#[from] RuleError),

    #[error(transparent)]
    Annotate(#[from] AnnotateError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for intake operations.
pub type Result<T> = std::result::Result<T, IntakeError>;
