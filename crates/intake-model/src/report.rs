//! Caller-facing results of an intake run.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::grid::ColumnGrid;
use crate::issue::ValidationError;

/// Which decoder an upload went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Xlsx,
    Json,
}

impl SourceKind {
    pub const XLSX_MIME: &'static str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
    pub const JSON_MIME: &'static str = "application/json";

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Xlsx => "xlsx",
            SourceKind::Json => "json",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            SourceKind::Xlsx => Self::XLSX_MIME,
            SourceKind::Json => Self::JSON_MIME,
        }
    }

    /// Detect by file extension, case-insensitively.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let extension = Path::new(name).extension()?.to_str()?;
        if extension.eq_ignore_ascii_case("xlsx") {
            Some(SourceKind::Xlsx)
        } else if extension.eq_ignore_ascii_case("json") {
            Some(SourceKind::Json)
        } else {
            None
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or(mime).trim();
        if essence.eq_ignore_ascii_case(Self::XLSX_MIME) {
            Some(SourceKind::Xlsx)
        } else if essence.eq_ignore_ascii_case(Self::JSON_MIME) {
            Some(SourceKind::Json)
        } else {
            None
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one upload: what was read plus everything that failed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeReport {
    pub sheet_count: usize,
    pub sheet_names: Vec<String>,
    pub sheet_data: ColumnGrid,
    pub errors: Vec<String>,
    pub detailed_errors: Vec<ValidationError>,
    pub file_id: Option<String>,
    pub file_type: SourceKind,
}

impl IntakeReport {
    pub fn has_violations(&self) -> bool {
        !self.detailed_errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.detailed_errors.len()
    }
}

/// Availability of a highlighted download for a stored upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightInfo {
    pub file_id: String,
    pub file_name: String,
    pub available: bool,
    pub message: String,
}
