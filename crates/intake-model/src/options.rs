//! Tunables for the annotation pass and the content store.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::workbook::Rgb;

/// How failing cells are marked in the highlighted workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationOptions {
    pub fill_color: Rgb,
    pub author: String,
    pub label: String,
    pub include_cell_value: bool,
    /// Note width in grid columns.
    pub note_columns: u16,
    /// Note height in grid rows.
    pub note_rows: u16,
}

impl Default for AnnotationOptions {
    fn default() -> Self {
        Self {
            fill_color: Rgb::RED,
            author: "Excel Validator".to_string(),
            label: "Validation Error:".to_string(),
            include_cell_value: true,
            note_columns: 3,
            note_rows: 3,
        }
    }
}

/// Retention settings for uploaded content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    pub ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

impl StoreOptions {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            sweep_interval_secs: 1800,
        }
    }
}
