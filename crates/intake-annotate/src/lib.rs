//! Marks failing cells in a workbook and serializes the result.
//!
//! [`annotate`] is a pure pass over the in-memory sheet model: it fills
//! each erroring cell and attaches a note. [`write_workbook`] turns the
//! model back into xlsx bytes.

pub mod annotate;
pub mod error;
pub mod writer;

pub use annotate::{AnnotationSummary, MAX_COLUMNS, MAX_ROWS, annotate, note_text};
pub use error::{AnnotateError, Result};
pub use writer::write_workbook;
