//! Intake flows over the ingest, validate, annotate and store crates.
//!
//! [`IntakeService`] is the single entry point a front door (CLI, HTTP)
//! needs: upload a file and get a validation report plus a stored id, then
//! later fetch a highlighted copy of that upload by id.

pub mod error;
pub mod naming;
pub mod service;

pub use error::{IntakeError, Result};
pub use naming::{FALLBACK_HIGHLIGHTED_NAME, highlighted_file_name};
pub use service::{AnnotatedFile, IntakeService};
