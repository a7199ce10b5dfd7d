pub mod error;
pub mod grid;
pub mod issue;
pub mod options;
pub mod report;
pub mod rule;
pub mod workbook;

pub use error::{ModelError, Result};
pub use grid::{ColumnGrid, GridColumn};
pub use issue::ValidationError;
pub use options::{AnnotationOptions, StoreOptions};
pub use report::{HighlightInfo, IntakeReport, SourceKind};
pub use rule::{ColumnValidationRule, RuleType, ValidationConfig};
pub use workbook::{
    BorderKind, BorderLine, Borders, Cell, CellNote, CellStyle, CellValue, FontStyle, MergedRange,
    Rgb, Row, Sheet, Workbook,
};
