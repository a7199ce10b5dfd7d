//! The intake service: upload → validate → store, and the later
//! highlighted download of a stored spreadsheet.

use std::time::Duration;

use intake_annotate::{annotate, write_workbook};
use intake_config::IntakeConfig;
use intake_ingest::{
    IngestError, JSON_SHEET_NAME, decode_json, extract_grid, read_workbook, select_data_sheet,
};
use intake_model::{
    AnnotationOptions, ColumnGrid, HighlightInfo, IntakeReport, SourceKind, StoreOptions,
    Workbook,
};
use intake_store::{ContentStore, FileRecord, SweeperHandle};
use intake_validate::{GridValidation, RuleSet, validate_grid};
use tracing::{debug, info, info_span, warn};

use crate::error::{IntakeError, Result};
use crate::naming::highlighted_file_name;

/// Source row number of the first data row, below the header.
const XLSX_ROW_OFFSET: usize = 2;
/// JSON records have no header row.
const JSON_ROW_OFFSET: usize = 1;

/// A highlighted workbook ready to hand back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedFile {
    pub file_name: String,
    pub content: Vec<u8>,
    /// Validation errors found on the re-read, including ones that could
    /// not be anchored to a cell.
    pub error_count: usize,
}

/// Compiled rules, annotation settings and the content store.
///
/// All operations take `&self`; the service can be shared across threads.
#[derive(Debug)]
pub struct IntakeService {
    rules: RuleSet,
    annotation: AnnotationOptions,
    store: ContentStore,
    sweep_interval: Duration,
}

impl IntakeService {
    /// Compiles the rule set and creates an empty store.
    pub fn new(config: &IntakeConfig) -> Result<Self> {
        let rules = RuleSet::new(&config.rules)?;
        info!(
            rules = rules.len(),
            required = rules.required_columns().len(),
            ttl_secs = config.store.ttl_secs,
            sweep_interval_secs = config.store.sweep_interval_secs,
            "intake service ready"
        );
        Ok(Self::from_parts(
            rules,
            config.annotation.clone(),
            ContentStore::new(config.store.ttl()),
        )
        .with_sweep_interval(config.store.sweep_interval()))
    }

    pub fn from_parts(rules: RuleSet, annotation: AnnotationOptions, store: ContentStore) -> Self {
        Self {
            rules,
            annotation,
            store,
            sweep_interval: StoreOptions::default().sweep_interval(),
        }
    }

    #[must_use]
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Starts the background expiry sweep for this service's store at the
    /// configured interval. The sweep runs until the handle is dropped.
    pub fn spawn_sweeper(&self) -> Result<SweeperHandle> {
        Ok(self.store.spawn_sweeper(self.sweep_interval)?)
    }

    /// Decodes, validates and stores an upload.
    ///
    /// The format comes from the file extension, falling back to the MIME
    /// type. Validation failures are part of the report, not an error.
    pub fn upload(
        &self,
        bytes: &[u8],
        file_name: &str,
        mime_type: Option<&str>,
    ) -> Result<IntakeReport> {
        let span = info_span!("upload", file = %file_name, bytes = bytes.len());
        let _guard = span.enter();

        if bytes.is_empty() {
            return Err(IntakeError::EmptyUpload);
        }
        let kind = SourceKind::from_file_name(file_name)
            .or_else(|| mime_type.and_then(SourceKind::from_mime))
            .ok_or_else(|| IntakeError::UnsupportedFileType {
                file_name: file_name.to_string(),
            })?;

        let (sheet_names, grid, row_offset) = match kind {
            SourceKind::Xlsx => {
                let workbook = read_workbook(bytes)?;
                let grid = data_grid(&workbook)?.1;
                (workbook.sheet_names(), grid, XLSX_ROW_OFFSET)
            }
            SourceKind::Json => (
                vec![JSON_SHEET_NAME.to_string()],
                decode_json(bytes)?,
                JSON_ROW_OFFSET,
            ),
        };

        let validation = self.validate(&grid, row_offset);
        let mime = mime_type
            .filter(|mime| !mime.trim().is_empty())
            .unwrap_or_else(|| kind.mime_type());
        let file_id = self.store.put(bytes.to_vec(), file_name, mime);

        info!(
            file_id = %file_id,
            file_type = %kind,
            columns = grid.len(),
            rows = grid.row_count(),
            error_count = validation.errors.len(),
            "upload processed"
        );
        Ok(IntakeReport {
            sheet_count: sheet_names.len(),
            sheet_names,
            sheet_data: grid,
            errors: validation.messages,
            detailed_errors: validation.errors,
            file_id: Some(file_id),
            file_type: kind,
        })
    }

    /// Re-reads a stored spreadsheet, validates it again and returns a copy
    /// with every failing cell filled and noted.
    pub fn annotated_download(&self, file_id: &str) -> Result<AnnotatedFile> {
        let span = info_span!("annotated_download", file_id = %file_id);
        let _guard = span.enter();

        let record = self.spreadsheet_record(file_id)?;
        let mut workbook = read_workbook(&record.content)?;
        let (index, grid) = data_grid(&workbook)?;
        let validation = self.validate(&grid, XLSX_ROW_OFFSET);

        let Some(sheet) = workbook.sheet_mut(index) else {
            return Err(IngestError::NoSheets.into());
        };
        let summary = annotate(sheet, &validation.errors, &self.annotation);
        let content = write_workbook(&workbook)?;

        info!(
            annotated = summary.annotated,
            skipped = summary.skipped,
            bytes = content.len(),
            "highlighted workbook generated"
        );
        Ok(AnnotatedFile {
            file_name: highlighted_file_name(&record.original_name),
            content,
            error_count: validation.errors.len(),
        })
    }

    /// Whether a highlighted download can be produced, without producing it.
    pub fn highlight_info(&self, file_id: &str) -> Result<HighlightInfo> {
        let record = self.record(file_id)?;
        if !is_spreadsheet(&record) {
            return Ok(HighlightInfo {
                file_id: record.id,
                file_name: record.original_name,
                available: false,
                message: "Error highlighting is only supported for Excel (.xlsx) files".to_string(),
            });
        }
        Ok(HighlightInfo {
            file_name: highlighted_file_name(&record.original_name),
            file_id: record.id,
            available: true,
            message: "Highlighted file is ready for download".to_string(),
        })
    }

    /// Removes a stored upload. Unknown or expired ids are an error here.
    pub fn delete(&self, file_id: &str) -> Result<()> {
        self.record(file_id)?;
        self.store.remove(file_id);
        debug!(file_id = %file_id, "stored file deleted");
        Ok(())
    }

    pub fn stored_file_count(&self) -> usize {
        self.store.count()
    }

    fn validate(&self, grid: &ColumnGrid, row_offset: usize) -> GridValidation {
        validate_grid(grid, self.rules.required_columns(), &self.rules, row_offset)
    }

    fn record(&self, file_id: &str) -> Result<FileRecord> {
        self.store
            .get(file_id)
            .ok_or_else(|| IntakeError::FileNotFound {
                file_id: file_id.to_string(),
            })
    }

    fn spreadsheet_record(&self, file_id: &str) -> Result<FileRecord> {
        let record = self.record(file_id)?;
        if !is_spreadsheet(&record) {
            warn!(file_id = %file_id, name = %record.original_name, "highlight requested for non-spreadsheet");
            return Err(IntakeError::NotSpreadsheet {
                file_id: file_id.to_string(),
            });
        }
        Ok(record)
    }
}

fn is_spreadsheet(record: &FileRecord) -> bool {
    SourceKind::from_file_name(&record.original_name)
        .or_else(|| SourceKind::from_mime(&record.mime_type))
        == Some(SourceKind::Xlsx)
}

fn data_grid(workbook: &Workbook) -> Result<(usize, ColumnGrid)> {
    let index = select_data_sheet(workbook)?;
    let Some(sheet) = workbook.sheet(index) else {
        return Err(IngestError::NoSheets.into());
    };
    Ok((index, extract_grid(sheet)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_model::{ColumnValidationRule, RuleType, ValidationConfig};

    fn service() -> IntakeService {
        let config = IntakeConfig {
            rules: ValidationConfig::new()
                .with_rule(
                    "Age",
                    ColumnValidationRule::new(RuleType::Number)
                        .required()
                        .with_min(0.0)
                        .with_max(130.0),
                )
                .with_required_column("Email"),
            ..IntakeConfig::default()
        };
        IntakeService::new(&config).unwrap()
    }

    #[test]
    fn empty_upload_is_rejected() {
        assert!(matches!(
            service().upload(b"", "data.json", None),
            Err(IntakeError::EmptyUpload)
        ));
    }

    #[test]
    fn sweeper_runs_at_the_configured_interval() {
        let config = IntakeConfig {
            store: StoreOptions {
                ttl_secs: 60,
                sweep_interval_secs: 5,
            },
            ..IntakeConfig::default()
        };
        let service = IntakeService::new(&config).unwrap();
        assert_eq!(service.sweep_interval(), Duration::from_secs(5));
        service.spawn_sweeper().unwrap().stop();

        let parts = IntakeService::from_parts(
            RuleSet::new(&config.rules).unwrap(),
            AnnotationOptions::default(),
            ContentStore::new(Duration::from_secs(60)),
        );
        assert_eq!(parts.sweep_interval(), Duration::from_secs(1800));
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(matches!(
            service().upload(b"a,b", "data.csv", Some("text/csv")),
            Err(IntakeError::UnsupportedFileType { .. })
        ));
    }

    #[test]
    fn json_upload_is_validated_and_stored() {
        let service = service();
        let report = service
            .upload(
                br#"[{"Age": "25", "Email": "a@x.io"}, {"Age": "abc", "Email": ""}]"#,
                "people.json",
                None,
            )
            .unwrap();

        assert_eq!(report.file_type, SourceKind::Json);
        assert_eq!(report.sheet_names, vec!["JSON"]);
        assert_eq!(report.sheet_count, 1);
        assert_eq!(report.errors, vec!["Row 2: Age must be a number"]);
        assert_eq!(report.detailed_errors[0].row_number, 2);
        assert_eq!(service.stored_file_count(), 1);

        let file_id = report.file_id.unwrap();
        let info = service.highlight_info(&file_id).unwrap();
        assert!(!info.available);
        assert_eq!(info.file_name, "people.json");
        assert!(matches!(
            service.annotated_download(&file_id),
            Err(IntakeError::NotSpreadsheet { .. })
        ));
    }

    #[test]
    fn mime_type_decides_when_extension_is_missing() {
        let report = service()
            .upload(br#"{"Email": ["a@x.io"], "Age": [40]}"#, "upload", Some("application/json"))
            .unwrap();
        assert_eq!(report.file_type, SourceKind::Json);
        assert!(!report.has_violations());
    }

    #[test]
    fn malformed_json_is_not_stored() {
        let service = service();
        assert!(matches!(
            service.upload(b"{not json", "bad.json", None),
            Err(IntakeError::Ingest(_))
        ));
        assert_eq!(service.stored_file_count(), 0);
    }

    #[test]
    fn delete_unknown_id_is_not_found() {
        let service = service();
        assert!(matches!(
            service.delete("missing"),
            Err(IntakeError::FileNotFound { .. })
        ));
        assert!(matches!(
            service.highlight_info("missing"),
            Err(IntakeError::FileNotFound { .. })
        ));
    }
}
