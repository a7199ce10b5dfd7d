//! Subcommand bodies, kept free of argument parsing and printing.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use intake_config::{ConfigLocation, IntakeConfig, load_config, locate_config};
use intake_core::IntakeService;
use intake_model::{IntakeReport, ValidationError};
use tracing::{info, info_span, trace};

use crate::logging::redact_value;

/// A loaded rule file and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedRules {
    pub location: ConfigLocation,
    pub config: IntakeConfig,
}

#[derive(Debug, Clone)]
pub struct ValidateOutcome {
    pub file: PathBuf,
    pub rules: ConfigLocation,
    pub report: IntakeReport,
}

#[derive(Debug, Clone)]
pub struct AnnotateOutcome {
    pub file: PathBuf,
    pub output: PathBuf,
    pub report: IntakeReport,
    pub error_count: usize,
}

/// Resolves and reads the rule file: `explicit`, then the environment,
/// then `intake.toml` in the working directory.
pub fn load_rules(explicit: Option<&Path>) -> Result<LoadedRules> {
    let location = locate_config(explicit);
    let config = load_config(&location)
        .with_context(|| format!("load rules from {}", location.path.display()))?;
    Ok(LoadedRules { location, config })
}

/// Builds the service, failing on rules that do not compile.
pub fn build_service(rules: &LoadedRules) -> Result<IntakeService> {
    IntakeService::new(&rules.config)
        .with_context(|| format!("compile rules from {}", rules.location.path.display()))
}

pub fn run_validate(file: &Path, rules: Option<&Path>) -> Result<ValidateOutcome> {
    let span = info_span!("validate", file = %file.display());
    let _guard = span.enter();

    let loaded = load_rules(rules)?;
    let service = build_service(&loaded)?;
    let report = upload(&service, file)?;
    Ok(ValidateOutcome {
        file: file.to_path_buf(),
        rules: loaded.location,
        report,
    })
}

/// Validates `file` and writes the highlighted copy to `output`, or next to
/// the input under the highlighted name.
pub fn run_annotate(
    file: &Path,
    rules: Option<&Path>,
    output: Option<&Path>,
) -> Result<AnnotateOutcome> {
    let span = info_span!("annotate", file = %file.display());
    let _guard = span.enter();

    let loaded = load_rules(rules)?;
    let service = build_service(&loaded)?;
    let _sweeper = service
        .spawn_sweeper()
        .context("start the expiry sweeper")?;
    let report = upload(&service, file)?;
    let Some(file_id) = report.file_id.as_deref() else {
        bail!("upload of {} was not stored", file.display());
    };

    let annotated = service
        .annotated_download(file_id)
        .with_context(|| format!("highlight {}", file.display()))?;
    let output = output.map_or_else(
        || file.with_file_name(&annotated.file_name),
        Path::to_path_buf,
    );
    fs::write(&output, &annotated.content)
        .with_context(|| format!("write {}", output.display()))?;
    service
        .delete(file_id)
        .with_context(|| format!("release stored upload {file_id}"))?;

    info!(
        output = %output.display(),
        error_count = annotated.error_count,
        "highlighted workbook written"
    );
    Ok(AnnotateOutcome {
        file: file.to_path_buf(),
        output,
        report,
        error_count: annotated.error_count,
    })
}

fn upload(service: &IntakeService, file: &Path) -> Result<IntakeReport> {
    let bytes = fs::read(file).with_context(|| format!("read {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let report = service
        .upload(&bytes, &file_name, None)
        .with_context(|| format!("process {}", file.display()))?;

    trace_violations(&report.detailed_errors);
    Ok(report)
}

/// One trace event per violation. Messages can quote the cell, so they are
/// redacted along with the value.
fn trace_violations(errors: &[ValidationError]) {
    for error in errors {
        trace!(
            row = error.row_number,
            column = %error.column_name,
            value = redact_value(error.cell_value.as_deref().unwrap_or_default()),
            message = redact_value(&error.message),
            "violation"
        );
    }
}
