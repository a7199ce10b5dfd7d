//! Download file names.

/// Name used when the upload had none.
pub const FALLBACK_HIGHLIGHTED_NAME: &str = "highlighted_file.xlsx";

/// `report.xlsx` becomes `report_highlighted.xlsx`. A name without an
/// extension (or with only a leading dot) gets `.xlsx` appended.
pub fn highlighted_file_name(original: &str) -> String {
    let original = original.trim();
    if original.is_empty() {
        return FALLBACK_HIGHLIGHTED_NAME.to_string();
    }
    match original.rfind('.') {
        Some(dot) if dot > 0 => {
            let (stem, extension) = original.split_at(dot);
            format!("{stem}_highlighted{extension}")
        }
        _ => format!("{original}_highlighted.xlsx"),
    }
}
