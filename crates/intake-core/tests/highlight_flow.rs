use intake_config::IntakeConfig;
use intake_core::{IntakeError, IntakeService};
use intake_ingest::read_workbook;
use intake_model::{
    ColumnValidationRule, Rgb, RuleType, SourceKind, ValidationConfig,
};
use rust_xlsxwriter::{Format, Workbook};

fn config() -> IntakeConfig {
    IntakeConfig {
        rules: ValidationConfig::new()
            .with_rule(
                "Age",
                ColumnValidationRule::new(RuleType::Number)
                    .required()
                    .with_min(0.0)
                    .with_max(130.0),
            )
            .with_rule(
                "Joining_Date",
                ColumnValidationRule::new(RuleType::Date).with_format("dd/MM/yyyy"),
            )
            .with_rule("Rate", ColumnValidationRule::new(RuleType::Percent))
            .with_required_column("Age")
            .with_required_column("Email"),
        ..IntakeConfig::default()
    }
}

fn upload_bytes() -> Vec<u8> {
    let mut book = Workbook::new();
    let notes = book.add_worksheet();
    notes.set_name("Notes").unwrap();
    notes.write_string(0, 0, "read me").unwrap();

    let data = book.add_worksheet();
    data.set_name("Data").unwrap();
    let bold = Format::new().set_bold();
    for (column, header) in ["Name", "Age", "joining date", "Rate"].into_iter().enumerate() {
        data.write_string_with_format(0, column as u16, header, &bold)
            .unwrap();
    }
    data.write_string(1, 0, "Ann").unwrap();
    data.write_number(1, 1, 25.0).unwrap();
    data.write_string(1, 2, "31/01/2024").unwrap();
    data.write_string(1, 3, "12.50%").unwrap();

    data.write_string(2, 0, "Bob").unwrap();
    data.write_string(2, 1, "abc").unwrap();
    data.write_string(2, 2, "2024-01-31").unwrap();
    data.write_string(2, 3, "12.5").unwrap();

    data.write_string(3, 0, "Cy").unwrap();
    data.write_number(3, 1, 150.0).unwrap();
    book.save_to_buffer().unwrap()
}

#[test]
fn upload_reports_every_violation() {
    let service = IntakeService::new(&config()).unwrap();
    let report = service.upload(&upload_bytes(), "staff.xlsx", None).unwrap();

    assert_eq!(report.file_type, SourceKind::Xlsx);
    assert_eq!(report.sheet_names, vec!["Notes", "Data"]);
    assert_eq!(report.sheet_data.row_count(), 3);
    insta::assert_debug_snapshot!(report.errors, @r#"
    [
        "Missing required column: Email",
        "Row 3: Age must be a number",
        "Row 4: Age must be <= 130.0",
        "Row 3: joining date must match date format dd/MM/yyyy (current value: '2024-01-31')",
        "Row 3: Rate must be a percentage string ending with % (e.g. 12.00%)",
    ]
    "#);
    assert_eq!(service.stored_file_count(), 1);
}

#[test]
fn highlighted_download_marks_failing_cells() {
    let service = IntakeService::new(&config()).unwrap();
    let report = service.upload(&upload_bytes(), "staff.xlsx", None).unwrap();
    let file_id = report.file_id.unwrap();

    let info = service.highlight_info(&file_id).unwrap();
    assert!(info.available);
    assert_eq!(info.file_name, "staff_highlighted.xlsx");

    let annotated = service.annotated_download(&file_id).unwrap();
    assert_eq!(annotated.file_name, "staff_highlighted.xlsx");
    assert_eq!(annotated.error_count, 5);

    let workbook = read_workbook(&annotated.content).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Notes", "Data"]);
    let data = workbook.sheet(1).unwrap();

    assert_eq!(data.cell(2, 1).unwrap().style.fill, Some(Rgb::RED));
    assert_eq!(data.cell(3, 1).unwrap().style.fill, Some(Rgb::RED));
    assert_eq!(data.cell(2, 2).unwrap().style.fill, Some(Rgb::RED));
    assert_eq!(data.cell(1, 1).unwrap().style.fill, None);
    assert!(data.cell(0, 1).unwrap().style.font.bold);
    assert_eq!(data.cell_text(2, 1), "abc");

    // The stored upload is untouched and can be highlighted again.
    assert!(service.annotated_download(&file_id).is_ok());
}

#[test]
fn deleted_upload_can_no_longer_be_highlighted() {
    let service = IntakeService::new(&config()).unwrap();
    let file_id = service
        .upload(&upload_bytes(), "staff.xlsx", None)
        .unwrap()
        .file_id
        .unwrap();

    service.delete(&file_id).unwrap();
    assert_eq!(service.stored_file_count(), 0);
    assert!(matches!(
        service.annotated_download(&file_id),
        Err(IntakeError::FileNotFound { .. })
    ));
    assert!(matches!(
        service.delete(&file_id),
        Err(IntakeError::FileNotFound { .. })
    ));
}
