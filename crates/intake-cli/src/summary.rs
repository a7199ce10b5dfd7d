use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use intake_cli::commands::{AnnotateOutcome, LoadedRules, ValidateOutcome};
use intake_model::{ColumnValidationRule, IntakeReport, ValidationError};

pub fn print_validation(outcome: &ValidateOutcome) {
    println!("File: {}", outcome.file.display());
    println!("Rules: {}", outcome.rules.path.display());
    print_report(&outcome.report);
}

pub fn print_annotation(outcome: &AnnotateOutcome) {
    println!("File: {}", outcome.file.display());
    print_report(&outcome.report);
    println!();
    println!(
        "Highlighted workbook: {} ({} error{})",
        outcome.output.display(),
        outcome.error_count,
        if outcome.error_count == 1 { "" } else { "s" }
    );
}

fn print_report(report: &IntakeReport) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Type"),
        header_cell("Sheets"),
        header_cell("Columns"),
        header_cell("Rows"),
        header_cell("Errors"),
    ]);
    apply_table_style(&mut table);
    for index in 2..5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new(report.file_type)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        Cell::new(report.sheet_names.join(", ")),
        Cell::new(report.sheet_data.len()),
        Cell::new(report.sheet_data.row_count()),
        count_cell(report.error_count()),
    ]);
    println!("{table}");

    if report.has_violations() {
        print_error_table(&report.detailed_errors);
    } else {
        println!("No validation errors.");
    }
}

fn print_error_table(errors: &[ValidationError]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Column"),
        header_cell("Value"),
        header_cell("Message"),
    ]);
    apply_error_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for error in errors {
        let row = if error.row_number == 0 {
            dim_cell("-")
        } else {
            Cell::new(error.row_number)
        };
        let value = match error.cell_value.as_deref() {
            Some("") => dim_cell("(blank)"),
            Some(value) => Cell::new(value),
            None => dim_cell("-"),
        };
        table.add_row(vec![
            row,
            Cell::new(&error.column_name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            value,
            Cell::new(&error.message).fg(Color::Red),
        ]);
    }
    println!();
    println!("Errors:");
    println!("{table}");
}

pub fn print_rules(rules: &LoadedRules) {
    println!("Rules: {}", rules.location.path.display());
    let validation = &rules.config.rules;

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Required"),
        header_cell("Min"),
        header_cell("Max"),
        header_cell("Format / Regex"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for (column, rule) in &validation.validations {
        table.add_row(vec![
            Cell::new(column)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            rule.rule_type.map_or_else(|| dim_cell("-"), Cell::new),
            if rule.required {
                Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold)
            } else {
                dim_cell("-")
            },
            bound_cell(rule.min),
            bound_cell(rule.max),
            pattern_cell(rule),
        ]);
    }
    println!("{table}");

    if validation.required_columns.is_empty() {
        println!("Required columns: none");
    } else {
        println!("Required columns: {}", validation.required_columns.join(", "));
    }
}

fn bound_cell(bound: Option<f64>) -> Cell {
    bound.map_or_else(|| dim_cell("-"), Cell::new)
}

fn pattern_cell(rule: &ColumnValidationRule) -> Cell {
    match (rule.format.as_deref(), rule.regex.as_deref()) {
        (Some(format), _) if !format.trim().is_empty() => Cell::new(format),
        (_, Some(regex)) if !regex.trim().is_empty() => Cell::new(format!("/{regex}/")),
        _ => dim_cell("-"),
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).fg(Color::Red).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_error_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(5)),
        ColumnConstraint::UpperBoundary(Width::Fixed(24)),
        ColumnConstraint::UpperBoundary(Width::Percentage(25)),
        ColumnConstraint::UpperBoundary(Width::Percentage(55)),
    ]);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
