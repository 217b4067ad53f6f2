//! Terminal summaries for validation findings and rendered settings.

use std::cmp::Ordering;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use linkage_model::{IssueSeverity, ValidationReport};

/// Per-run counts and artifacts shown after `check`.
pub struct CheckSummary {
    pub settings_fingerprint: String,
    pub sql_dialect: String,
    pub table_names: Vec<String>,
    pub report: ValidationReport,
    pub report_path: Option<std::path::PathBuf>,
}

pub fn print_check_summary(summary: &CheckSummary) {
    println!("Settings fingerprint: {}", summary.settings_fingerprint);
    println!("SQL dialect: {}", summary.sql_dialect);
    println!("Input tables: {}", summary.table_names.join(", "));
    if let Some(path) = &summary.report_path {
        println!("Validation report: {}", path.display());
    }
    if summary.report.is_empty() {
        println!("No issues found.");
        return;
    }
    print_issue_table(&summary.report);
    println!(
        "{} error(s), {} warning(s)",
        summary.report.error_count(),
        summary.report.warning_count()
    );
}

pub fn print_issue_table(report: &ValidationReport) {
    let mut issues: Vec<_> = report.issues.iter().collect();
    issues.sort_by(|a, b| {
        let severity = severity_rank(b.severity).cmp(&severity_rank(a.severity));
        if severity != Ordering::Equal {
            return severity;
        }
        let code = a.code.cmp(&b.code);
        if code != Ordering::Equal {
            return code;
        }
        a.column.cmp(&b.column)
    });
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Code"),
        header_cell("Category"),
        header_cell("Column"),
        header_cell("Table"),
        header_cell("Count"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    align_column(&mut table, 5, CellAlignment::Right);
    for issue in issues {
        table.add_row(vec![
            severity_cell(issue.severity),
            Cell::new(issue.code.clone()),
            Cell::new(issue.category.clone().unwrap_or_else(|| "-".to_string())),
            Cell::new(issue.column.clone().unwrap_or_else(|| "-".to_string())),
            Cell::new(issue.table.clone().unwrap_or_else(|| "-".to_string())),
            count_cell(issue.count, issue.severity),
            Cell::new(issue.message.clone()),
        ]);
    }
    println!();
    println!("Issues:");
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    if table.column_count() >= 7 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(10)),
            ColumnConstraint::UpperBoundary(Width::Fixed(22)),
            ColumnConstraint::UpperBoundary(Width::Fixed(16)),
            ColumnConstraint::UpperBoundary(Width::Fixed(16)),
            ColumnConstraint::UpperBoundary(Width::Fixed(14)),
            ColumnConstraint::LowerBoundary(Width::Fixed(5)),
            ColumnConstraint::UpperBoundary(Width::Percentage(50)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn severity_cell(severity: IssueSeverity) -> Cell {
    match severity {
        IssueSeverity::Error => Cell::new("ERROR").fg(Color::Red),
        IssueSeverity::Warning => Cell::new("WARN").fg(Color::Yellow),
    }
}

fn count_cell(count: Option<u64>, severity: IssueSeverity) -> Cell {
    match count {
        Some(value) => Cell::new(value).fg(severity_color(severity)),
        None => dim_cell("-"),
    }
}

fn severity_rank(severity: IssueSeverity) -> u8 {
    match severity {
        IssueSeverity::Error => 2,
        IssueSeverity::Warning => 1,
    }
}

fn severity_color(severity: IssueSeverity) -> Color {
    match severity {
        IssueSeverity::Error => Color::Red,
        IssueSeverity::Warning => Color::Yellow,
    }
}
