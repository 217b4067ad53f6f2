//! Validation of linkage settings against the input tables they will run
//! over.
//!
//! Settings carry raw SQL conditions and column names typed by hand, so the
//! usual failure mode is a reference to a column that does not exist, or a
//! reference written in the wrong shape for its context. The validator
//! cross-checks every such reference against the columns shared by all
//! input tables and reports what it finds, without executing any SQL.

mod report;
mod sql_columns;
mod values;

pub use report::write_validation_report_json;
pub use sql_columns::{ColumnReference, condition_columns};

use std::collections::BTreeSet;

use polars::prelude::DataFrame;
use tracing::{error, warn};

use linkage_expr::unquote_identifier;
use linkage_model::{IssueSeverity, Settings, ValidationIssue, ValidationReport};

/// One input table: its name plus the cleaned set of column names, and the
/// data itself when value-level checks should run.
#[derive(Debug, Clone)]
pub struct InputTable {
    name: String,
    columns: BTreeSet<String>,
    frame: Option<DataFrame>,
}

impl InputTable {
    /// A table backed by a data frame; enables value-level checks.
    pub fn from_frame(name: impl Into<String>, frame: &DataFrame) -> Self {
        let columns = frame
            .get_column_names()
            .iter()
            .map(|column| unquote_identifier(column.as_str()))
            .collect();
        Self {
            name: name.into(),
            columns,
            frame: Some(frame.clone()),
        }
    }

    /// A schema-only table; value-level checks are skipped for it.
    pub fn from_columns<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            columns: columns
                .into_iter()
                .map(|column| unquote_identifier(column.as_ref()))
                .collect(),
            frame: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &BTreeSet<String> {
        &self.columns
    }

    pub fn frame(&self) -> Option<&DataFrame> {
        self.frame.as_ref()
    }
}

/// Knobs for the value-level checks.
#[derive(Debug, Clone, Copy)]
pub struct ValidationOptions {
    /// Warn when a comparison column is null or blank in more than this
    /// fraction of rows.
    pub completeness_warn_ratio: f64,
    /// Run the checks that read row values (duplicates, completeness).
    pub check_values: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            completeness_warn_ratio: 0.7,
            check_values: true,
        }
    }
}

/// Cross-checks a settings object against a set of input tables.
pub struct SettingsValidator<'a> {
    settings: &'a Settings,
    tables: &'a [InputTable],
    options: ValidationOptions,
    shared_columns: BTreeSet<String>,
}

impl<'a> SettingsValidator<'a> {
    pub fn new(settings: &'a Settings, tables: &'a [InputTable]) -> Self {
        let shared_columns = shared_input_columns(tables);
        Self {
            settings,
            tables,
            options: ValidationOptions::default(),
            shared_columns,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    /// The set intersection of cleaned column names across every input
    /// table. A column has to exist everywhere to be usable in a rule.
    pub fn shared_input_columns(&self) -> &BTreeSet<String> {
        &self.shared_columns
    }

    /// Run every check and collect the findings.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        report.extend(self.check_unique_id_column());
        report.extend(self.check_columns_to_retain());
        report.extend(self.check_comparison_levels());
        report.extend(self.check_blocking_rules());
        if self.options.check_values {
            report.extend(self.check_values());
        }
        report
    }

    fn column_exists(&self, column: &str) -> bool {
        self.shared_columns.contains(column)
    }

    /// The unique-id column must be present in every input table.
    fn check_unique_id_column(&self) -> Vec<ValidationIssue> {
        let id_column = unquote_identifier(&self.settings.unique_id_column_name);
        self.tables
            .iter()
            .filter(|table| !table.columns().contains(&id_column))
            .map(|table| ValidationIssue {
                code: "MISSING_COLUMN".to_string(),
                message: format!(
                    "Setting `unique_id_column_name` references `{id_column}`, which is \
                     missing from input table `{}`",
                    table.name()
                ),
                severity: IssueSeverity::Error,
                column: Some(id_column.clone()),
                table: Some(table.name().to_string()),
                count: None,
                category: Some("Settings".to_string()),
            })
            .collect()
    }

    fn check_columns_to_retain(&self) -> Vec<ValidationIssue> {
        self.settings
            .additional_columns_to_retain
            .iter()
            .map(|column| unquote_identifier(column))
            .filter(|column| !self.column_exists(column))
            .map(|column| ValidationIssue {
                code: "MISSING_COLUMN".to_string(),
                message: format!(
                    "Setting `additional_columns_to_retain` references `{column}`, which is \
                     missing from one or more of your input dataframe(s)"
                ),
                severity: IssueSeverity::Error,
                column: Some(column),
                table: None,
                count: None,
                category: Some("Settings".to_string()),
            })
            .collect()
    }

    /// Column checks over every comparison level's SQL condition.
    ///
    /// The `ELSE` catch-all is not an expression and is skipped by
    /// construction; any other condition that fails to parse is itself
    /// reported, since a typo in a rule would otherwise pass silently.
    fn check_comparison_levels(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for comparison in &self.settings.comparisons {
            for level in &comparison.comparison_levels {
                if level.is_else_level() {
                    continue;
                }
                let context = format!(
                    "comparison '{}' level '{}'",
                    comparison.output_column_name, level.label_for_charts
                );
                let Some(columns) = condition_columns(&level.sql_condition) else {
                    issues.push(unparseable_issue(
                        &context,
                        &level.sql_condition,
                        "Comparisons",
                    ));
                    continue;
                };
                for reference in &columns {
                    issues.extend(self.missing_column_issue(reference, &context, "Comparisons"));
                    if reference.table.is_none() && !reference.has_pair_suffix() {
                        issues.push(ValidationIssue {
                            code: "INVALID_COLUMN_SUFFIX".to_string(),
                            message: format!(
                                "Column reference `{}` in {context} has an invalid table \
                                 suffix (only `_l` and `_r` are valid)",
                                reference.written()
                            ),
                            severity: IssueSeverity::Warning,
                            column: Some(reference.base_name().to_string()),
                            table: None,
                            count: None,
                            category: Some("Comparisons".to_string()),
                        });
                    }
                }
            }
        }
        issues
    }

    /// Column and table-prefix checks over every blocking rule.
    fn check_blocking_rules(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for rule in &self.settings.blocking_rules_to_generate_predictions {
            let context = format!("blocking rule `{rule}`");
            let Some(columns) = condition_columns(rule) else {
                issues.push(unparseable_issue(&context, rule, "Blocking Rules"));
                continue;
            };
            for reference in &columns {
                if !reference.has_valid_table_prefix() {
                    issues.push(ValidationIssue {
                        code: "INVALID_TABLE_PREFIX".to_string(),
                        message: format!(
                            "Column reference `{}` in {context} contains an invalid table \
                             prefix (only `l.` and `r.` are valid)",
                            reference.written()
                        ),
                        severity: IssueSeverity::Error,
                        column: Some(reference.base_name().to_string()),
                        table: None,
                        count: None,
                        category: Some("Blocking Rules".to_string()),
                    });
                }
                issues.extend(self.missing_column_issue(reference, &context, "Blocking Rules"));
            }
        }
        issues
    }

    fn missing_column_issue(
        &self,
        reference: &ColumnReference,
        context: &str,
        category: &str,
    ) -> Option<ValidationIssue> {
        let base = reference.base_name();
        if self.column_exists(base) {
            return None;
        }
        Some(ValidationIssue {
            code: "MISSING_COLUMN".to_string(),
            message: format!(
                "Column `{base}` referenced in {context} is missing from one or more of \
                 your input dataframe(s)"
            ),
            severity: IssueSeverity::Error,
            column: Some(base.to_string()),
            table: None,
            count: None,
            category: Some(category.to_string()),
        })
    }

    /// Value-level checks: duplicate ids per table, and completeness of the
    /// columns the comparisons actually read.
    fn check_values(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let id_column = unquote_identifier(&self.settings.unique_id_column_name);
        for table in self.tables {
            issues.extend(values::duplicate_unique_id_issue(table, &id_column));
        }
        for column in self.comparison_columns() {
            for table in self.tables {
                if !table.columns().contains(&column) {
                    continue;
                }
                issues.extend(values::low_completeness_issue(
                    table,
                    &column,
                    self.options.completeness_warn_ratio,
                ));
            }
        }
        issues
    }

    /// Every existing input column referenced by some comparison level.
    fn comparison_columns(&self) -> BTreeSet<String> {
        let mut columns = BTreeSet::new();
        for comparison in &self.settings.comparisons {
            for level in &comparison.comparison_levels {
                let Some(references) = condition_columns(&level.sql_condition) else {
                    continue;
                };
                for reference in references {
                    let base = reference.base_name().to_string();
                    if self.column_exists(&base) {
                        columns.insert(base);
                    }
                }
            }
        }
        columns
    }
}

fn shared_input_columns(tables: &[InputTable]) -> BTreeSet<String> {
    let mut iter = tables.iter();
    let Some(first) = iter.next() else {
        return BTreeSet::new();
    };
    iter.fold(first.columns().clone(), |shared, table| {
        shared.intersection(table.columns()).cloned().collect()
    })
}

fn unparseable_issue(context: &str, sql: &str, category: &str) -> ValidationIssue {
    ValidationIssue {
        code: "UNPARSEABLE_SQL".to_string(),
        message: format!("The SQL condition in {context} could not be parsed: {sql}"),
        severity: IssueSeverity::Warning,
        column: None,
        table: None,
        count: None,
        category: Some(category.to_string()),
    }
}

/// Validate a settings object against a set of input tables.
pub fn validate_settings(
    settings: &Settings,
    tables: &[InputTable],
    options: ValidationOptions,
) -> ValidationReport {
    SettingsValidator::new(settings, tables)
        .with_options(options)
        .validate()
}

/// Emit every finding through tracing, with the closing advisory when
/// anything at all was flagged.
pub fn log_report(report: &ValidationReport) {
    for issue in &report.issues {
        match issue.severity {
            IssueSeverity::Error => error!(
                code = %issue.code,
                column = issue.column.as_deref(),
                table = issue.table.as_deref(),
                "{}",
                issue.message
            ),
            IssueSeverity::Warning => warn!(
                code = %issue.code,
                column = issue.column.as_deref(),
                table = issue.table.as_deref(),
                "{}",
                issue.message
            ),
        }
    }
    if !report.is_empty() {
        warn!(
            "You may want to verify your settings dictionary has valid inputs in all fields \
             before continuing."
        );
    }
}
