//! Value-level checks against the actual input data.
//!
//! These run on top of the schema checks: they need the data frames, not
//! just the column names, and can be switched off for a cheap schema-only
//! pass.

use std::collections::BTreeMap;

use polars::prelude::{AnyValue, DataFrame};

use linkage_model::{IssueSeverity, ValidationIssue};

use crate::InputTable;

/// Duplicate values in the unique-id column of one table.
///
/// Blank and null ids are ignored here; they surface through the
/// completeness check instead.
pub fn duplicate_unique_id_issue(table: &InputTable, id_column: &str) -> Option<ValidationIssue> {
    let frame = table.frame()?;
    let column = lookup_column(frame, id_column)?;
    let series = frame.column(&column).ok()?;

    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for idx in 0..frame.height() {
        let value = any_to_string(series.get(idx).unwrap_or(AnyValue::Null));
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        *counts.entry(trimmed.to_string()).or_insert(0) += 1;
    }

    let duplicates: u64 = counts
        .values()
        .filter(|&&count| count > 1)
        .map(|&count| count - 1)
        .sum();
    if duplicates == 0 {
        return None;
    }
    Some(ValidationIssue {
        code: "DUPLICATE_UNIQUE_ID".to_string(),
        message: format!(
            "Unique id column `{id_column}` has {duplicates} duplicated value(s) in input \
             table `{}`; record links cannot be reported against ambiguous ids",
            table.name()
        ),
        severity: IssueSeverity::Error,
        column: Some(id_column.to_string()),
        table: Some(table.name().to_string()),
        count: Some(duplicates),
        category: Some("Uniqueness".to_string()),
    })
}

/// Mostly-missing comparison columns: above `warn_ratio` null or blank.
///
/// A comparison over a near-empty column contributes nothing but null
/// levels, which usually means the wrong column was configured.
pub fn low_completeness_issue(
    table: &InputTable,
    column_name: &str,
    warn_ratio: f64,
) -> Option<ValidationIssue> {
    let frame = table.frame()?;
    let column = lookup_column(frame, column_name)?;
    let series = frame.column(&column).ok()?;
    if frame.height() == 0 {
        return None;
    }

    let mut missing = 0u64;
    for idx in 0..frame.height() {
        let value = any_to_string(series.get(idx).unwrap_or(AnyValue::Null));
        if value.trim().is_empty() {
            missing += 1;
        }
    }
    let ratio = missing as f64 / frame.height() as f64;
    if ratio <= warn_ratio {
        return None;
    }
    Some(ValidationIssue {
        code: "LOW_COMPLETENESS".to_string(),
        message: format!(
            "Comparison column `{column_name}` is {:.0}% null or blank in input table `{}`; \
             most record pairs will fall into the null level",
            ratio * 100.0,
            table.name()
        ),
        severity: IssueSeverity::Warning,
        column: Some(column_name.to_string()),
        table: Some(table.name().to_string()),
        count: Some(missing),
        category: Some("Completeness".to_string()),
    })
}

/// Resolve a cleaned column name against the frame's headers, exact first
/// and then case-insensitively.
fn lookup_column(frame: &DataFrame, name: &str) -> Option<String> {
    let headers = frame.get_column_names();
    if let Some(header) = headers.iter().find(|header| header.as_str() == name) {
        return Some(header.to_string());
    }
    headers
        .iter()
        .find(|header| header.as_str().eq_ignore_ascii_case(name))
        .map(|header| header.to_string())
}

fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::df;

    fn table(frame: DataFrame) -> InputTable {
        InputTable::from_frame("customers", &frame)
    }

    #[test]
    fn duplicated_ids_are_counted() {
        let frame = df! {
            "unique_id" => ["1", "2", "2", "3", "3", "3"],
            "email" => ["a", "b", "c", "d", "e", "f"],
        }
        .expect("frame");
        let issue = duplicate_unique_id_issue(&table(frame), "unique_id").expect("issue");
        assert_eq!(issue.code, "DUPLICATE_UNIQUE_ID");
        assert_eq!(issue.count, Some(3));
        assert_eq!(issue.table.as_deref(), Some("customers"));
    }

    #[test]
    fn distinct_ids_pass() {
        let frame = df! {
            "unique_id" => ["1", "2", "3"],
        }
        .expect("frame");
        assert!(duplicate_unique_id_issue(&table(frame), "unique_id").is_none());
    }

    #[test]
    fn blank_ids_do_not_count_as_duplicates() {
        let frame = df! {
            "unique_id" => ["", "", "1"],
        }
        .expect("frame");
        assert!(duplicate_unique_id_issue(&table(frame), "unique_id").is_none());
    }

    #[test]
    fn mostly_blank_columns_warn() {
        let frame = df! {
            "email" => ["a@b.c", "", "", ""],
        }
        .expect("frame");
        let issue = low_completeness_issue(&table(frame), "email", 0.7).expect("issue");
        assert_eq!(issue.code, "LOW_COMPLETENESS");
        assert_eq!(issue.count, Some(3));
    }

    #[test]
    fn completeness_respects_the_threshold() {
        let frame = df! {
            "email" => ["a@b.c", "", "", ""],
        }
        .expect("frame");
        assert!(low_completeness_issue(&table(frame), "email", 0.8).is_none());
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let frame = df! {
            "Email" => ["", "", ""],
        }
        .expect("frame");
        let issue = low_completeness_issue(&table(frame), "email", 0.5).expect("issue");
        assert_eq!(issue.column.as_deref(), Some("email"));
    }

    #[test]
    fn schema_only_tables_are_skipped() {
        let schema_only = InputTable::from_columns("customers", ["unique_id", "email"]);
        assert!(duplicate_unique_id_issue(&schema_only, "unique_id").is_none());
        assert!(low_completeness_issue(&schema_only, "email", 0.7).is_none());
    }
}
