pub mod dialect;
pub mod error;
pub mod issue;
pub mod settings;

pub use dialect::SqlDialect;
pub use error::{LinkageError, Result};
pub use issue::{IssueSeverity, ValidationIssue, ValidationReport};
pub use settings::{Comparison, ComparisonLevel, LinkType, Settings};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_report_counts() {
        let report = ValidationReport {
            issues: vec![
                ValidationIssue {
                    code: "MISSING_COLUMN".to_string(),
                    message: "column `postcode` not found".to_string(),
                    severity: IssueSeverity::Error,
                    column: Some("postcode".to_string()),
                    table: Some("customers".to_string()),
                    count: None,
                    category: Some("Settings".to_string()),
                },
                ValidationIssue {
                    code: "LOW_COMPLETENESS".to_string(),
                    message: "column `email` is mostly blank".to_string(),
                    severity: IssueSeverity::Warning,
                    column: Some("email".to_string()),
                    table: Some("customers".to_string()),
                    count: Some(970),
                    category: Some("Completeness".to_string()),
                },
            ],
        };
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 1);
        assert!(report.has_errors());
    }

    #[test]
    fn settings_round_trip() {
        let json = r#"{
            "link_type": "dedupe_only",
            "unique_id_column_name": "unique_id",
            "sql_dialect": "duckdb",
            "comparisons": [
                {
                    "output_column_name": "email",
                    "comparison_levels": [
                        {
                            "sql_condition": "\"email_l\" IS NULL OR \"email_r\" IS NULL",
                            "label_for_charts": "Null",
                            "is_null_level": true
                        },
                        {
                            "sql_condition": "\"email_l\" = \"email_r\"",
                            "label_for_charts": "Exact match"
                        },
                        {
                            "sql_condition": "ELSE",
                            "label_for_charts": "All other comparisons"
                        }
                    ]
                }
            ],
            "blocking_rules_to_generate_predictions": ["l.\"surname\" = r.\"surname\""]
        }"#;
        let settings = Settings::from_json_str(json).expect("parse settings");
        assert_eq!(settings.link_type, LinkType::DedupeOnly);
        assert_eq!(settings.sql_dialect, SqlDialect::DuckDb);
        assert_eq!(settings.comparisons.len(), 1);
        assert!(settings.retain_matching_columns, "default applies");

        let round = Settings::from_json_str(&settings.to_json_pretty().expect("serialize"))
            .expect("reparse");
        assert_eq!(round.comparisons[0].comparison_levels.len(), 3);
        assert!(round.comparisons[0].comparison_levels[2].is_else_level());
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let a = Settings::default();
        let b = Settings::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 12);

        let mut c = Settings::default();
        c.unique_id_column_name = "person_id".to_string();
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
