//! End-to-end validation: settings built through the comparison API, checked
//! against realistic input tables.

use polars::prelude::df;

use linkage_compare::{block_on, email_comparison, postcode_comparison};
use linkage_model::{Comparison, ComparisonLevel, IssueSeverity, Settings, SqlDialect};
use linkage_validate::{
    InputTable, SettingsValidator, ValidationOptions, validate_settings,
    write_validation_report_json,
};

fn built_settings() -> Settings {
    let dialect = SqlDialect::DuckDb;
    Settings {
        comparisons: vec![
            email_comparison("email").render(dialect).unwrap(),
            postcode_comparison("postcode").render(dialect).unwrap(),
        ],
        blocking_rules_to_generate_predictions: vec![
            block_on(&["surname", "dob"]).render(dialect).unwrap(),
        ],
        ..Settings::default()
    }
}

fn matching_tables() -> Vec<InputTable> {
    vec![
        InputTable::from_columns(
            "customers",
            ["unique_id", "email", "postcode", "surname", "dob"],
        ),
        InputTable::from_columns(
            "prospects",
            ["unique_id", "email", "postcode", "surname", "dob"],
        ),
    ]
}

fn custom_comparison(name: &str, condition: &str) -> Comparison {
    Comparison {
        output_column_name: name.to_string(),
        comparison_description: None,
        comparison_levels: vec![
            ComparisonLevel {
                sql_condition: condition.to_string(),
                label_for_charts: "Custom".to_string(),
                is_null_level: false,
                tf_adjustment_column: None,
                m_probability: None,
                u_probability: None,
            },
            ComparisonLevel {
                sql_condition: "ELSE".to_string(),
                label_for_charts: "All other comparisons".to_string(),
                is_null_level: false,
                tf_adjustment_column: None,
                m_probability: None,
                u_probability: None,
            },
        ],
    }
}

#[test]
fn well_formed_settings_pass_cleanly() {
    let report = validate_settings(
        &built_settings(),
        &matching_tables(),
        ValidationOptions::default(),
    );
    assert!(report.is_empty(), "unexpected issues: {:?}", report.issues);
}

#[test]
fn columns_missing_from_one_table_are_errors() {
    let settings = built_settings();
    let tables = vec![
        InputTable::from_columns(
            "customers",
            ["unique_id", "email", "postcode", "surname", "dob"],
        ),
        // No postcode here, so postcode drops out of the shared set.
        InputTable::from_columns("prospects", ["unique_id", "email", "surname", "dob"]),
    ];
    let report = validate_settings(&settings, &tables, ValidationOptions::default());
    assert!(report.has_errors());
    assert!(
        report
            .issues
            .iter()
            .all(|issue| issue.code == "MISSING_COLUMN"
                && issue.column.as_deref() == Some("postcode"))
    );
}

#[test]
fn bad_blocking_rule_prefix_is_an_error() {
    let mut settings = built_settings();
    settings
        .blocking_rules_to_generate_predictions
        .push("lt.\"surname\" = r.\"surname\"".to_string());
    let report = validate_settings(&settings, &matching_tables(), ValidationOptions::default());
    let issue = report
        .issues
        .iter()
        .find(|issue| issue.code == "INVALID_TABLE_PREFIX")
        .expect("prefix issue");
    assert!(issue.message.contains("only `l.` and `r.` are valid"));
}

#[test]
fn unqualified_blocking_rule_reference_is_an_error() {
    let mut settings = built_settings();
    settings
        .blocking_rules_to_generate_predictions
        .push("\"surname\" = r.\"surname\"".to_string());
    let report = validate_settings(&settings, &matching_tables(), ValidationOptions::default());
    let issue = report
        .issues
        .iter()
        .find(|issue| issue.code == "INVALID_TABLE_PREFIX")
        .expect("prefix issue");
    assert_eq!(issue.severity, IssueSeverity::Error);
    assert_eq!(issue.column.as_deref(), Some("surname"));
}

#[test]
fn level_reference_without_pair_suffix_warns() {
    let mut settings = built_settings();
    settings
        .comparisons
        .push(custom_comparison("email", "\"email\" = \"email_r\""));
    let report = validate_settings(&settings, &matching_tables(), ValidationOptions::default());
    let issue = report
        .issues
        .iter()
        .find(|issue| issue.code == "INVALID_COLUMN_SUFFIX")
        .expect("suffix issue");
    assert_eq!(issue.column.as_deref(), Some("email"));
    assert_eq!(report.error_count(), 0);
}

#[test]
fn prefixed_reference_inside_a_level_still_resolves() {
    let mut settings = built_settings();
    settings
        .comparisons
        .push(custom_comparison("email", "l.\"email\" = r.\"email\""));
    let report = validate_settings(&settings, &matching_tables(), ValidationOptions::default());
    assert!(!report.issues.iter().any(|i| i.code == "MISSING_COLUMN"));
}

#[test]
fn unparseable_level_sql_warns_but_else_stays_silent() {
    let mut settings = built_settings();
    settings
        .comparisons
        .push(custom_comparison("email", "=== not a condition ==="));
    let report = validate_settings(&settings, &matching_tables(), ValidationOptions::default());
    let unparseable: Vec<_> = report
        .issues
        .iter()
        .filter(|issue| issue.code == "UNPARSEABLE_SQL")
        .collect();
    assert_eq!(unparseable.len(), 1, "ELSE levels should not be reported");
}

#[test]
fn value_checks_flag_duplicates_and_low_completeness() {
    let frame = df! {
        "unique_id" => ["1", "1", "2", "3"],
        "email" => ["a@b.c", "", "", ""],
        "postcode" => ["SW1A 1AA", "SW1A 1AA", "EC1A 1BB", "N1 9GU"],
        "surname" => ["smith", "smith", "jones", "taylor"],
        "dob" => ["1990-01-01", "1990-01-01", "1985-06-15", "2000-12-31"],
    }
    .expect("frame");
    let tables = vec![InputTable::from_frame("customers", &frame)];
    let report = validate_settings(&built_settings(), &tables, ValidationOptions::default());

    let duplicate = report
        .issues
        .iter()
        .find(|issue| issue.code == "DUPLICATE_UNIQUE_ID")
        .expect("duplicate id issue");
    assert_eq!(duplicate.count, Some(1));

    let completeness = report
        .issues
        .iter()
        .find(|issue| issue.code == "LOW_COMPLETENESS")
        .expect("completeness issue");
    assert_eq!(completeness.column.as_deref(), Some("email"));
}

#[test]
fn value_checks_can_be_disabled() {
    let frame = df! {
        "unique_id" => ["1", "1"],
        "email" => ["a@b.c", "a@b.c"],
        "postcode" => ["SW1A 1AA", "SW1A 1AA"],
        "surname" => ["smith", "smith"],
        "dob" => ["1990-01-01", "1990-01-01"],
    }
    .expect("frame");
    let tables = vec![InputTable::from_frame("customers", &frame)];
    let options = ValidationOptions {
        check_values: false,
        ..ValidationOptions::default()
    };
    let report = validate_settings(&built_settings(), &tables, options);
    assert!(report.is_empty());
}

#[test]
fn report_file_lands_in_the_output_directory() {
    let settings = built_settings();
    let report = SettingsValidator::new(&settings, &matching_tables()).validate();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_validation_report_json(dir.path(), &settings, &report).expect("write");
    assert_eq!(path.file_name().unwrap(), "validation_report.json");
    assert!(path.exists());
}
