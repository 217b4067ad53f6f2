//! End-to-end tests: building comparisons through the public API, rendering
//! them for dialects, and describing whole settings objects.

use linkage_compare::{
    ComparisonBuilder, block_on, else_level, email_comparison, evaluate_pair, exact_match_level,
    jaro_winkler_at_thresholds, null_level, postcode_comparison, settings_description,
};
use linkage_expr::ColumnExpression;
use linkage_model::{Settings, SqlDialect};

fn demo_settings() -> Settings {
    let dialect = SqlDialect::DuckDb;
    let comparisons = vec![
        email_comparison("email").render(dialect).unwrap(),
        postcode_comparison("postcode").render(dialect).unwrap(),
    ];
    let blocking = vec![block_on(&["surname", "dob"]).render(dialect).unwrap()];
    Settings {
        comparisons,
        blocking_rules_to_generate_predictions: blocking,
        ..Settings::default()
    }
}

#[test]
fn email_comparison_generates_the_documented_sql() {
    let comparison = email_comparison("email").render(SqlDialect::DuckDb).unwrap();
    let conditions: Vec<&str> = comparison
        .comparison_levels
        .iter()
        .map(|level| level.sql_condition.as_str())
        .collect();
    assert_eq!(
        conditions,
        [
            "\"email_l\" IS NULL OR \"email_r\" IS NULL",
            "\"email_l\" = \"email_r\"",
            "regexp_extract(\"email_l\", '^[^@]+', 0) = regexp_extract(\"email_r\", '^[^@]+', 0)",
            "jaro_winkler_similarity(regexp_extract(\"email_l\", '^[^@]+', 0), \
             regexp_extract(\"email_r\", '^[^@]+', 0)) >= 0.88",
            "ELSE",
        ]
    );
}

#[test]
fn rendered_settings_survive_a_json_round_trip() {
    let settings = demo_settings();
    let json = settings.to_json_pretty().unwrap();
    let parsed = Settings::from_json_str(&json).unwrap();

    assert_eq!(parsed.comparisons.len(), 2);
    let email = parsed.comparison("email").unwrap();
    assert!(email.comparison_levels[0].is_null_level);
    assert!(email.comparison_levels.last().unwrap().is_else_level());
    assert_eq!(settings.fingerprint(), parsed.fingerprint());
}

#[test]
fn fuzzy_templates_refuse_dialects_without_the_functions() {
    let result = jaro_winkler_at_thresholds("surname", &[0.9]).render(SqlDialect::Spark);
    assert!(result.is_err());

    // The plain ladder still renders everywhere.
    let comparison = ComparisonBuilder::new("surname")
        .level(null_level("surname"))
        .level(exact_match_level("surname"))
        .level(else_level())
        .render(SqlDialect::Sqlite)
        .unwrap();
    assert_eq!(
        comparison.comparison_levels[1].sql_condition,
        "\"surname_l\" = \"surname_r\""
    );
}

#[test]
fn blocking_rules_follow_the_dialect_quoting() {
    let rule = block_on(&["surname", "dob"]);
    assert_eq!(
        rule.render(SqlDialect::Spark).unwrap(),
        "l.`surname` = r.`surname` AND l.`dob` = r.`dob`"
    );
}

#[test]
fn transformed_blocking_expressions_render() {
    let rule = linkage_compare::BlockingRule::from_expressions(vec![
        ColumnExpression::from("email").regex_extract("^[^@]+"),
    ]);
    assert_eq!(
        rule.render(SqlDialect::DuckDb).unwrap(),
        "regexp_extract(l.\"email\", '^[^@]+', 0) = regexp_extract(r.\"email\", '^[^@]+', 0)"
    );
}

#[test]
fn preview_matches_the_username_level() {
    let comparison = email_comparison("email");
    let evaluation = evaluate_pair(&comparison, "robin@old.org", "robin@new.org").unwrap();
    assert_eq!(
        evaluation.matched_label.as_deref(),
        Some("Exact match on username")
    );
}

#[test]
fn settings_description_snapshot() {
    let description = settings_description(&demo_settings());
    insta::assert_snapshot!("settings_description", description.trim_end());
}
