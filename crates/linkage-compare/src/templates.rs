//! Ready-made comparisons for common column types.
//!
//! Each template assembles the usual level ladder for its column type, from
//! most to least specific, ending with the catch-all. The builders they
//! return can still be extended with further levels before rendering.

use std::fmt;
use std::str::FromStr;

use linkage_expr::ColumnExpression;

use crate::comparison::ComparisonBuilder;
use crate::level::{
    damerau_levenshtein_level, else_level, exact_match_level, jaro_winkler_level,
    levenshtein_level, null_level,
};

/// Edit-distance bands used when a caller does not supply any.
pub const DEFAULT_DISTANCE_THRESHOLDS: [u32; 2] = [1, 2];
/// Similarity bands used when a caller does not supply any.
pub const DEFAULT_SIMILARITY_THRESHOLDS: [f64; 2] = [0.9, 0.7];

/// Null, exact match, else.
pub fn exact_match(column: &str) -> ComparisonBuilder {
    ComparisonBuilder::new(column)
        .description("Exact match vs. anything else")
        .level(null_level(column))
        .level(exact_match_level(column))
        .level(else_level())
}

/// Exact match, then one level per edit-distance band.
pub fn levenshtein_at_thresholds(column: &str, thresholds: &[u32]) -> ComparisonBuilder {
    let thresholds = non_empty(thresholds, &DEFAULT_DISTANCE_THRESHOLDS);
    let mut builder = ComparisonBuilder::new(column)
        .description(format!(
            "Exact match vs. levenshtein within thresholds {} vs. anything else",
            join_thresholds(thresholds)
        ))
        .level(null_level(column))
        .level(exact_match_level(column));
    for &max_distance in thresholds {
        builder = builder.level(levenshtein_level(column, max_distance));
    }
    builder.level(else_level())
}

/// Like [`levenshtein_at_thresholds`] with transpositions counted as one edit.
pub fn damerau_levenshtein_at_thresholds(column: &str, thresholds: &[u32]) -> ComparisonBuilder {
    let thresholds = non_empty(thresholds, &DEFAULT_DISTANCE_THRESHOLDS);
    let mut builder = ComparisonBuilder::new(column)
        .description(format!(
            "Exact match vs. damerau-levenshtein within thresholds {} vs. anything else",
            join_thresholds(thresholds)
        ))
        .level(null_level(column))
        .level(exact_match_level(column));
    for &max_distance in thresholds {
        builder = builder.level(damerau_levenshtein_level(column, max_distance));
    }
    builder.level(else_level())
}

/// Exact match, then one level per similarity band (descending thresholds).
pub fn jaro_winkler_at_thresholds(column: &str, thresholds: &[f64]) -> ComparisonBuilder {
    let thresholds = non_empty(thresholds, &DEFAULT_SIMILARITY_THRESHOLDS);
    let mut builder = ComparisonBuilder::new(column)
        .description(format!(
            "Exact match vs. jaro-winkler within thresholds {} vs. anything else",
            join_thresholds(thresholds)
        ))
        .level(null_level(column))
        .level(exact_match_level(column));
    for &min_similarity in thresholds {
        builder = builder.level(jaro_winkler_level(column, min_similarity));
    }
    builder.level(else_level())
}

/// Email ladder: full address, then the username before the `@`, exactly and
/// fuzzily.
pub fn email_comparison(column: &str) -> ComparisonBuilder {
    let username = ColumnExpression::from(column).regex_extract("^[^@]+");
    ComparisonBuilder::new(column)
        .description("Exact match vs. username match vs. fuzzy username match vs. anything else")
        .level(null_level(column))
        .level(exact_match_level(column).label("Exact match on full email address"))
        .level(exact_match_level(username.clone()).label("Exact match on username"))
        .level(
            jaro_winkler_level(username, 0.88)
                .label("Jaro-Winkler similarity of username >= 0.88"),
        )
        .level(else_level())
}

/// UK-style postcode ladder: full postcode, then the district (first four
/// characters), then the area (first two).
pub fn postcode_comparison(column: &str) -> ComparisonBuilder {
    let district = ColumnExpression::from(column).substr(1, 4);
    let area = ColumnExpression::from(column).substr(1, 2);
    ComparisonBuilder::new(column)
        .description("Exact match vs. district match vs. area match vs. anything else")
        .level(null_level(column))
        .level(exact_match_level(column).label("Exact match on full postcode"))
        .level(exact_match_level(district).label("Exact match on postcode district"))
        .level(exact_match_level(area).label("Exact match on postcode area"))
        .level(else_level())
}

/// The catalog entry names, for CLI listing and selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    ExactMatch,
    Levenshtein,
    DamerauLevenshtein,
    JaroWinkler,
    Email,
    Postcode,
}

impl TemplateKind {
    /// Every template, in listing order.
    pub const ALL: [TemplateKind; 6] = [
        TemplateKind::ExactMatch,
        TemplateKind::Levenshtein,
        TemplateKind::DamerauLevenshtein,
        TemplateKind::JaroWinkler,
        TemplateKind::Email,
        TemplateKind::Postcode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::ExactMatch => "exact_match",
            TemplateKind::Levenshtein => "levenshtein",
            TemplateKind::DamerauLevenshtein => "damerau_levenshtein",
            TemplateKind::JaroWinkler => "jaro_winkler",
            TemplateKind::Email => "email",
            TemplateKind::Postcode => "postcode",
        }
    }

    /// One-line summary for CLI listings.
    pub fn summary(&self) -> &'static str {
        match self {
            TemplateKind::ExactMatch => "null, exact match, else",
            TemplateKind::Levenshtein => "exact match plus levenshtein distance bands",
            TemplateKind::DamerauLevenshtein => {
                "exact match plus damerau-levenshtein distance bands"
            }
            TemplateKind::JaroWinkler => "exact match plus jaro-winkler similarity bands",
            TemplateKind::Email => "full address, username, and fuzzy username levels",
            TemplateKind::Postcode => "full postcode, district, and area levels",
        }
    }

    /// Build the template for a column. `thresholds` applies to the banded
    /// templates; distance bands round fractional inputs.
    pub fn build(self, column: &str, thresholds: &[f64]) -> ComparisonBuilder {
        match self {
            TemplateKind::ExactMatch => exact_match(column),
            TemplateKind::Levenshtein => {
                levenshtein_at_thresholds(column, &to_distances(thresholds))
            }
            TemplateKind::DamerauLevenshtein => {
                damerau_levenshtein_at_thresholds(column, &to_distances(thresholds))
            }
            TemplateKind::JaroWinkler => jaro_winkler_at_thresholds(column, thresholds),
            TemplateKind::Email => email_comparison(column),
            TemplateKind::Postcode => postcode_comparison(column),
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact_match" | "exact-match" | "exact" => Ok(TemplateKind::ExactMatch),
            "levenshtein" => Ok(TemplateKind::Levenshtein),
            "damerau_levenshtein" | "damerau-levenshtein" => Ok(TemplateKind::DamerauLevenshtein),
            "jaro_winkler" | "jaro-winkler" => Ok(TemplateKind::JaroWinkler),
            "email" => Ok(TemplateKind::Email),
            "postcode" => Ok(TemplateKind::Postcode),
            _ => Err(format!("Unknown template: {}", s)),
        }
    }
}

fn non_empty<'a, T>(values: &'a [T], fallback: &'a [T]) -> &'a [T] {
    if values.is_empty() { fallback } else { values }
}

fn to_distances(thresholds: &[f64]) -> Vec<u32> {
    thresholds
        .iter()
        .map(|threshold| threshold.round().max(0.0) as u32)
        .collect()
}

fn join_thresholds<T: fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkage_model::SqlDialect;

    #[test]
    fn email_template_has_the_documented_ladder() {
        let comparison = email_comparison("email").render(SqlDialect::DuckDb).unwrap();
        let labels: Vec<&str> = comparison
            .comparison_levels
            .iter()
            .map(|level| level.label_for_charts.as_str())
            .collect();
        assert_eq!(
            labels,
            [
                "Null",
                "Exact match on full email address",
                "Exact match on username",
                "Jaro-Winkler similarity of username >= 0.88",
                "All other comparisons",
            ]
        );
        assert_eq!(
            comparison.comparison_levels[2].sql_condition,
            "regexp_extract(\"email_l\", '^[^@]+', 0) = regexp_extract(\"email_r\", '^[^@]+', 0)"
        );
    }

    #[test]
    fn postcode_template_uses_substrings() {
        let comparison = postcode_comparison("postcode")
            .render(SqlDialect::DuckDb)
            .unwrap();
        assert_eq!(
            comparison.comparison_levels[2].sql_condition,
            "substr(\"postcode_l\", 1, 4) = substr(\"postcode_r\", 1, 4)"
        );
        assert_eq!(
            comparison.comparison_levels[3].sql_condition,
            "substr(\"postcode_l\", 1, 2) = substr(\"postcode_r\", 1, 2)"
        );
    }

    #[test]
    fn banded_templates_fall_back_to_default_thresholds() {
        let comparison = levenshtein_at_thresholds("surname", &[])
            .render(SqlDialect::DuckDb)
            .unwrap();
        // null + exact + two default bands + else
        assert_eq!(comparison.comparison_levels.len(), 5);
        assert_eq!(
            comparison.comparison_levels[2].sql_condition,
            "levenshtein(\"surname_l\", \"surname_r\") <= 1"
        );
    }

    #[test]
    fn template_names_round_trip() {
        for kind in TemplateKind::ALL {
            assert_eq!(kind.as_str().parse::<TemplateKind>(), Ok(kind));
        }
        assert_eq!("jaro-winkler".parse::<TemplateKind>(), Ok(TemplateKind::JaroWinkler));
        assert!("soundex".parse::<TemplateKind>().is_err());
    }

    #[test]
    fn build_rounds_distance_thresholds() {
        let comparison = TemplateKind::Levenshtein
            .build("surname", &[1.0, 3.0])
            .render(SqlDialect::DuckDb)
            .unwrap();
        assert_eq!(
            comparison.comparison_levels[3].sql_condition,
            "levenshtein(\"surname_l\", \"surname_r\") <= 3"
        );
    }
}
