//! Constructor helpers for individual comparison levels.
//!
//! Each helper returns a [`LevelBuilder`] holding the operation the level
//! tests plus any overrides. [`LevelBuilder::render`] turns it into the
//! dialect-bound [`ComparisonLevel`] stored in settings; dialects that lack
//! the required SQL function reject the render instead of emitting SQL the
//! engine could not run.

use linkage_expr::{ColumnExpression, Side};
use linkage_model::{ComparisonLevel, LinkageError, Result, SqlDialect};

/// The operation a level tests, before any dialect is chosen.
#[derive(Debug, Clone)]
pub(crate) enum LevelKind {
    Null {
        expr: ColumnExpression,
    },
    ExactMatch {
        expr: ColumnExpression,
    },
    Else,
    Levenshtein {
        expr: ColumnExpression,
        max_distance: u32,
    },
    DamerauLevenshtein {
        expr: ColumnExpression,
        max_distance: u32,
    },
    Jaro {
        expr: ColumnExpression,
        min_similarity: f64,
    },
    JaroWinkler {
        expr: ColumnExpression,
        min_similarity: f64,
    },
    Jaccard {
        expr: ColumnExpression,
        min_similarity: f64,
    },
    AbsoluteDifference {
        expr: ColumnExpression,
        max_difference: f64,
    },
    PercentageDifference {
        expr: ColumnExpression,
        max_fraction: f64,
    },
    ColumnsReversed {
        first: ColumnExpression,
        second: ColumnExpression,
    },
    Custom {
        sql_condition: String,
    },
}

/// A comparison level under construction: the operation plus optional
/// overrides for the chart label, term-frequency column, and probabilities.
#[derive(Debug, Clone)]
pub struct LevelBuilder {
    kind: LevelKind,
    label: Option<String>,
    tf_adjustment_column: Option<String>,
    m_probability: Option<f64>,
    u_probability: Option<f64>,
}

/// Level capturing missing values: `{l} IS NULL OR {r} IS NULL`.
pub fn null_level(expr: impl Into<ColumnExpression>) -> LevelBuilder {
    LevelBuilder::new(LevelKind::Null { expr: expr.into() })
}

/// Level testing equality of the (possibly transformed) column: `{l} = {r}`.
pub fn exact_match_level(expr: impl Into<ColumnExpression>) -> LevelBuilder {
    LevelBuilder::new(LevelKind::ExactMatch { expr: expr.into() })
}

/// The catch-all level every comparison ends with.
pub fn else_level() -> LevelBuilder {
    LevelBuilder::new(LevelKind::Else)
}

/// Level testing edit distance: `levenshtein({l}, {r}) <= max_distance`.
pub fn levenshtein_level(expr: impl Into<ColumnExpression>, max_distance: u32) -> LevelBuilder {
    LevelBuilder::new(LevelKind::Levenshtein {
        expr: expr.into(),
        max_distance,
    })
}

/// Like [`levenshtein_level`] but counting transpositions as one edit.
pub fn damerau_levenshtein_level(
    expr: impl Into<ColumnExpression>,
    max_distance: u32,
) -> LevelBuilder {
    LevelBuilder::new(LevelKind::DamerauLevenshtein {
        expr: expr.into(),
        max_distance,
    })
}

/// Level testing Jaro similarity: `jaro_similarity({l}, {r}) >= min_similarity`.
pub fn jaro_level(expr: impl Into<ColumnExpression>, min_similarity: f64) -> LevelBuilder {
    LevelBuilder::new(LevelKind::Jaro {
        expr: expr.into(),
        min_similarity,
    })
}

/// Level testing Jaro-Winkler similarity, which boosts shared prefixes.
pub fn jaro_winkler_level(expr: impl Into<ColumnExpression>, min_similarity: f64) -> LevelBuilder {
    LevelBuilder::new(LevelKind::JaroWinkler {
        expr: expr.into(),
        min_similarity,
    })
}

/// Level testing Jaccard similarity over character sets.
pub fn jaccard_level(expr: impl Into<ColumnExpression>, min_similarity: f64) -> LevelBuilder {
    LevelBuilder::new(LevelKind::Jaccard {
        expr: expr.into(),
        min_similarity,
    })
}

/// Numeric level: `abs({l} - {r}) <= max_difference`.
pub fn absolute_difference_level(
    expr: impl Into<ColumnExpression>,
    max_difference: f64,
) -> LevelBuilder {
    LevelBuilder::new(LevelKind::AbsoluteDifference {
        expr: expr.into(),
        max_difference,
    })
}

/// Numeric level testing relative difference against the larger value.
pub fn percentage_difference_level(
    expr: impl Into<ColumnExpression>,
    max_fraction: f64,
) -> LevelBuilder {
    LevelBuilder::new(LevelKind::PercentageDifference {
        expr: expr.into(),
        max_fraction,
    })
}

/// Level matching two columns with their values swapped between records,
/// e.g. first name and surname transposed at data entry.
pub fn columns_reversed_level(
    first: impl Into<ColumnExpression>,
    second: impl Into<ColumnExpression>,
) -> LevelBuilder {
    LevelBuilder::new(LevelKind::ColumnsReversed {
        first: first.into(),
        second: second.into(),
    })
}

/// Level with a caller-supplied SQL condition, passed through verbatim.
pub fn custom_level(sql_condition: impl Into<String>, label: impl Into<String>) -> LevelBuilder {
    LevelBuilder::new(LevelKind::Custom {
        sql_condition: sql_condition.into(),
    })
    .label(label)
}

impl LevelBuilder {
    fn new(kind: LevelKind) -> Self {
        Self {
            kind,
            label: None,
            tf_adjustment_column: None,
            m_probability: None,
            u_probability: None,
        }
    }

    /// Override the chart label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Adjust match weights at this level using term frequencies of a column.
    #[must_use]
    pub fn tf_adjustment_column(mut self, column: impl Into<String>) -> Self {
        self.tf_adjustment_column = Some(column.into());
        self
    }

    /// Fix the m probability instead of leaving it for estimation.
    #[must_use]
    pub fn m_probability(mut self, probability: f64) -> Self {
        self.m_probability = Some(probability);
        self
    }

    /// Fix the u probability instead of leaving it for estimation.
    #[must_use]
    pub fn u_probability(mut self, probability: f64) -> Self {
        self.u_probability = Some(probability);
        self
    }

    /// Render the level for a dialect.
    pub fn render(&self, dialect: SqlDialect) -> Result<ComparisonLevel> {
        Ok(ComparisonLevel {
            sql_condition: self.sql_condition(dialect)?,
            label_for_charts: self.resolved_label(),
            is_null_level: matches!(self.kind, LevelKind::Null { .. }),
            tf_adjustment_column: self.tf_adjustment_column.clone(),
            m_probability: self.m_probability,
            u_probability: self.u_probability,
        })
    }

    /// True for the trailing catch-all.
    pub fn is_else(&self) -> bool {
        matches!(self.kind, LevelKind::Else)
    }

    /// True for levels that capture missing values.
    pub fn is_null(&self) -> bool {
        matches!(self.kind, LevelKind::Null { .. })
    }

    pub(crate) fn kind(&self) -> &LevelKind {
        &self.kind
    }

    /// The label override if set, otherwise a label derived from the kind.
    pub(crate) fn resolved_label(&self) -> String {
        if let Some(label) = &self.label {
            return label.clone();
        }
        match &self.kind {
            LevelKind::Null { .. } => "Null".to_string(),
            LevelKind::ExactMatch { expr } => format!("Exact match on {}", expr.label()),
            LevelKind::Else => "All other comparisons".to_string(),
            LevelKind::Levenshtein { expr, max_distance } => {
                format!("Levenshtein distance of {} <= {max_distance}", expr.label())
            }
            LevelKind::DamerauLevenshtein { expr, max_distance } => format!(
                "Damerau-Levenshtein distance of {} <= {max_distance}",
                expr.label()
            ),
            LevelKind::Jaro {
                expr,
                min_similarity,
            } => format!("Jaro similarity of {} >= {min_similarity}", expr.label()),
            LevelKind::JaroWinkler {
                expr,
                min_similarity,
            } => format!(
                "Jaro-Winkler similarity of {} >= {min_similarity}",
                expr.label()
            ),
            LevelKind::Jaccard {
                expr,
                min_similarity,
            } => format!("Jaccard similarity of {} >= {min_similarity}", expr.label()),
            LevelKind::AbsoluteDifference {
                expr,
                max_difference,
            } => format!(
                "Absolute difference of {} <= {max_difference}",
                expr.label()
            ),
            LevelKind::PercentageDifference { expr, max_fraction } => format!(
                "Percentage difference of {} < {max_fraction}",
                expr.label()
            ),
            LevelKind::ColumnsReversed { first, second } => {
                format!("Match on {} and {} reversed", first.label(), second.label())
            }
            LevelKind::Custom { .. } => "Custom level".to_string(),
        }
    }

    fn sql_condition(&self, dialect: SqlDialect) -> Result<String> {
        match &self.kind {
            LevelKind::Null { expr } => {
                let l = expr.aliased_sql(dialect, Side::Left)?;
                let r = expr.aliased_sql(dialect, Side::Right)?;
                Ok(format!("{l} IS NULL OR {r} IS NULL"))
            }
            LevelKind::ExactMatch { expr } => {
                let l = expr.aliased_sql(dialect, Side::Left)?;
                let r = expr.aliased_sql(dialect, Side::Right)?;
                Ok(format!("{l} = {r}"))
            }
            LevelKind::Else => Ok("ELSE".to_string()),
            LevelKind::Levenshtein { expr, max_distance } => {
                let function = dialect
                    .levenshtein_function()
                    .ok_or_else(|| LinkageError::unsupported_sql(dialect, "levenshtein"))?;
                let l = expr.aliased_sql(dialect, Side::Left)?;
                let r = expr.aliased_sql(dialect, Side::Right)?;
                Ok(format!("{function}({l}, {r}) <= {max_distance}"))
            }
            LevelKind::DamerauLevenshtein { expr, max_distance } => {
                let function = dialect
                    .damerau_levenshtein_function()
                    .ok_or_else(|| LinkageError::unsupported_sql(dialect, "damerau_levenshtein"))?;
                let l = expr.aliased_sql(dialect, Side::Left)?;
                let r = expr.aliased_sql(dialect, Side::Right)?;
                Ok(format!("{function}({l}, {r}) <= {max_distance}"))
            }
            LevelKind::Jaro {
                expr,
                min_similarity,
            } => {
                let function = dialect
                    .jaro_function()
                    .ok_or_else(|| LinkageError::unsupported_sql(dialect, "jaro"))?;
                let l = expr.aliased_sql(dialect, Side::Left)?;
                let r = expr.aliased_sql(dialect, Side::Right)?;
                Ok(format!("{function}({l}, {r}) >= {min_similarity}"))
            }
            LevelKind::JaroWinkler {
                expr,
                min_similarity,
            } => {
                let function = dialect
                    .jaro_winkler_function()
                    .ok_or_else(|| LinkageError::unsupported_sql(dialect, "jaro_winkler"))?;
                let l = expr.aliased_sql(dialect, Side::Left)?;
                let r = expr.aliased_sql(dialect, Side::Right)?;
                Ok(format!("{function}({l}, {r}) >= {min_similarity}"))
            }
            LevelKind::Jaccard {
                expr,
                min_similarity,
            } => {
                let function = dialect
                    .jaccard_function()
                    .ok_or_else(|| LinkageError::unsupported_sql(dialect, "jaccard"))?;
                let l = expr.aliased_sql(dialect, Side::Left)?;
                let r = expr.aliased_sql(dialect, Side::Right)?;
                Ok(format!("{function}({l}, {r}) >= {min_similarity}"))
            }
            LevelKind::AbsoluteDifference {
                expr,
                max_difference,
            } => {
                let l = expr.aliased_sql(dialect, Side::Left)?;
                let r = expr.aliased_sql(dialect, Side::Right)?;
                Ok(format!("abs({l} - {r}) <= {max_difference}"))
            }
            LevelKind::PercentageDifference { expr, max_fraction } => {
                let l = expr.aliased_sql(dialect, Side::Left)?;
                let r = expr.aliased_sql(dialect, Side::Right)?;
                Ok(format!(
                    "(abs({l} - {r}) / (CASE WHEN {r} > {l} THEN {r} ELSE {l} END)) < {max_fraction}"
                ))
            }
            LevelKind::ColumnsReversed { first, second } => {
                let first_l = first.aliased_sql(dialect, Side::Left)?;
                let first_r = first.aliased_sql(dialect, Side::Right)?;
                let second_l = second.aliased_sql(dialect, Side::Left)?;
                let second_r = second.aliased_sql(dialect, Side::Right)?;
                Ok(format!(
                    "{first_l} = {second_r} AND {second_l} = {first_r}"
                ))
            }
            LevelKind::Custom { sql_condition } => Ok(sql_condition.clone()),
        }
    }
}
