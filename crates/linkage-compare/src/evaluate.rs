//! Local evaluation of a comparison against a single value pair.
//!
//! Mirrors what the generated SQL would decide for one record pair, without
//! a database: the transform chain is applied in-process, then levels are
//! walked top to bottom and the first hit wins. Backs the CLI preview.

use std::collections::BTreeSet;

use linkage_expr::{ColumnExpression, Transform};
use linkage_model::{LinkageError, Result};
use rapidfuzz::distance::{damerau_levenshtein, jaro, jaro_winkler, levenshtein};
use regex::Regex;

use crate::comparison::ComparisonBuilder;
use crate::level::{LevelBuilder, LevelKind};

/// How one level fared during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelStatus {
    /// The level's condition holds for the pair.
    Matched,
    /// The condition does not hold.
    NotMatched,
    /// The level cannot be evaluated without a database (custom SQL,
    /// reversed columns, date parsing).
    Skipped,
}

impl LevelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelStatus::Matched => "matched",
            LevelStatus::NotMatched => "not matched",
            LevelStatus::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for LevelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one level, with the measured distance or similarity where the
/// level computes one.
#[derive(Debug, Clone)]
pub struct LevelOutcome {
    pub label: String,
    pub status: LevelStatus,
    pub measured: Option<f64>,
}

/// First-match-wins result for a value pair, with the full per-level trace.
///
/// The trace keeps going past the winning level so a preview can show which
/// later levels would also have matched.
#[derive(Debug, Clone)]
pub struct PairEvaluation {
    pub matched_level: Option<usize>,
    pub matched_label: Option<String>,
    pub trace: Vec<LevelOutcome>,
}

/// Evaluate a comparison against one left/right value pair.
///
/// Empty and whitespace-only inputs count as missing: they satisfy the null
/// level and never satisfy a scored level.
pub fn evaluate_pair(
    comparison: &ComparisonBuilder,
    left: &str,
    right: &str,
) -> Result<PairEvaluation> {
    let left = present(left);
    let right = present(right);

    let mut trace = Vec::with_capacity(comparison.levels().len());
    let mut matched: Option<(usize, String)> = None;

    for (index, level) in comparison.levels().iter().enumerate() {
        let outcome = evaluate_level(level, left, right)?;
        if matched.is_none() && outcome.status == LevelStatus::Matched {
            matched = Some((index, outcome.label.clone()));
        }
        trace.push(outcome);
    }

    let (matched_level, matched_label) = match matched {
        Some((index, label)) => (Some(index), Some(label)),
        None => (None, None),
    };
    Ok(PairEvaluation {
        matched_level,
        matched_label,
        trace,
    })
}

fn evaluate_level(
    level: &LevelBuilder,
    left: Option<&str>,
    right: Option<&str>,
) -> Result<LevelOutcome> {
    let label = level.resolved_label();
    let (status, measured) = match level.kind() {
        LevelKind::Else => (LevelStatus::Matched, None),
        LevelKind::Custom { .. } | LevelKind::ColumnsReversed { .. } => {
            (LevelStatus::Skipped, None)
        }
        LevelKind::Null { .. } => {
            let status = if left.is_none() || right.is_none() {
                LevelStatus::Matched
            } else {
                LevelStatus::NotMatched
            };
            (status, None)
        }
        LevelKind::ExactMatch { expr } => score_pair(expr, left, right, |l, r| (l == r, None))?,
        LevelKind::Levenshtein { expr, max_distance } => score_pair(expr, left, right, |l, r| {
            let distance = levenshtein::distance(l.chars(), r.chars());
            (distance <= *max_distance as usize, Some(distance as f64))
        })?,
        LevelKind::DamerauLevenshtein { expr, max_distance } => {
            score_pair(expr, left, right, |l, r| {
                let distance = damerau_levenshtein::distance(l.chars(), r.chars());
                (distance <= *max_distance as usize, Some(distance as f64))
            })?
        }
        LevelKind::Jaro {
            expr,
            min_similarity,
        } => score_pair(expr, left, right, |l, r| {
            let similarity = jaro::similarity(l.chars(), r.chars());
            (similarity >= *min_similarity, Some(similarity))
        })?,
        LevelKind::JaroWinkler {
            expr,
            min_similarity,
        } => score_pair(expr, left, right, |l, r| {
            let similarity = jaro_winkler::similarity(l.chars(), r.chars());
            (similarity >= *min_similarity, Some(similarity))
        })?,
        LevelKind::Jaccard {
            expr,
            min_similarity,
        } => score_pair(expr, left, right, |l, r| {
            let similarity = jaccard_similarity(l, r);
            (similarity >= *min_similarity, Some(similarity))
        })?,
        LevelKind::AbsoluteDifference {
            expr,
            max_difference,
        } => score_pair(expr, left, right, |l, r| {
            match (parse_number(l), parse_number(r)) {
                (Some(a), Some(b)) => {
                    let difference = (a - b).abs();
                    (difference <= *max_difference, Some(difference))
                }
                _ => (false, None),
            }
        })?,
        LevelKind::PercentageDifference { expr, max_fraction } => {
            score_pair(expr, left, right, |l, r| {
                match (parse_number(l), parse_number(r)) {
                    (Some(a), Some(b)) => {
                        // Same shape as the SQL: divide by the greater value.
                        let greater = if b > a { b } else { a };
                        let fraction = (a - b).abs() / greater;
                        (fraction < *max_fraction, Some(fraction))
                    }
                    _ => (false, None),
                }
            })?
        }
    };
    Ok(LevelOutcome {
        label,
        status,
        measured,
    })
}

/// Apply the transform chain to both present values, then measure. Missing
/// input never matches; transforms with no local equivalent skip the level.
fn score_pair<F>(
    expr: &ColumnExpression,
    left: Option<&str>,
    right: Option<&str>,
    measure: F,
) -> Result<(LevelStatus, Option<f64>)>
where
    F: FnOnce(&str, &str) -> (bool, Option<f64>),
{
    let (Some(left), Some(right)) = (left, right) else {
        return Ok((LevelStatus::NotMatched, None));
    };
    let Some(left) = apply_transforms(expr, left)? else {
        return Ok((LevelStatus::Skipped, None));
    };
    let Some(right) = apply_transforms(expr, right)? else {
        return Ok((LevelStatus::Skipped, None));
    };
    let (matched, measured) = measure(&left, &right);
    let status = if matched {
        LevelStatus::Matched
    } else {
        LevelStatus::NotMatched
    };
    Ok((status, measured))
}

/// Apply the transform chain the way the SQL engine would, character-based.
/// Returns `None` when a transform has no local equivalent.
fn apply_transforms(expr: &ColumnExpression, value: &str) -> Result<Option<String>> {
    let mut current = value.to_string();
    for transform in expr.transforms() {
        current = match transform {
            Transform::Lower => current.to_lowercase(),
            Transform::CastToString => current,
            Transform::Substring { start, length } => {
                match substring(&current, *start, *length) {
                    Some(value) => value,
                    None => return Ok(None),
                }
            }
            Transform::RegexExtract {
                pattern,
                capture_group,
            } => regex_extract(&current, pattern, *capture_group)?,
            Transform::TryParseDate { .. } | Transform::TryParseTimestamp { .. } => {
                return Ok(None);
            }
        };
    }
    Ok(Some(current))
}

/// duckdb `substr` semantics: 1-based start, character-counted, and a
/// negative start is an offset from the end of the string. A start of zero,
/// or a negative start reaching past the first character, behaves
/// differently across backends, so those yield `None` and the level is
/// skipped rather than guessed.
fn substring(value: &str, start: i64, length: i64) -> Option<String> {
    if length <= 0 {
        return Some(String::new());
    }
    let skip = if start >= 1 {
        (start - 1) as usize
    } else if start < 0 {
        let from_end = value.chars().count() as i64 + start;
        if from_end < 0 {
            return None;
        }
        from_end as usize
    } else {
        return None;
    };
    Some(value.chars().skip(skip).take(length as usize).collect())
}

/// duckdb `regexp_extract` semantics: no match, or an absent capture group,
/// yields an empty string.
fn regex_extract(value: &str, pattern: &str, capture_group: u32) -> Result<String> {
    let regex = Regex::new(pattern)
        .map_err(|err| LinkageError::Settings(format!("invalid regex pattern '{pattern}': {err}")))?;
    let extracted = regex.captures(value).and_then(|captures| {
        captures
            .get(capture_group as usize)
            .map(|group| group.as_str().to_string())
    });
    Ok(extracted.unwrap_or_default())
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

/// Jaccard similarity over character sets.
fn jaccard_similarity(left: &str, right: &str) -> f64 {
    let a: BTreeSet<char> = left.chars().collect();
    let b: BTreeSet<char> = right.chars().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(&b).count() as f64;
    let union = a.union(&b).count() as f64;
    intersection / union
}

fn present(raw: &str) -> Option<&str> {
    if raw.trim().is_empty() { None } else { Some(raw) }
}
