//! Assembling ordered comparison levels into a comparison.

use linkage_model::{Comparison, LinkageError, Result, SqlDialect};

use crate::level::LevelBuilder;

/// Builder for a [`Comparison`]: an output column, an optional description,
/// and the ordered levels evaluated first-match-wins.
#[derive(Debug, Clone)]
pub struct ComparisonBuilder {
    output_column_name: String,
    description: Option<String>,
    levels: Vec<LevelBuilder>,
}

impl ComparisonBuilder {
    pub fn new(output_column_name: impl Into<String>) -> Self {
        Self {
            output_column_name: output_column_name.into(),
            description: None,
            levels: Vec::new(),
        }
    }

    /// Human-readable summary shown in descriptions and charts.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a level. Order matters: levels are evaluated top to bottom.
    #[must_use]
    pub fn level(mut self, level: LevelBuilder) -> Self {
        self.levels.push(level);
        self
    }

    pub fn output_column_name(&self) -> &str {
        &self.output_column_name
    }

    pub fn levels(&self) -> &[LevelBuilder] {
        &self.levels
    }

    /// Render every level for a dialect and check the comparison's shape:
    /// at least two levels, with exactly one `ELSE` catch-all in final
    /// position. A comparison without a null level renders fine but logs a
    /// warning, since missing values would then fall through to the
    /// catch-all.
    pub fn render(&self, dialect: SqlDialect) -> Result<Comparison> {
        let name = &self.output_column_name;
        if self.levels.len() < 2 {
            return Err(LinkageError::Settings(format!(
                "comparison '{name}' needs at least two levels, one of them ELSE"
            )));
        }

        let else_positions: Vec<usize> = self
            .levels
            .iter()
            .enumerate()
            .filter_map(|(index, level)| level.is_else().then_some(index))
            .collect();
        match else_positions.as_slice() {
            [] => {
                return Err(LinkageError::Settings(format!(
                    "comparison '{name}' is missing the ELSE catch-all level"
                )));
            }
            [last] if *last == self.levels.len() - 1 => {}
            _ => {
                return Err(LinkageError::Settings(format!(
                    "comparison '{name}' must have exactly one ELSE level, in final position"
                )));
            }
        }

        if !self.levels.iter().any(LevelBuilder::is_null) {
            tracing::warn!(
                comparison = %name,
                "No null level is defined; missing values will fall through to the catch-all"
            );
        }

        let comparison_levels = self
            .levels
            .iter()
            .map(|level| level.render(dialect))
            .collect::<Result<Vec<_>>>()?;

        Ok(Comparison {
            output_column_name: self.output_column_name.clone(),
            comparison_description: self.description.clone(),
            comparison_levels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{else_level, exact_match_level, levenshtein_level, null_level};

    #[test]
    fn renders_levels_in_order() {
        let comparison = ComparisonBuilder::new("surname")
            .description("Surname comparison")
            .level(null_level("surname"))
            .level(exact_match_level("surname"))
            .level(levenshtein_level("surname", 2))
            .level(else_level())
            .render(SqlDialect::DuckDb)
            .unwrap();

        assert_eq!(comparison.output_column_name, "surname");
        assert_eq!(
            comparison.comparison_description.as_deref(),
            Some("Surname comparison")
        );
        assert_eq!(comparison.comparison_levels.len(), 4);
        assert!(comparison.comparison_levels[0].is_null_level);
        assert!(comparison.comparison_levels[3].is_else_level());
    }

    #[test]
    fn rejects_too_few_levels() {
        let err = ComparisonBuilder::new("surname")
            .level(else_level())
            .render(SqlDialect::DuckDb)
            .unwrap_err();
        assert!(err.to_string().contains("at least two levels"));
    }

    #[test]
    fn rejects_missing_else() {
        let err = ComparisonBuilder::new("surname")
            .level(null_level("surname"))
            .level(exact_match_level("surname"))
            .render(SqlDialect::DuckDb)
            .unwrap_err();
        assert!(err.to_string().contains("missing the ELSE"));
    }

    #[test]
    fn rejects_else_before_the_end() {
        let err = ComparisonBuilder::new("surname")
            .level(else_level())
            .level(exact_match_level("surname"))
            .render(SqlDialect::DuckDb)
            .unwrap_err();
        assert!(err.to_string().contains("final position"));

        let err = ComparisonBuilder::new("surname")
            .level(exact_match_level("surname"))
            .level(else_level())
            .level(else_level())
            .render(SqlDialect::DuckDb)
            .unwrap_err();
        assert!(err.to_string().contains("exactly one ELSE"));
    }

    #[test]
    fn dialect_errors_surface_from_levels() {
        let result = ComparisonBuilder::new("surname")
            .level(null_level("surname"))
            .level(levenshtein_level("surname", 2))
            .level(else_level())
            .render(SqlDialect::Sqlite);
        assert!(result.is_err());
    }
}
