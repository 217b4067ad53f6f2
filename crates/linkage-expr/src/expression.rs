use linkage_model::{Result, SqlDialect};

use crate::column::{InputColumn, Side};
use crate::transform::Transform;

/// A column plus an ordered chain of transformations: the building block
/// comparison levels and blocking rules are written against.
///
/// The expression stays dialect-free until rendered, so the same definition
/// serves every backend. Transformations apply innermost-first in insertion
/// order: `ColumnExpression::new("c").lower().substr(1, 2)` renders as
/// `substr(lower("c_l"), 1, 2)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnExpression {
    column: InputColumn,
    transforms: Vec<Transform>,
}

impl ColumnExpression {
    pub fn new(column: impl Into<InputColumn>) -> Self {
        Self {
            column: column.into(),
            transforms: Vec::new(),
        }
    }

    pub fn column(&self) -> &InputColumn {
        &self.column
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    pub fn is_transformed(&self) -> bool {
        !self.transforms.is_empty()
    }

    /// Lowercase the value.
    #[must_use]
    pub fn lower(mut self) -> Self {
        self.transforms.push(Transform::Lower);
        self
    }

    /// Take a substring (1-based start offset, SQL semantics).
    #[must_use]
    pub fn substr(mut self, start: i64, length: i64) -> Self {
        self.transforms.push(Transform::Substring { start, length });
        self
    }

    /// Extract the first match of `pattern` (the whole match).
    #[must_use]
    pub fn regex_extract(self, pattern: impl Into<String>) -> Self {
        self.regex_extract_group(pattern, 0)
    }

    /// Extract a specific capture group of `pattern`.
    #[must_use]
    pub fn regex_extract_group(mut self, pattern: impl Into<String>, capture_group: u32) -> Self {
        self.transforms.push(Transform::RegexExtract {
            pattern: pattern.into(),
            capture_group,
        });
        self
    }

    /// Cast to the dialect's string type.
    #[must_use]
    pub fn cast_to_string(mut self) -> Self {
        self.transforms.push(Transform::CastToString);
        self
    }

    /// Parse into a date with a strptime-style format.
    #[must_use]
    pub fn try_parse_date(mut self, format: impl Into<String>) -> Self {
        self.transforms.push(Transform::TryParseDate {
            format: format.into(),
        });
        self
    }

    /// Parse into a timestamp with a strptime-style format.
    #[must_use]
    pub fn try_parse_timestamp(mut self, format: impl Into<String>) -> Self {
        self.transforms.push(Transform::TryParseTimestamp {
            format: format.into(),
        });
        self
    }

    /// Render over the pairwise join alias (`"email_l"`), the form used in
    /// comparison-level conditions.
    pub fn aliased_sql(&self, dialect: SqlDialect, side: Side) -> Result<String> {
        self.fold(dialect, self.column.aliased_quoted(dialect, side))
    }

    /// Render over the table-prefixed reference (`l."email"`), the form used
    /// in blocking rules.
    pub fn prefixed_sql(&self, dialect: SqlDialect, side: Side) -> Result<String> {
        self.fold(dialect, self.column.prefixed(dialect, side))
    }

    /// Human-readable name for descriptions: the bare column, annotated with
    /// its transform chain when one exists.
    pub fn label(&self) -> String {
        if self.transforms.is_empty() {
            return format!("\"{}\"", self.column.name());
        }
        let directives: Vec<String> = self
            .transforms
            .iter()
            .map(Transform::describe)
            .collect();
        format!(
            "\"{}\" (with {})",
            self.column.name(),
            directives.join(", ")
        )
    }

    fn fold(&self, dialect: SqlDialect, base: String) -> Result<String> {
        let mut sql = base;
        for transform in &self.transforms {
            sql = transform.render(dialect, &sql)?;
        }
        Ok(sql)
    }
}

impl From<&str> for ColumnExpression {
    fn from(column: &str) -> Self {
        Self::new(column)
    }
}

impl From<String> for ColumnExpression {
    fn from(column: String) -> Self {
        Self::new(column)
    }
}

impl From<InputColumn> for ColumnExpression {
    fn from(column: InputColumn) -> Self {
        Self {
            column,
            transforms: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_column_renders_the_quoted_alias() {
        let expr = ColumnExpression::new("email");
        assert_eq!(
            expr.aliased_sql(SqlDialect::DuckDb, Side::Left).expect("sql"),
            "\"email_l\""
        );
        assert_eq!(
            expr.prefixed_sql(SqlDialect::Spark, Side::Right).expect("sql"),
            "r.`email`"
        );
    }

    #[test]
    fn transforms_fold_innermost_first() {
        let expr = ColumnExpression::new("postcode").lower().substr(1, 2);
        assert_eq!(
            expr.aliased_sql(SqlDialect::DuckDb, Side::Left).expect("sql"),
            "substr(lower(\"postcode_l\"), 1, 2)"
        );
    }

    #[test]
    fn regex_extract_matches_documented_shape() {
        let expr = ColumnExpression::new("email").regex_extract("^[^@]+");
        assert_eq!(
            expr.aliased_sql(SqlDialect::DuckDb, Side::Right).expect("sql"),
            "regexp_extract(\"email_r\", '^[^@]+', 0)"
        );
    }

    #[test]
    fn rendering_does_not_consume_the_expression() {
        let expr = ColumnExpression::new("dob").try_parse_date("%Y-%m-%d");
        let duckdb = expr.aliased_sql(SqlDialect::DuckDb, Side::Left).expect("duckdb");
        let spark = expr.aliased_sql(SqlDialect::Spark, Side::Left).expect("spark");
        assert_eq!(duckdb, "try_strptime(\"dob_l\", '%Y-%m-%d')");
        assert_eq!(spark, "to_date(`dob_l`, '%Y-%m-%d')");
    }

    #[test]
    fn labels_list_the_transform_chain() {
        assert_eq!(ColumnExpression::new("email").label(), "\"email\"");
        assert_eq!(
            ColumnExpression::new("email").regex_extract("^[^@]+").label(),
            "\"email\" (with regex_extract('^[^@]+'))"
        );
        assert_eq!(
            ColumnExpression::new("postcode").lower().substr(1, 2).label(),
            "\"postcode\" (with lower, substr(1, 2))"
        );
    }
}
