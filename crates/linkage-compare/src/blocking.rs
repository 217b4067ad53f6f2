//! Blocking rules: the join conditions that decide which record pairs are
//! compared at all.
//!
//! Unlike comparison levels, blocking rules reference the left and right
//! input tables through the `l.` and `r.` aliases rather than suffixed
//! column names.

use linkage_expr::{ColumnExpression, Side};
use linkage_model::{LinkageError, Result, SqlDialect};

/// An equality join over one or more column expressions.
#[derive(Debug, Clone)]
pub struct BlockingRule {
    expressions: Vec<ColumnExpression>,
}

/// Block on equality of every named column:
/// `l."surname" = r."surname" AND l."dob" = r."dob"`.
pub fn block_on(columns: &[&str]) -> BlockingRule {
    BlockingRule {
        expressions: columns
            .iter()
            .map(|column| ColumnExpression::from(*column))
            .collect(),
    }
}

impl BlockingRule {
    /// Block on transformed expressions, e.g. a postcode area.
    pub fn from_expressions(expressions: Vec<ColumnExpression>) -> Self {
        Self { expressions }
    }

    pub fn expressions(&self) -> &[ColumnExpression] {
        &self.expressions
    }

    /// Render the join condition for a dialect.
    pub fn render(&self, dialect: SqlDialect) -> Result<String> {
        if self.expressions.is_empty() {
            return Err(LinkageError::Settings(
                "a blocking rule needs at least one column".to_string(),
            ));
        }
        let clauses = self
            .expressions
            .iter()
            .map(|expr| {
                Ok(format!(
                    "{} = {}",
                    expr.prefixed_sql(dialect, Side::Left)?,
                    expr.prefixed_sql(dialect, Side::Right)?
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(clauses.join(" AND "))
    }
}
