//! Column extraction from the SQL conditions stored in a settings object.
//!
//! Comparison levels and blocking rules carry raw SQL strings, so the
//! columns they reference have to be recovered by parsing. A reference can
//! appear in two shapes: suffixed join aliases (`"email_l"`) inside
//! comparison levels, and table-prefixed names (`l."email"`) inside
//! blocking rules. Both normalize back to the bare input column name.

use std::ops::ControlFlow;

use sqlparser::ast::{Expr, visit_expressions};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

/// One column reference recovered from a SQL condition, as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnReference {
    /// Table qualifier, e.g. `l` in `l."email"`. Empty for alias references.
    pub table: Option<String>,
    /// The referenced name with quote characters already stripped by the
    /// parser, e.g. `email_l` or `email`.
    pub name: String,
}

impl ColumnReference {
    /// True when the name carries a `_l` / `_r` pairwise join suffix.
    pub fn has_pair_suffix(&self) -> bool {
        self.name.ends_with("_l") || self.name.ends_with("_r")
    }

    /// True when the reference is qualified with one of the `l` / `r`
    /// table aliases blocking rules are written against. Blocking rules
    /// join two aliased tables, so an unqualified reference there is
    /// ambiguous and counts as invalid.
    pub fn has_valid_table_prefix(&self) -> bool {
        matches!(self.table.as_deref(), Some("l") | Some("r"))
    }

    /// The bare input column name: table qualifier dropped and any `_l` /
    /// `_r` suffix stripped.
    pub fn base_name(&self) -> &str {
        self.name
            .strip_suffix("_l")
            .or_else(|| self.name.strip_suffix("_r"))
            .unwrap_or(&self.name)
    }

    /// The reference as it was written, for messages.
    pub fn written(&self) -> String {
        match &self.table {
            Some(table) => format!("{table}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

/// Parse a SQL condition and collect every column reference in it.
///
/// Returns `None` when the condition is not a parseable expression. The
/// `ELSE` catch-all is the common case of that; callers decide whether an
/// unparseable condition is worth reporting.
pub fn condition_columns(sql: &str) -> Option<Vec<ColumnReference>> {
    let expr = Parser::new(&GenericDialect {})
        .try_with_sql(sql)
        .ok()?
        .parse_expr()
        .ok()?;

    let mut columns = Vec::new();
    let _ = visit_expressions(&expr, |node: &Expr| {
        match node {
            Expr::Identifier(ident) => columns.push(ColumnReference {
                table: None,
                name: ident.value.clone(),
            }),
            Expr::CompoundIdentifier(parts) => {
                if let Some((column, qualifiers)) = parts.split_last() {
                    let table = qualifiers
                        .iter()
                        .map(|part| part.value.as_str())
                        .collect::<Vec<_>>()
                        .join(".");
                    columns.push(ColumnReference {
                        table: Some(table),
                        name: column.value.clone(),
                    });
                }
            }
            _ => {}
        }
        ControlFlow::<()>::Continue(())
    });
    Some(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_suffixed_alias_references() {
        let columns = condition_columns("\"email_l\" = \"email_r\"").expect("parse");
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "email_l");
        assert_eq!(columns[0].table, None);
        assert_eq!(columns[0].base_name(), "email");
        assert!(columns[0].has_pair_suffix());
    }

    #[test]
    fn extracts_table_prefixed_references() {
        let columns =
            condition_columns("l.\"surname\" = r.\"surname\" AND l.\"dob\" = r.\"dob\"")
                .expect("parse");
        let written: Vec<String> = columns.iter().map(ColumnReference::written).collect();
        assert_eq!(written, ["l.surname", "r.surname", "l.dob", "r.dob"]);
        assert!(columns.iter().all(ColumnReference::has_valid_table_prefix));
        assert!(!columns[0].has_pair_suffix());
    }

    #[test]
    fn columns_inside_function_calls_are_found() {
        let columns = condition_columns(
            "levenshtein(\"surname_l\", \"surname_r\") <= 2",
        )
        .expect("parse");
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].base_name(), "surname");
    }

    #[test]
    fn bad_table_prefixes_are_reported_as_written() {
        let columns = condition_columns("lt.\"email\" = r.\"email\"").expect("parse");
        assert!(!columns[0].has_valid_table_prefix());
        assert_eq!(columns[0].written(), "lt.email");
    }

    #[test]
    fn unqualified_references_have_no_valid_table_prefix() {
        let columns = condition_columns("\"surname\" = r.\"surname\"").expect("parse");
        assert!(!columns[0].has_valid_table_prefix());
        assert_eq!(columns[0].written(), "surname");
        assert!(columns[1].has_valid_table_prefix());
    }

    #[test]
    fn else_is_not_an_expression() {
        assert!(condition_columns("ELSE").is_none());
    }

    #[test]
    fn suffix_stripping_leaves_plain_names_alone() {
        let reference = ColumnReference {
            table: None,
            name: "email".to_string(),
        };
        assert_eq!(reference.base_name(), "email");
        assert!(!reference.has_pair_suffix());
    }
}
