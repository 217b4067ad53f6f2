//! Column expressions for record linkage: quoted column references, SQL
//! transformations (substring, regex extraction, case folding, date
//! parsing), and dialect-aware rendering of both.

pub mod column;
pub mod expression;
pub mod transform;

pub use column::{InputColumn, Side, quote_identifier, unquote_identifier};
pub use expression::ColumnExpression;
pub use transform::Transform;
