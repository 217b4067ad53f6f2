use thiserror::Error;

use crate::dialect::SqlDialect;

#[derive(Debug, Error)]
pub enum LinkageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Settings(String),
    #[error("{function} is not available on the {dialect} dialect")]
    UnsupportedSql {
        dialect: SqlDialect,
        function: String,
    },
    #[error("{0}")]
    Message(String),
}

impl LinkageError {
    pub fn unsupported_sql(dialect: SqlDialect, function: impl Into<String>) -> Self {
        Self::UnsupportedSql {
            dialect,
            function: function.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LinkageError>;
