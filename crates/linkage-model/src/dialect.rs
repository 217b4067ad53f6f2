use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// SQL dialect that comparison levels and blocking rules are rendered for.
///
/// DuckDB is the default backend and carries the full string-similarity
/// function surface. SQLite is deliberately thin: without user-defined
/// functions it ships neither regex extraction nor fuzzy matching, so those
/// renderings fail early instead of producing SQL the engine would reject.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[default]
    DuckDb,
    Sqlite,
    Postgres,
    Spark,
}

impl SqlDialect {
    /// All dialects the toolkit can render for, in listing order.
    pub const ALL: [SqlDialect; 4] = [
        SqlDialect::DuckDb,
        SqlDialect::Sqlite,
        SqlDialect::Postgres,
        SqlDialect::Spark,
    ];

    /// Canonical lowercase name, as stored in settings JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlDialect::DuckDb => "duckdb",
            SqlDialect::Sqlite => "sqlite",
            SqlDialect::Postgres => "postgres",
            SqlDialect::Spark => "spark",
        }
    }

    /// One-line capability summary for CLI listings.
    pub fn summary(&self) -> &'static str {
        match self {
            SqlDialect::DuckDb => "default backend; full similarity and regex surface",
            SqlDialect::Sqlite => "no regex extraction or fuzzy matching without UDFs",
            SqlDialect::Postgres => "levenshtein via fuzzystrmatch; no jaro family",
            SqlDialect::Spark => "backtick quoting; levenshtein and regex only",
        }
    }

    /// Identifier quote character (`"` everywhere except Spark's backtick).
    pub fn quote_char(&self) -> char {
        match self {
            SqlDialect::Spark => '`',
            _ => '"',
        }
    }

    /// Name of the edit-distance function, when the dialect has one.
    pub fn levenshtein_function(&self) -> Option<&'static str> {
        match self {
            SqlDialect::Sqlite => None,
            _ => Some("levenshtein"),
        }
    }

    pub fn damerau_levenshtein_function(&self) -> Option<&'static str> {
        match self {
            SqlDialect::DuckDb => Some("damerau_levenshtein"),
            _ => None,
        }
    }

    pub fn jaro_function(&self) -> Option<&'static str> {
        match self {
            SqlDialect::DuckDb => Some("jaro_similarity"),
            _ => None,
        }
    }

    pub fn jaro_winkler_function(&self) -> Option<&'static str> {
        match self {
            SqlDialect::DuckDb => Some("jaro_winkler_similarity"),
            _ => None,
        }
    }

    pub fn jaccard_function(&self) -> Option<&'static str> {
        match self {
            SqlDialect::DuckDb => Some("jaccard"),
            _ => None,
        }
    }

    pub fn supports_regex_extract(&self) -> bool {
        !matches!(self, SqlDialect::Sqlite)
    }

    /// Function used to parse a string into a date, when the dialect has one.
    pub fn date_parse_function(&self) -> Option<&'static str> {
        match self {
            SqlDialect::DuckDb => Some("try_strptime"),
            SqlDialect::Postgres | SqlDialect::Spark => Some("to_date"),
            SqlDialect::Sqlite => None,
        }
    }

    /// Function used to parse a string into a timestamp, when available.
    pub fn timestamp_parse_function(&self) -> Option<&'static str> {
        match self {
            SqlDialect::DuckDb => Some("try_strptime"),
            SqlDialect::Postgres | SqlDialect::Spark => Some("to_timestamp"),
            SqlDialect::Sqlite => None,
        }
    }

    /// Target type name for a string cast.
    pub fn string_cast_type(&self) -> &'static str {
        match self {
            SqlDialect::Spark => "STRING",
            SqlDialect::Sqlite => "TEXT",
            _ => "VARCHAR",
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SqlDialect {
    type Err = String;

    /// Parse a dialect name as found in settings files (case-insensitive;
    /// accepts "postgresql" as an alias for "postgres").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "duckdb" => Ok(SqlDialect::DuckDb),
            "sqlite" => Ok(SqlDialect::Sqlite),
            "postgres" | "postgresql" => Ok(SqlDialect::Postgres),
            "spark" => Ok(SqlDialect::Spark),
            _ => Err(format!("Unknown SQL dialect: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_spellings() {
        assert_eq!("DuckDB".parse::<SqlDialect>(), Ok(SqlDialect::DuckDb));
        assert_eq!("postgresql".parse::<SqlDialect>(), Ok(SqlDialect::Postgres));
        assert_eq!(" spark ".parse::<SqlDialect>(), Ok(SqlDialect::Spark));
        assert!("oracle".parse::<SqlDialect>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for dialect in SqlDialect::ALL {
            assert_eq!(dialect.to_string().parse::<SqlDialect>(), Ok(dialect));
        }
    }

    #[test]
    fn sqlite_has_no_fuzzy_surface() {
        let sqlite = SqlDialect::Sqlite;
        assert!(sqlite.levenshtein_function().is_none());
        assert!(sqlite.jaro_winkler_function().is_none());
        assert!(!sqlite.supports_regex_extract());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&SqlDialect::DuckDb).expect("serialize");
        assert_eq!(json, "\"duckdb\"");
        let parsed: SqlDialect = serde_json::from_str("\"spark\"").expect("deserialize");
        assert_eq!(parsed, SqlDialect::Spark);
    }
}
