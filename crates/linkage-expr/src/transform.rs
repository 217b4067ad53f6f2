use linkage_model::{LinkageError, Result, SqlDialect};

/// A SQL transformation applied to a column reference before it is compared.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// Lowercase the value.
    Lower,
    /// SQL substring with a 1-based start offset.
    Substring { start: i64, length: i64 },
    /// Extract the first regex match. Capture group 0 is the whole match;
    /// on Postgres group selection rides on parentheses in the pattern.
    RegexExtract { pattern: String, capture_group: u32 },
    /// Cast to the dialect's string type.
    CastToString,
    /// Parse a string into a date using a strptime-style format.
    TryParseDate { format: String },
    /// Parse a string into a timestamp using a strptime-style format.
    TryParseTimestamp { format: String },
}

impl Transform {
    /// Wrap `inner` in this transformation's SQL for the given dialect.
    pub fn render(&self, dialect: SqlDialect, inner: &str) -> Result<String> {
        match self {
            Transform::Lower => Ok(format!("lower({inner})")),
            Transform::Substring { start, length } => {
                Ok(format!("substr({inner}, {start}, {length})"))
            }
            Transform::RegexExtract {
                pattern,
                capture_group,
            } => {
                if !dialect.supports_regex_extract() {
                    return Err(LinkageError::unsupported_sql(dialect, "regex extraction"));
                }
                let pattern = escape_single_quotes(pattern);
                match dialect {
                    SqlDialect::Postgres => Ok(format!("substring({inner} from '{pattern}')")),
                    _ => Ok(format!(
                        "regexp_extract({inner}, '{pattern}', {capture_group})"
                    )),
                }
            }
            Transform::CastToString => {
                Ok(format!("CAST({inner} AS {})", dialect.string_cast_type()))
            }
            Transform::TryParseDate { format } => {
                let function = dialect
                    .date_parse_function()
                    .ok_or_else(|| LinkageError::unsupported_sql(dialect, "date parsing"))?;
                Ok(format!(
                    "{function}({inner}, '{}')",
                    escape_single_quotes(format)
                ))
            }
            Transform::TryParseTimestamp { format } => {
                let function = dialect
                    .timestamp_parse_function()
                    .ok_or_else(|| LinkageError::unsupported_sql(dialect, "timestamp parsing"))?;
                Ok(format!(
                    "{function}({inner}, '{}')",
                    escape_single_quotes(format)
                ))
            }
        }
    }

    /// Human-readable directive for descriptions, e.g.
    /// `regex_extract('^[^@]+')` or `substr(1, 2)`.
    pub fn describe(&self) -> String {
        match self {
            Transform::Lower => "lower".to_string(),
            Transform::Substring { start, length } => format!("substr({start}, {length})"),
            Transform::RegexExtract {
                pattern,
                capture_group,
            } => {
                if *capture_group == 0 {
                    format!("regex_extract('{pattern}')")
                } else {
                    format!("regex_extract('{pattern}', {capture_group})")
                }
            }
            Transform::CastToString => "cast_to_string".to_string(),
            Transform::TryParseDate { format } => format!("try_parse_date('{format}')"),
            Transform::TryParseTimestamp { format } => format!("try_parse_timestamp('{format}')"),
        }
    }
}

fn escape_single_quotes(value: &str) -> String {
    value.replace('\'', "''")
}
