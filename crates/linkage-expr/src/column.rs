use std::fmt;

use linkage_model::SqlDialect;

/// Which record of a candidate pair a column reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Alias suffix appended by the pairwise join (`email_l` / `email_r`).
    pub fn suffix(&self) -> &'static str {
        match self {
            Side::Left => "_l",
            Side::Right => "_r",
        }
    }

    /// Table alias used in blocking rules (`l.email` / `r.email`).
    pub fn prefix(&self) -> &'static str {
        match self {
            Side::Left => "l",
            Side::Right => "r",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// A raw input column name with helpers for the quoted forms generated SQL
/// uses.
///
/// Pairwise SQL refers to a column in two shapes: blocking rules compare
/// table-prefixed references (`l."email" = r."email"`), while comparison
/// levels compare the suffixed aliases produced by the pairwise join
/// (`"email_l" = "email_r"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputColumn {
    name: String,
}

impl InputColumn {
    /// Wrap a column name. Surrounding quote characters are stripped so a
    /// name read back from generated SQL normalizes to the same column.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: unquote_identifier(&name.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The quoted bare name, e.g. `"email"` or Spark's `` `email` ``.
    pub fn quoted(&self, dialect: SqlDialect) -> String {
        quote_identifier(&self.name, dialect)
    }

    /// The unquoted join alias, e.g. `email_l`.
    pub fn aliased(&self, side: Side) -> String {
        format!("{}{}", self.name, side.suffix())
    }

    /// The quoted join alias, e.g. `"email_l"`.
    pub fn aliased_quoted(&self, dialect: SqlDialect, side: Side) -> String {
        quote_identifier(&self.aliased(side), dialect)
    }

    /// The table-prefixed reference used in blocking rules, e.g. `l."email"`.
    pub fn prefixed(&self, dialect: SqlDialect, side: Side) -> String {
        format!("{}.{}", side.prefix(), self.quoted(dialect))
    }
}

impl From<&str> for InputColumn {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for InputColumn {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Quote an identifier for a dialect, doubling any embedded quote characters.
pub fn quote_identifier(name: &str, dialect: SqlDialect) -> String {
    let quote = dialect.quote_char();
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push(quote);
    for ch in name.chars() {
        quoted.push(ch);
        if ch == quote {
            quoted.push(quote);
        }
    }
    quoted.push(quote);
    quoted
}

/// Strip a matching pair of surrounding quote characters (`"` or `` ` ``),
/// un-doubling any escaped quotes inside. Unquoted input passes through
/// trimmed.
pub fn unquote_identifier(raw: &str) -> String {
    let trimmed = raw.trim();
    for quote in ['"', '`'] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            let inner = &trimmed[1..trimmed.len() - 1];
            let doubled = format!("{quote}{quote}");
            return inner.replace(&doubled, &quote.to_string());
        }
    }
    trimmed.to_string()
}
