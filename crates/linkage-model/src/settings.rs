use serde::{Deserialize, Serialize};
use sha2::Digest;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::dialect::SqlDialect;
use crate::error::Result;

/// How input records are linked: within one dataset, across datasets, or both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    #[default]
    DedupeOnly,
    LinkOnly,
    LinkAndDedupe,
}

impl LinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::DedupeOnly => "dedupe_only",
            LinkType::LinkOnly => "link_only",
            LinkType::LinkAndDedupe => "link_and_dedupe",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LinkType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dedupe_only" => Ok(LinkType::DedupeOnly),
            "link_only" => Ok(LinkType::LinkOnly),
            "link_and_dedupe" => Ok(LinkType::LinkAndDedupe),
            _ => Err(format!("Unknown link type: {}", s)),
        }
    }
}

/// One rule inside a comparison: a SQL condition classifying how similar two
/// column values are, with the label used when reporting on that bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonLevel {
    /// SQL condition for this level, or the literal `ELSE` for the catch-all.
    pub sql_condition: String,
    /// Short label used in charts and descriptions.
    pub label_for_charts: String,
    /// True when this level captures missing values rather than similarity.
    #[serde(default)]
    pub is_null_level: bool,
    /// Column whose term frequencies adjust match weights at this level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tf_adjustment_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m_probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub u_probability: Option<f64>,
}

impl ComparisonLevel {
    /// True for the catch-all level ("ELSE", compared case-insensitively).
    pub fn is_else_level(&self) -> bool {
        self.sql_condition.trim().eq_ignore_ascii_case("else")
    }
}

/// An ordered set of comparison levels for one output column.
///
/// Levels are evaluated first-match-wins, so more specific rules come first
/// and the final level is the `ELSE` catch-all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub output_column_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison_description: Option<String>,
    pub comparison_levels: Vec<ComparisonLevel>,
}

impl Comparison {
    /// The description if present, otherwise the output column name.
    pub fn display_name(&self) -> &str {
        self.comparison_description
            .as_deref()
            .unwrap_or(&self.output_column_name)
    }
}

fn default_unique_id_column() -> String {
    "unique_id".to_string()
}

fn default_retain_matching() -> bool {
    true
}

/// The settings dictionary: everything needed to describe how record pairs
/// are compared, serialized as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub link_type: LinkType,
    #[serde(default = "default_unique_id_column")]
    pub unique_id_column_name: String,
    #[serde(default)]
    pub sql_dialect: SqlDialect,
    #[serde(default)]
    pub comparisons: Vec<Comparison>,
    #[serde(default)]
    pub blocking_rules_to_generate_predictions: Vec<String>,
    #[serde(default)]
    pub additional_columns_to_retain: Vec<String>,
    #[serde(default = "default_retain_matching")]
    pub retain_matching_columns: bool,
    #[serde(default)]
    pub retain_intermediate_calculation_columns: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            link_type: LinkType::default(),
            unique_id_column_name: default_unique_id_column(),
            sql_dialect: SqlDialect::default(),
            comparisons: Vec::new(),
            blocking_rules_to_generate_predictions: Vec::new(),
            additional_columns_to_retain: Vec::new(),
            retain_matching_columns: true,
            retain_intermediate_calculation_columns: false,
        }
    }
}

impl Settings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json_pretty()?;
        fs::write(path, format!("{json}\n"))?;
        Ok(())
    }

    /// Short deterministic identifier for this settings object, used to
    /// correlate reports and log lines across runs. Derived from the sha256
    /// of the canonical JSON form.
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        let digest = sha2::Sha256::digest(&canonical);
        let mut id = hex::encode(digest);
        id.truncate(12);
        id
    }

    /// Comparison for an output column name, if configured.
    pub fn comparison(&self, output_column_name: &str) -> Option<&Comparison> {
        self.comparisons
            .iter()
            .find(|comparison| comparison.output_column_name == output_column_name)
    }
}
