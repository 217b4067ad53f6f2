//! CLI argument definitions for linkage-studio.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use linkage_compare::TemplateKind;
use linkage_model::SqlDialect;

#[derive(Parser)]
#[command(
    name = "linkage-studio",
    version,
    about = "Build, validate, and explain record-linkage configurations",
    long_about = "Build, validate, and explain record-linkage configurations.\n\n\
                  Settings objects hold comparison levels and blocking rules as \
                  generated SQL; this tool renders them, describes them in plain \
                  language, previews them against value pairs, and cross-checks \
                  them against the columns of your input tables."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow record values (PII) to appear in log lines.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate a settings file against input tables.
    Check(CheckArgs),

    /// Print every comparison level's SQL condition and the blocking rules.
    Render(RenderArgs),

    /// Print a human-readable description of a settings file.
    Describe(DescribeArgs),

    /// Build a comparison template and evaluate it against a value pair.
    Preview(PreviewArgs),

    /// List supported SQL dialects and their capabilities.
    Dialects,

    /// List the comparison template catalog.
    Templates,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Path to the settings JSON file.
    #[arg(value_name = "SETTINGS")]
    pub settings: PathBuf,

    /// Input table as NAME=PATH (CSV), or just PATH to use the file stem as
    /// the table name. Repeatable.
    #[arg(long = "input", value_name = "NAME=PATH", required = true)]
    pub inputs: Vec<String>,

    /// Directory to write validation_report.json into.
    #[arg(long = "report-dir", value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Skip the checks that read row values (duplicates, completeness).
    #[arg(long = "no-value-checks")]
    pub no_value_checks: bool,

    /// Warn when a comparison column is null or blank in more than this
    /// fraction of rows.
    #[arg(long = "completeness-warn-ratio", default_value_t = 0.7)]
    pub completeness_warn_ratio: f64,
}

#[derive(Parser)]
pub struct RenderArgs {
    /// Path to the settings JSON file.
    #[arg(value_name = "SETTINGS")]
    pub settings: PathBuf,

    /// Dialect the caller expects the conditions to target. Settings are
    /// dialect-bound at build time, so this only cross-checks against the
    /// stored dialect; nothing is re-rendered.
    #[arg(long = "dialect", value_enum)]
    pub dialect: Option<DialectArg>,
}

#[derive(Parser)]
pub struct DescribeArgs {
    /// Path to the settings JSON file.
    #[arg(value_name = "SETTINGS")]
    pub settings: PathBuf,
}

#[derive(Parser)]
pub struct PreviewArgs {
    /// Comparison template to build.
    #[arg(long = "template", value_enum)]
    pub template: TemplateArg,

    /// Input column the comparison reads.
    #[arg(long = "column")]
    pub column: String,

    /// Left record value.
    #[arg(long = "left")]
    pub left: String,

    /// Right record value.
    #[arg(long = "right")]
    pub right: String,

    /// Thresholds for the banded templates (distances or similarities).
    #[arg(long = "thresholds", value_delimiter = ',')]
    pub thresholds: Vec<f64>,

    /// SQL dialect to render the comparison for.
    #[arg(long = "dialect", value_enum, default_value = "duckdb")]
    pub dialect: DialectArg,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

/// CLI dialect choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum DialectArg {
    Duckdb,
    Sqlite,
    Postgres,
    Spark,
}

impl From<DialectArg> for SqlDialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Duckdb => SqlDialect::DuckDb,
            DialectArg::Sqlite => SqlDialect::Sqlite,
            DialectArg::Postgres => SqlDialect::Postgres,
            DialectArg::Spark => SqlDialect::Spark,
        }
    }
}

/// CLI template choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum TemplateArg {
    ExactMatch,
    Levenshtein,
    DamerauLevenshtein,
    JaroWinkler,
    Email,
    Postcode,
}

impl From<TemplateArg> for TemplateKind {
    fn from(arg: TemplateArg) -> Self {
        match arg {
            TemplateArg::ExactMatch => TemplateKind::ExactMatch,
            TemplateArg::Levenshtein => TemplateKind::Levenshtein,
            TemplateArg::DamerauLevenshtein => TemplateKind::DamerauLevenshtein,
            TemplateArg::JaroWinkler => TemplateKind::JaroWinkler,
            TemplateArg::Email => TemplateKind::Email,
            TemplateArg::Postcode => TemplateKind::Postcode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_accepts_an_optional_dialect_cross_check() {
        let cli = Cli::try_parse_from([
            "linkage-studio",
            "render",
            "settings.json",
            "--dialect",
            "spark",
        ])
        .unwrap();
        let Command::Render(args) = cli.command else {
            panic!("expected the render subcommand");
        };
        assert_eq!(args.dialect.map(SqlDialect::from), Some(SqlDialect::Spark));
    }

    #[test]
    fn render_dialect_defaults_to_the_stored_one() {
        let cli = Cli::try_parse_from(["linkage-studio", "render", "settings.json"]).unwrap();
        let Command::Render(args) = cli.command else {
            panic!("expected the render subcommand");
        };
        assert!(args.dialect.is_none());
    }
}
