//! Subcommand implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use comfy_table::{Cell, Table};
use polars::prelude::{CsvReadOptions, DataFrame, SerReader};
use tracing::{debug, info, warn};

use linkage_compare::{
    LevelStatus, PairEvaluation, TemplateKind, evaluate_pair, settings_description,
};
use linkage_model::{Settings, SqlDialect};
use linkage_validate::{
    InputTable, ValidationOptions, log_report, validate_settings, write_validation_report_json,
};

use crate::cli::{CheckArgs, DescribeArgs, PreviewArgs, RenderArgs};
use crate::summary::{CheckSummary, apply_table_style, dim_cell, header_cell, print_check_summary};
use linkage_cli::logging::redact_value;

/// Validate a settings file against input tables. Returns true when the
/// report contains errors, so main can set the exit code.
pub fn run_check(args: &CheckArgs) -> Result<bool> {
    let settings = load_settings(&args.settings)?;
    let mut tables = Vec::with_capacity(args.inputs.len());
    for spec in &args.inputs {
        let (name, path) = parse_input_spec(spec)?;
        let frame = read_input_frame(&path)?;
        info!(table = %name, rows = frame.height(), "loaded input table");
        tables.push(InputTable::from_frame(name, &frame));
    }

    let options = ValidationOptions {
        completeness_warn_ratio: args.completeness_warn_ratio,
        check_values: !args.no_value_checks,
    };
    let report = validate_settings(&settings, &tables, options);
    log_report(&report);

    let report_path = match &args.report_dir {
        Some(dir) => Some(
            write_validation_report_json(dir, &settings, &report)
                .context("write validation report")?,
        ),
        None => None,
    };

    let has_errors = report.has_errors();
    print_check_summary(&CheckSummary {
        settings_fingerprint: settings.fingerprint(),
        sql_dialect: settings.sql_dialect.to_string(),
        table_names: tables.iter().map(|table| table.name().to_string()).collect(),
        report,
        report_path,
    });
    Ok(has_errors)
}

/// Print every stored SQL condition and the blocking rules.
///
/// Settings are dialect-bound at build time, so this prints the conditions
/// as stored rather than re-rendering them. A `--dialect` request is only
/// cross-checked against the stored dialect.
pub fn run_render(args: &RenderArgs) -> Result<()> {
    let settings = load_settings(&args.settings)?;
    println!("SQL dialect: {}", settings.sql_dialect);
    if let Some(requested) = args.dialect.map(SqlDialect::from)
        && requested != settings.sql_dialect
    {
        warn!(
            requested = requested.as_str(),
            stored = settings.sql_dialect.as_str(),
            "settings were rendered for a different dialect; conditions are shown as stored"
        );
        println!(
            "Note: requested dialect `{requested}` differs from the stored dialect; \
             conditions are shown as rendered for `{}`.",
            settings.sql_dialect
        );
    }
    println!("Settings fingerprint: {}", settings.fingerprint());

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Comparison"),
        header_cell("Level"),
        header_cell("SQL condition"),
    ]);
    apply_table_style(&mut table);
    for comparison in &settings.comparisons {
        for level in &comparison.comparison_levels {
            table.add_row(vec![
                Cell::new(comparison.output_column_name.clone()),
                Cell::new(level.label_for_charts.clone()),
                if level.is_else_level() {
                    dim_cell(level.sql_condition.clone())
                } else {
                    Cell::new(level.sql_condition.clone())
                },
            ]);
        }
    }
    println!("{table}");

    if !settings.blocking_rules_to_generate_predictions.is_empty() {
        let mut rules = Table::new();
        rules.set_header(vec![header_cell("#"), header_cell("Blocking rule")]);
        apply_table_style(&mut rules);
        for (index, rule) in settings
            .blocking_rules_to_generate_predictions
            .iter()
            .enumerate()
        {
            rules.add_row(vec![Cell::new(index + 1), Cell::new(rule.clone())]);
        }
        println!("{rules}");
    }
    Ok(())
}

/// Print the human-readable description of a settings file.
pub fn run_describe(args: &DescribeArgs) -> Result<()> {
    let settings = load_settings(&args.settings)?;
    print!("{}", settings_description(&settings));
    Ok(())
}

/// Build a template, render its SQL, and evaluate it against one value pair.
pub fn run_preview(args: &PreviewArgs) -> Result<()> {
    let kind = TemplateKind::from(args.template);
    let dialect = SqlDialect::from(args.dialect);
    let builder = kind.build(&args.column, &args.thresholds);
    let comparison = builder
        .render(dialect)
        .with_context(|| format!("render template `{kind}` for dialect `{dialect}`"))?;
    debug!(
        template = %kind,
        column = %args.column,
        left = redact_value(&args.left),
        right = redact_value(&args.right),
        "previewing value pair"
    );

    println!("Template: {kind} on column `{}` ({dialect})", args.column);
    let mut rendered = Table::new();
    rendered.set_header(vec![header_cell("Level"), header_cell("SQL condition")]);
    apply_table_style(&mut rendered);
    for level in &comparison.comparison_levels {
        rendered.add_row(vec![
            Cell::new(level.label_for_charts.clone()),
            Cell::new(level.sql_condition.clone()),
        ]);
    }
    println!("{rendered}");

    let evaluation = evaluate_pair(&builder, &args.left, &args.right)?;
    print_evaluation(&evaluation);
    Ok(())
}

fn print_evaluation(evaluation: &PairEvaluation) {
    let mut trace = Table::new();
    trace.set_header(vec![
        header_cell("Level"),
        header_cell("Outcome"),
        header_cell("Measured"),
    ]);
    apply_table_style(&mut trace);
    for (index, outcome) in evaluation.trace.iter().enumerate() {
        let status = match outcome.status {
            LevelStatus::Matched if evaluation.matched_level == Some(index) => {
                Cell::new("MATCHED").fg(comfy_table::Color::Green)
            }
            LevelStatus::Matched => Cell::new("would match"),
            LevelStatus::NotMatched => dim_cell("not matched"),
            LevelStatus::Skipped => dim_cell("skipped"),
        };
        let measured = match outcome.measured {
            Some(value) => Cell::new(format!("{value:.3}")),
            None => dim_cell("-"),
        };
        trace.add_row(vec![Cell::new(outcome.label.clone()), status, measured]);
    }
    println!("{trace}");
    match &evaluation.matched_label {
        Some(label) => println!("Pair falls into level: {label}"),
        None => println!("Pair does not fall into any level."),
    }
}

/// List supported dialects with their capability notes.
pub fn run_dialects() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Dialect"),
        header_cell("Quote"),
        header_cell("Capabilities"),
    ]);
    apply_table_style(&mut table);
    for dialect in SqlDialect::ALL {
        table.add_row(vec![
            Cell::new(dialect.as_str()),
            Cell::new(dialect.quote_char()),
            Cell::new(dialect.summary()),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// List the comparison template catalog.
pub fn run_templates() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Template"), header_cell("Levels")]);
    apply_table_style(&mut table);
    for kind in TemplateKind::ALL {
        table.add_row(vec![Cell::new(kind.as_str()), Cell::new(kind.summary())]);
    }
    println!("{table}");
    Ok(())
}

fn load_settings(path: &Path) -> Result<Settings> {
    Settings::load(path).with_context(|| format!("load settings {}", path.display()))
}

/// Split a `NAME=PATH` input spec; a bare path uses the file stem as name.
fn parse_input_spec(spec: &str) -> Result<(String, PathBuf)> {
    if let Some((name, path)) = spec.split_once('=') {
        if name.trim().is_empty() {
            bail!("input spec `{spec}` has an empty table name");
        }
        return Ok((name.trim().to_string(), PathBuf::from(path)));
    }
    let path = PathBuf::from(spec);
    let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
        bail!("cannot derive a table name from input path `{spec}`; use NAME=PATH");
    };
    Ok((stem.to_string(), path))
}

fn read_input_frame(path: &Path) -> Result<DataFrame> {
    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("open CSV {}", path.display()))?
        .finish()
        .with_context(|| format!("read CSV {}", path.display()))?;
    Ok(frame)
}
