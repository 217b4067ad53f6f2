//! JSON validation report, written alongside other run artifacts so CI can
//! pick the findings up without scraping logs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use linkage_model::{Settings, ValidationIssue, ValidationReport};

const REPORT_SCHEMA: &str = "linkage-studio.validation-report";
const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
pub struct ValidationReportPayload {
    pub schema: &'static str,
    pub schema_version: u32,
    pub generated_at: String,
    pub settings_fingerprint: String,
    pub sql_dialect: String,
    pub error_count: usize,
    pub warning_count: usize,
    pub issues: Vec<ValidationIssue>,
}

/// Write `validation_report.json` into `output_dir` and return its path.
pub fn write_validation_report_json(
    output_dir: &Path,
    settings: &Settings,
    report: &ValidationReport,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("create report directory {}", output_dir.display()))?;
    let output_path = output_dir.join("validation_report.json");
    let payload = ValidationReportPayload {
        schema: REPORT_SCHEMA,
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        settings_fingerprint: settings.fingerprint(),
        sql_dialect: settings.sql_dialect.to_string(),
        error_count: report.error_count(),
        warning_count: report.warning_count(),
        issues: report.issues.clone(),
    };
    let json = serde_json::to_string_pretty(&payload)?;
    std::fs::write(&output_path, format!("{json}\n"))
        .with_context(|| format!("write {}", output_path.display()))?;
    Ok(output_path)
}
