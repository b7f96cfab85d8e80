//! Report JSON generation.

use crate::domain::{
    AnalysisReport, FileRecord, RepositoryIdentifier, SelectionStats, REPORT_SCHEMA_VERSION,
};
use anyhow::Result;
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::path::Path;

/// What goes into a report besides the analysis itself.
pub struct ReportOptions {
    pub include_timestamp: bool,
    pub model: Option<String>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { include_timestamp: true, model: None }
    }
}

pub fn report_value(
    repository: &RepositoryIdentifier,
    report: &AnalysisReport,
    stats: &SelectionStats,
    files: &[FileRecord],
    options: &ReportOptions,
) -> Result<Value> {
    let file_manifest = files
        .iter()
        .map(|f| {
            json!({
                "path": f.path,
                "chars": f.size,
                "truncated": f.was_truncated(),
            })
        })
        .collect::<Vec<_>>();

    let mut out = Map::new();
    out.insert("schema_version".to_string(), Value::String(REPORT_SCHEMA_VERSION.to_string()));
    if options.include_timestamp {
        out.insert(
            "generated_at".to_string(),
            Value::String(Utc::now().format("%Y-%m-%dT%H:%M:%S+00:00").to_string()),
        );
    }
    out.insert(
        "repository".to_string(),
        json!({
            "owner": repository.owner,
            "repo": repository.repo,
            "branch": repository.branch,
        }),
    );
    if let Some(model) = &options.model {
        out.insert("model".to_string(), Value::String(model.clone()));
    }
    out.insert("stats".to_string(), serde_json::to_value(stats)?);
    out.insert("analysis".to_string(), serde_json::to_value(report)?);
    out.insert("files".to_string(), Value::Array(file_manifest));
    Ok(Value::Object(out))
}

pub fn write_report(
    report_path: &Path,
    repository: &RepositoryIdentifier,
    report: &AnalysisReport,
    stats: &SelectionStats,
    files: &[FileRecord],
    options: &ReportOptions,
) -> Result<()> {
    let value = report_value(repository, report, stats, files, options)?;

    if let Some(parent) = report_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(report_path, serde_json::to_string_pretty(&value)?)?;
    tracing::debug!("Wrote report to {}", report_path.display());
    Ok(())
}
