//! Analysis report: one stable internal value, adapted from whatever shape the
//! model returns.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Version of the JSON report written by `render::write_report`.
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Which external payload shape a report was adapted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSchema {
    /// `summary` / `architecture` / `techStack` / `keyFeatures` payloads.
    Overview,
    /// `mission` / `architectureSimple` / `importantFiles` payloads.
    Blueprint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalDecision {
    pub decision: String,
    #[serde(default)]
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportantFile {
    pub path: String,
    #[serde(default)]
    pub role: String,
}

/// Architectural analysis of a repository sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub schema: ReportSchema,
    pub mission: String,
    pub architecture: String,
    pub tech_stack: Vec<String>,
    pub key_features: Vec<String>,
    pub technical_decisions: Vec<TechnicalDecision>,
    pub important_files: Vec<ImportantFile>,
    pub file_organization: Option<String>,
    pub suggested_questions: Vec<String>,
}

impl AnalysisReport {
    /// Parse a raw model response into the internal representation.
    pub fn from_json(raw: &str) -> Result<Self> {
        let payload: ReportPayload = serde_json::from_str(strip_code_fence(raw))
            .context("Model response is not a recognized analysis report")?;
        Ok(payload.into())
    }
}

/// Payload shapes the analysis service is known to return.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReportPayload {
    Blueprint(BlueprintPayload),
    Overview(OverviewPayload),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintPayload {
    pub mission: String,
    #[serde(default)]
    pub architecture_simple: String,
    #[serde(default)]
    pub technical_decisions: Vec<TechnicalDecision>,
    #[serde(default)]
    pub important_files: Vec<ImportantFile>,
    #[serde(default)]
    pub file_organization_logic: Option<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub suggested_questions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewPayload {
    pub summary: String,
    #[serde(default)]
    pub architecture: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub key_features: Vec<String>,
    #[serde(default)]
    pub suggested_questions: Vec<String>,
}

impl From<ReportPayload> for AnalysisReport {
    fn from(payload: ReportPayload) -> Self {
        match payload {
            ReportPayload::Blueprint(p) => Self {
                schema: ReportSchema::Blueprint,
                mission: p.mission,
                architecture: p.architecture_simple,
                tech_stack: p.tech_stack,
                key_features: Vec::new(),
                technical_decisions: p.technical_decisions,
                important_files: p.important_files,
                file_organization: p.file_organization_logic.filter(|s| !s.trim().is_empty()),
                suggested_questions: p.suggested_questions,
            },
            ReportPayload::Overview(p) => Self {
                schema: ReportSchema::Overview,
                mission: p.summary,
                architecture: p.architecture,
                tech_stack: p.tech_stack,
                key_features: p.key_features,
                technical_decisions: Vec::new(),
                important_files: Vec::new(),
                file_organization: None,
                suggested_questions: p.suggested_questions,
            },
        }
    }
}

/// Models sometimes wrap JSON in a ```json fence even when asked not to.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
