//! Prompt and context assembly.

use crate::domain::{AnalysisReport, FileRecord};
use anyhow::Result;

/// Concatenate files as `FILE:` / `CONTENT:` blocks separated by `---`.
pub fn code_context(files: &[FileRecord]) -> String {
    files
        .iter()
        .map(|f| format!("FILE: {}\nCONTENT:\n{}\n---", f.path, f.content))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn analysis_prompt(files: &[FileRecord]) -> String {
    format!(
        "You are a senior software architect explaining a GitHub repository to a developer \
who has never seen it. Using only the files below, describe:\n\
1. The project's mission: what it is for and who uses it.\n\
2. The architecture in plain language.\n\
3. Notable technical decisions and their rationale.\n\
4. The most important files and the role each one plays.\n\
5. The logic behind the file organization.\n\
6. The main tech stack.\n\
7. Five to seven questions a curious developer might ask next.\n\n\
Repository context:\n{}",
        code_context(files)
    )
}

pub fn session_instruction(files: &[FileRecord], report: &AnalysisReport) -> Result<String> {
    Ok(format!(
        "You are an expert guide to this specific codebase. The user wants to dive deep \
into how it works. You have the file contents below. Be technical and specific, and \
reference file paths when explaining.\n\n\
CODEBASE ANALYSIS:\n{}\n\n\
CODEBASE CONTENT:\n{}",
        serde_json::to_string_pretty(report)?,
        code_context(files)
    ))
}
