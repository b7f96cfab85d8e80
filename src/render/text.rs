//! Plain terminal rendering of reports and file selections.

use crate::domain::{AnalysisReport, FileRecord, RepositoryIdentifier, SelectionStats};
use crate::utils::format_with_commas;
use console::style;
use std::fmt::Write;

pub fn render_identifier(repository: &RepositoryIdentifier) -> String {
    format!(
        "Owner:  {}\nRepo:   {}\nBranch: {}\n",
        repository.owner, repository.repo, repository.branch
    )
}

pub fn render_selection(
    repository: &RepositoryIdentifier,
    stats: &SelectionStats,
    files: &[FileRecord],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Repository: {}", style(repository).bold());
    if stats.used_fallback_branch {
        let _ = writeln!(out, "  (fell back to branch '{}')", repository.branch);
    }

    out.push_str("Statistics:\n");
    let _ = writeln!(out, "  Tree entries: {}", format_with_commas(stats.entries_listed));
    let _ = writeln!(out, "  Eligible files: {}", format_with_commas(stats.files_eligible));
    let _ = writeln!(out, "  Selected: {}", stats.files_selected);
    let _ = writeln!(out, "  Fetched: {}", stats.files_fetched);
    let _ = writeln!(out, "  Failed or empty: {}", stats.fetch_failures);
    let _ = writeln!(out, "  Truncated: {}", stats.files_truncated);

    if !files.is_empty() {
        out.push_str("Files:\n");
        for file in files {
            let marker = if file.was_truncated() { " [truncated]" } else { "" };
            let _ = writeln!(
                out,
                "  {} ({} chars){}",
                file.path,
                format_with_commas(file.size),
                style(marker).yellow()
            );
        }
    }
    out
}

pub fn render_report(repository: &RepositoryIdentifier, report: &AnalysisReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n", style(repository).bold().underlined());

    section(&mut out, "Mission");
    let _ = writeln!(out, "{}\n", report.mission.trim());

    if !report.architecture.trim().is_empty() {
        section(&mut out, "Architecture");
        let _ = writeln!(out, "{}\n", report.architecture.trim());
    }

    bullets(&mut out, "Tech stack", &report.tech_stack);
    bullets(&mut out, "Key features", &report.key_features);

    if !report.technical_decisions.is_empty() {
        section(&mut out, "Technical decisions");
        for decision in &report.technical_decisions {
            if decision.rationale.is_empty() {
                let _ = writeln!(out, "  - {}", decision.decision);
            } else {
                let _ = writeln!(out, "  - {}: {}", decision.decision, decision.rationale);
            }
        }
        out.push('\n');
    }

    if !report.important_files.is_empty() {
        section(&mut out, "Important files");
        for file in &report.important_files {
            let _ = writeln!(out, "  - {}  {}", style(&file.path).cyan(), file.role);
        }
        out.push('\n');
    }

    if let Some(organization) = &report.file_organization {
        section(&mut out, "File organization");
        let _ = writeln!(out, "{}\n", organization.trim());
    }

    bullets(&mut out, "Suggested questions", &report.suggested_questions);
    out.trim_end().to_string() + "\n"
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}", style(title).bold().green());
}

fn bullets(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    section(out, title);
    for item in items {
        let _ = writeln!(out, "  - {item}");
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_report;
    use similar_asserts::assert_eq;

    #[test]
    fn test_render_identifier() {
        let text = render_identifier(&RepositoryIdentifier::new("o", "r", "dev"));
        assert_eq!(text, "Owner:  o\nRepo:   r\nBranch: dev\n");
    }

    #[test]
    fn test_render_report_sections() {
        let text = render_report(&RepositoryIdentifier::new("o", "r", "main"), &sample_report());
        let plain = console::strip_ansi_codes(&text);
        assert_eq!(
            &*plain,
            "o/r@main\n\n\
             Mission\nDemo service\n\n\
             Architecture\nLayers\n\n\
             Tech stack\n  - Rust\n\n\
             Important files\n  - src/main.rs  entry point\n\n\
             Suggested questions\n  - Where does it start?\n"
        );
    }

    #[test]
    fn test_render_selection_marks_truncated() {
        let files = vec![
            FileRecord {
                path: "README.md".to_string(),
                content: "hi".to_string(),
                size: 2,
                truncated: false,
            },
            FileRecord {
                path: "src/big.rs".to_string(),
                content: "a... [truncated]".to_string(),
                size: 12_345,
                truncated: true,
            },
            FileRecord {
                path: "notes.md".to_string(),
                content: "ends... [truncated]".to_string(),
                size: 19,
                truncated: false,
            },
        ];
        let stats = SelectionStats {
            entries_listed: 1_200,
            files_selected: 2,
            used_fallback_branch: true,
            ..Default::default()
        };
        let text =
            render_selection(&RepositoryIdentifier::new("o", "r", "master"), &stats, &files);
        let plain = console::strip_ansi_codes(&text);

        assert!(plain.contains("(fell back to branch 'master')"));
        assert!(plain.contains("Tree entries: 1,200"));
        assert!(plain.contains("  README.md (2 chars)\n"));
        assert!(plain.contains("  src/big.rs (12,345 chars) [truncated]\n"));
        assert!(plain.contains("  notes.md (19 chars)\n"));
    }
}
