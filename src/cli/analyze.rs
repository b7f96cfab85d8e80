//! Analyze command implementation

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::chat::chat_loop;
use super::utils::{build_selector, load_settings, run_interruptible, stage_spinner, SelectionArgs};
use crate::domain::Config;
use crate::llm::GeminiAnalyzer;
use crate::pipeline::{Analysis, Orchestrator};
use crate::render::{render_report, report_value, write_report, ReportOptions};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// GitHub repository URL
    #[arg(value_name = "URL")]
    pub url: String,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Model used for analysis and chat
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Also write the JSON report to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Omit the generation timestamp from JSON output
    #[arg(long)]
    pub no_timestamp: bool,

    /// Continue with follow-up questions after the report
    #[arg(long)]
    pub chat: bool,
}

pub async fn run(args: AnalyzeArgs, config_path: Option<&Path>) -> Result<()> {
    let mut overrides = args.selection.overrides();
    overrides.model = args.model.clone();
    let config = load_settings(config_path, overrides)?;

    let mut analysis = run_pipeline(&args.url, &config, !args.json).await?;

    let options = ReportOptions {
        include_timestamp: !args.no_timestamp,
        model: Some(config.model.model.clone()),
    };
    if args.json {
        let value = report_value(
            &analysis.repository,
            &analysis.report,
            &analysis.stats,
            &analysis.files,
            &options,
        )?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", render_report(&analysis.repository, &analysis.report));
    }

    if let Some(output) = &args.output {
        write_report(
            output,
            &analysis.repository,
            &analysis.report,
            &analysis.stats,
            &analysis.files,
            &options,
        )?;
        eprintln!("Report written to {}", output.display());
    }

    if args.chat {
        chat_loop(&mut analysis.chat).await?;
    }
    Ok(())
}

/// Run the full pipeline for `url`, with a progress spinner when asked.
pub(super) async fn run_pipeline(url: &str, config: &Config, progress: bool) -> Result<Analysis> {
    let analyzer = GeminiAnalyzer::new(&config.model)?;
    tracing::debug!("Using model {}", analyzer.model_name());
    let orchestrator = Orchestrator::new(build_selector(config)?, Arc::new(analyzer));

    let spinner = progress.then(|| stage_spinner(orchestrator.subscribe()));
    let result = run_interruptible(orchestrator.analyze(url), || orchestrator.cancel()).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    result.map_err(|err| anyhow::anyhow!("{err}"))
}
