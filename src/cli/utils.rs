//! Shared CLI utilities.

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::config::{load_layered, merge_cli_with_config, CliOverrides};
use crate::domain::Config;
use crate::fetch::{ContentSelector, GitHubHost};
use crate::pipeline::{Stage, StageStatus};

/// Parse a comma-separated string into a `Vec<String>`, trimming whitespace and
/// discarding empty segments.  Returns `None` when `value` is `None`.
pub fn parse_csv(value: &Option<String>) -> Option<Vec<String>> {
    value.as_ref().map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.to_string())
            .collect::<Vec<_>>()
    })
}

/// Flags shared by every command that selects files.
#[derive(Args, Debug, Default)]
pub struct SelectionArgs {
    /// Maximum number of files to fetch [default: 100]
    #[arg(long, value_name = "N")]
    pub max_files: Option<usize>,

    /// Characters kept per file before truncation [default: 50000]
    #[arg(long, value_name = "CHARS")]
    pub max_file_chars: Option<usize>,

    /// Concurrent raw content requests [default: 16]
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Include only these extensions (comma-separated)
    #[arg(short = 'i', long, value_name = "EXTS")]
    pub include_ext: Option<String>,

    /// Skip paths under these directories (comma-separated)
    #[arg(short = 'e', long, value_name = "DIRS")]
    pub exclude_dir: Option<String>,
}

impl SelectionArgs {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            max_files: self.max_files,
            max_file_chars: self.max_file_chars,
            fetch_concurrency: self.concurrency,
            include_extensions: parse_csv(&self.include_ext),
            exclude_dirs: parse_csv(&self.exclude_dir),
            ..CliOverrides::default()
        }
    }
}

/// Config file (discovered in the working directory unless given), then
/// environment, then command-line values.
pub fn load_settings(config_path: Option<&Path>, overrides: CliOverrides) -> Result<Config> {
    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    let config = load_layered(&cwd, config_path)?;
    Ok(merge_cli_with_config(config, overrides))
}

pub fn build_selector(config: &Config) -> Result<ContentSelector> {
    let host = GitHubHost::new(&config.github)?;
    Ok(ContentSelector::with_settings(Arc::new(host), &config.selection))
}

/// Drive `work` to completion; on Ctrl-C call `interrupt` and keep waiting so
/// the work can wind down through its cancellation token.
pub async fn run_interruptible<F, I>(work: F, interrupt: I) -> F::Output
where
    F: Future,
    I: FnOnce(),
{
    tokio::pin!(work);
    tokio::select! {
        output = &mut work => output,
        _ = tokio::signal::ctrl_c() => {
            tracing::debug!("Interrupted, cancelling");
            interrupt();
            work.await
        }
    }
}

pub fn stage_message(stage: Stage) -> &'static str {
    match stage {
        Stage::Idle => "Waiting",
        Stage::Fetching => "Fetching repository files...",
        Stage::Analyzing => "Analyzing code...",
        Stage::Ready => "Done",
        Stage::Error => "Failed",
    }
}

/// Spinner whose message follows stage updates until the sender goes away
/// or the spinner is finished.
pub fn stage_spinner(mut updates: watch::Receiver<StageStatus>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(stage_message(updates.borrow().stage));
    pb.enable_steady_tick(Duration::from_millis(100));

    let handle = pb.clone();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            if handle.is_finished() {
                break;
            }
            let stage = updates.borrow_and_update().stage;
            handle.set_message(stage_message(stage));
        }
    });
    pb
}
