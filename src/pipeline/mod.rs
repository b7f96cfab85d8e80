//! Analysis orchestration: URL → files → report → chat session.
//!
//! Stage transitions are published on a watch channel so a front end can
//! follow progress. Each run owns a cancellation token; starting a new run
//! cancels the previous one, and a superseded run never publishes again.

use crate::analysis::Analyzer;
use crate::chat::ChatRelay;
use crate::domain::{AnalysisReport, FileRecord, RepositoryIdentifier, SelectionStats};
use crate::fetch::{parse_repo_url_with_default, ContentSelector, SelectError};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Fetching,
    Analyzing,
    Ready,
    Error,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Idle => "idle",
            Stage::Fetching => "fetching",
            Stage::Analyzing => "analyzing",
            Stage::Ready => "ready",
            Stage::Error => "error",
        };
        f.write_str(label)
    }
}

/// Current stage plus the message of the latest failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageStatus {
    pub stage: Stage,
    pub error: Option<String>,
}

impl StageStatus {
    fn at(stage: Stage) -> Self {
        Self { stage, error: None }
    }
}

/// Failures surfaced to the user; `Display` is the user-facing message.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Please enter a valid GitHub repository URL (https://github.com/<owner>/<repo>).")]
    InvalidUrl(String),

    #[error("Could not access the repository: {0}")]
    RepositoryAccess(String),

    #[error("No readable code files found.")]
    NoReadableFiles,

    #[error("Analysis failed. Please try again.")]
    Analysis(#[source] anyhow::Error),

    #[error("Analysis cancelled.")]
    Cancelled,
}

impl From<SelectError> for PipelineError {
    fn from(err: SelectError) -> Self {
        match err {
            SelectError::RepositoryAccess { reason, .. } => PipelineError::RepositoryAccess(reason),
            SelectError::Cancelled => PipelineError::Cancelled,
        }
    }
}

/// Everything produced by a successful run.
pub struct Analysis {
    pub repository: RepositoryIdentifier,
    pub files: Vec<FileRecord>,
    pub stats: SelectionStats,
    pub report: AnalysisReport,
    pub chat: ChatRelay,
}

pub struct Orchestrator {
    selector: ContentSelector,
    analyzer: Arc<dyn Analyzer>,
    status: watch::Sender<StageStatus>,
    root: CancellationToken,
    current: Mutex<CancellationToken>,
    generation: AtomicU64,
}

impl Orchestrator {
    pub fn new(selector: ContentSelector, analyzer: Arc<dyn Analyzer>) -> Self {
        let (status, _) = watch::channel(StageStatus::at(Stage::Idle));
        let root = CancellationToken::new();
        let current = Mutex::new(root.child_token());
        Self { selector, analyzer, status, root, current, generation: AtomicU64::new(0) }
    }

    /// Follow stage transitions.
    pub fn subscribe(&self) -> watch::Receiver<StageStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> StageStatus {
        self.status.borrow().clone()
    }

    /// Cancel the in-flight run, if any.
    pub fn cancel(&self) {
        self.current_token().cancel();
    }

    /// Token of the run in flight (or of the last run).
    pub fn current_token(&self) -> CancellationToken {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn begin_run(&self) -> (u64, CancellationToken) {
        let token = self.root.child_token();
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        current.cancel();
        *current = token.clone();
        (generation, token)
    }

    /// Publish `status` unless a newer run has started. The check runs under
    /// the channel's lock, so a stale write cannot land after a newer one.
    fn publish(&self, generation: u64, status: StageStatus) {
        self.status.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            tracing::debug!("Stage -> {}", status.stage);
            *current = status;
            true
        });
    }

    /// Run the whole flow for `url`.
    pub async fn analyze(&self, url: &str) -> Result<Analysis, PipelineError> {
        let (generation, cancel) = self.begin_run();
        let result = self.run(generation, url, &cancel).await;

        match &result {
            Ok(_) => self.publish(generation, StageStatus::at(Stage::Ready)),
            Err(PipelineError::Cancelled) => self.publish(generation, StageStatus::at(Stage::Idle)),
            Err(err) => {
                tracing::warn!("Analysis of {} failed: {:?}", url.trim(), err);
                self.publish(
                    generation,
                    StageStatus { stage: Stage::Error, error: Some(err.to_string()) },
                );
            }
        }
        result
    }

    async fn run(
        &self,
        generation: u64,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Analysis, PipelineError> {
        let repository = parse_repo_url_with_default(url, self.selector.primary_branch())
            .ok_or_else(|| PipelineError::InvalidUrl(url.trim().to_string()))?;

        self.publish(generation, StageStatus::at(Stage::Fetching));
        let selection = self.selector.select_files(&repository, cancel).await?;
        if selection.files.is_empty() {
            return Err(PipelineError::NoReadableFiles);
        }

        self.publish(generation, StageStatus::at(Stage::Analyzing));
        let files = selection.files;
        let report = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
            report = self.analyzer.analyze(&files) => report.map_err(PipelineError::Analysis)?,
        };
        let session = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
            session = self.analyzer.open_session(&files, &report) => {
                session.map_err(PipelineError::Analysis)?
            }
        };

        tracing::info!("Analysis of {} ready ({} files)", selection.repository, files.len());
        Ok(Analysis {
            repository: selection.repository,
            files,
            stats: selection.stats,
            report,
            chat: ChatRelay::new(session),
        })
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.root.cancel();
    }
}
