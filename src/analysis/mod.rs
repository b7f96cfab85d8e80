//! Analysis and conversation seams
//!
//! The model service is reached through two traits: an [`Analyzer`] turns a
//! file sample into an [`AnalysisReport`] and opens a [`ChatSession`] seeded
//! with that sample and report.

use crate::domain::{AnalysisReport, ChatMessage, FileRecord};
use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

pub mod prompt;

/// Incremental text fragments of one assistant reply.
pub type FragmentStream = BoxStream<'static, Result<String>>;

#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Produce a report for a non-empty file sample.
    async fn analyze(&self, files: &[FileRecord]) -> Result<AnalysisReport>;

    /// Open a conversation whose context holds the files and the report.
    async fn open_session(
        &self,
        files: &[FileRecord],
        report: &AnalysisReport,
    ) -> Result<Box<dyn ChatSession>>;
}

/// One conversation about one analyzed repository.
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Stream the assistant's reply to `history`, whose last message is the
    /// user's new turn.
    async fn stream_reply(&self, history: &[ChatMessage]) -> Result<FragmentStream>;
}
