//! Hosting provider seam: tree listing and raw content endpoints.

use crate::domain::{RepositoryIdentifier, TreeEntry};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    /// The endpoint answered with a non-success status.
    #[error("{status} {reason}")]
    Status { status: u16, reason: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl HostError {
    pub fn status(status: u16, reason: impl Into<String>) -> Self {
        Self::Status { status, reason: reason.into() }
    }

    /// Human-readable description of the provider's answer.
    pub fn description(&self) -> String {
        match self {
            HostError::Status { status, reason } if reason.is_empty() => format!("HTTP {status}"),
            HostError::Status { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}

/// Read-only access to a code hosting provider.
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Recursive listing of every path at `repository.branch`.
    async fn list_tree(
        &self,
        repository: &RepositoryIdentifier,
    ) -> Result<Vec<TreeEntry>, HostError>;

    /// Raw bytes of one file at `repository.branch`.
    async fn fetch_raw(
        &self,
        repository: &RepositoryIdentifier,
        path: &str,
    ) -> Result<Vec<u8>, HostError>;

    /// Name used in logs.
    fn host_name(&self) -> &str;
}
