//! Core domain types shared across the crate.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod config;
pub mod report;

pub use config::{Config, GitHubSettings, ModelSettings, SelectionSettings};
pub use report::{
    AnalysisReport, ImportantFile, ReportPayload, ReportSchema, TechnicalDecision,
    REPORT_SCHEMA_VERSION,
};

/// Branch assumed when a URL carries no `/tree/<branch>` segment.
pub const PRIMARY_BRANCH: &str = "main";

/// Branch tried once when the tree listing for [`PRIMARY_BRANCH`] fails.
pub const FALLBACK_BRANCH: &str = "master";

/// Maximum number of files sent to the analysis step.
pub const DEFAULT_MAX_FILES: usize = 100;

/// Maximum number of characters kept per file.
pub const DEFAULT_MAX_FILE_CHARS: usize = 50_000;

/// Appended to content that was cut at the character cap.
pub const TRUNCATION_MARKER: &str = "... [truncated]";

/// Owner/repository/branch triple identifying what to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryIdentifier {
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl RepositoryIdentifier {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self { owner: owner.into(), repo: repo.into(), branch: branch.into() }
    }

    /// Same repository, different branch.
    pub fn with_branch(&self, branch: impl Into<String>) -> Self {
        Self { owner: self.owner.clone(), repo: self.repo.clone(), branch: branch.into() }
    }

    /// `owner/repo`, without the branch.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for RepositoryIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.branch)
    }
}

/// Kind of an entry in a recursive tree listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    Commit,
    #[serde(other)]
    Other,
}

/// One entry of the hosting provider's recursive file tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub sha: Option<String>,
}

impl TreeEntry {
    pub fn blob(path: impl Into<String>) -> Self {
        Self { path: path.into(), kind: EntryKind::Blob, size: None, sha: None }
    }

    pub fn tree(path: impl Into<String>) -> Self {
        Self { path: path.into(), kind: EntryKind::Tree, size: None, sha: None }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::Blob
    }
}

/// A fetched source file.
///
/// `size` is the length of the text as fetched, in characters, even when
/// `content` was truncated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    pub content: String,
    pub size: usize,
    /// Set when `content` was cut at the character cap.
    #[serde(default)]
    pub truncated: bool,
}

impl FileRecord {
    pub fn empty(path: impl Into<String>) -> Self {
        Self { path: path.into(), content: String::new(), size: 0, truncated: false }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Whether `content` holds only a prefix of the fetched text.
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }
}

/// Counters collected while selecting files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionStats {
    pub entries_listed: usize,
    pub files_eligible: usize,
    pub files_selected: usize,
    pub files_fetched: usize,
    pub fetch_failures: usize,
    pub files_truncated: usize,
    pub used_fallback_branch: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatRole::User => write!(f, "user"),
            ChatRole::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

/// Directories whose contents never make it into a sample.
pub fn default_exclude_dirs() -> &'static [&'static str] {
    &["node_modules", ".git", "dist", "build", "vendor", "assets", "images", "public"]
}

/// Extensions considered source or documentation.
pub fn default_include_extensions() -> &'static [&'static str] {
    &[
        ".ts", ".tsx", ".js", ".jsx", ".py", ".go", ".rs", ".java", ".c", ".cpp", ".h", ".cs",
        ".md", ".json", ".yml", ".yaml",
    ]
}
