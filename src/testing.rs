//! In-memory fakes for the provider and model seams, shared by unit tests.

use crate::analysis::{Analyzer, ChatSession, FragmentStream};
use crate::domain::{AnalysisReport, ChatMessage, FileRecord, RepositoryIdentifier, TreeEntry};
use crate::fetch::host::{HostError, RepositoryHost};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type FileTable = Vec<(String, Option<Vec<u8>>)>;

/// Repository host serving fixed trees per branch.
///
/// Branches without files answer tree requests with 404.
#[derive(Default)]
pub struct FakeHost {
    branches: HashMap<String, FileTable>,
    tree_requests: Mutex<Vec<String>>,
    fetched: Mutex<Vec<String>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, branch: &str, path: &str, content: &str) -> Self {
        self.with_bytes(branch, path, content.as_bytes().to_vec())
    }

    pub fn with_bytes(mut self, branch: &str, path: &str, bytes: Vec<u8>) -> Self {
        self.branches.entry(branch.to_string()).or_default().push((path.to_string(), Some(bytes)));
        self
    }

    /// Listed in the tree, but raw fetches answer 500.
    pub fn with_failing_file(mut self, branch: &str, path: &str) -> Self {
        self.branches.entry(branch.to_string()).or_default().push((path.to_string(), None));
        self
    }

    /// Branches whose tree was requested, in order.
    pub fn tree_requests(&self) -> Vec<String> {
        self.tree_requests.lock().expect("lock").clone()
    }

    /// `branch:path` of every raw fetch, sorted.
    pub fn fetched_paths(&self) -> Vec<String> {
        let mut fetched = self.fetched.lock().expect("lock").clone();
        fetched.sort();
        fetched
    }
}

#[async_trait]
impl RepositoryHost for FakeHost {
    async fn list_tree(
        &self,
        repository: &RepositoryIdentifier,
    ) -> Result<Vec<TreeEntry>, HostError> {
        self.tree_requests.lock().expect("lock").push(repository.branch.clone());
        let files = self
            .branches
            .get(&repository.branch)
            .ok_or_else(|| HostError::status(404, "Not Found"))?;
        Ok(files.iter().map(|(path, _)| TreeEntry::blob(path.clone())).collect())
    }

    async fn fetch_raw(
        &self,
        repository: &RepositoryIdentifier,
        path: &str,
    ) -> Result<Vec<u8>, HostError> {
        self.fetched.lock().expect("lock").push(format!("{}:{}", repository.branch, path));
        self.branches
            .get(&repository.branch)
            .and_then(|files| files.iter().find(|(p, _)| p == path))
            .and_then(|(_, bytes)| bytes.clone())
            .ok_or_else(|| HostError::status(500, "Internal Server Error"))
    }

    fn host_name(&self) -> &str {
        "fake"
    }
}

/// Chat session replaying scripted fragments; `None` entries become stream errors.
#[derive(Clone, Default)]
pub struct ScriptedSession {
    replies: Arc<Mutex<Vec<Vec<Option<String>>>>>,
    seen: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
    fail_open: bool,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, fragments: &[&str]) -> Self {
        let script = fragments.iter().map(|f| Some(f.to_string())).collect();
        self.replies.lock().expect("lock").push(script);
        self
    }

    pub fn reply_then_fail(self, fragments: &[&str]) -> Self {
        let mut script: Vec<Option<String>> =
            fragments.iter().map(|f| Some(f.to_string())).collect();
        script.push(None);
        self.replies.lock().expect("lock").push(script);
        self
    }

    pub fn failing_to_open() -> Self {
        Self { fail_open: true, ..Self::default() }
    }

    /// Histories passed to each `stream_reply` call.
    pub fn seen(&self) -> Vec<Vec<ChatMessage>> {
        self.seen.lock().expect("lock").clone()
    }
}

#[async_trait]
impl ChatSession for ScriptedSession {
    async fn stream_reply(&self, history: &[ChatMessage]) -> Result<FragmentStream> {
        self.seen.lock().expect("lock").push(history.to_vec());
        if self.fail_open {
            return Err(anyhow!("session unavailable"));
        }
        let script = {
            let mut replies = self.replies.lock().expect("lock");
            if replies.is_empty() {
                Vec::new()
            } else {
                replies.remove(0)
            }
        };
        let items = script.into_iter().map(|item| item.ok_or_else(|| anyhow!("stream broke")));
        Ok(stream::iter(items).boxed())
    }
}

/// Analyzer returning a fixed report and a scripted session.
pub struct FakeAnalyzer {
    pub report: Option<AnalysisReport>,
    pub session: ScriptedSession,
    pub fail_session: bool,
    pub analyzed: Mutex<Vec<Vec<FileRecord>>>,
}

impl FakeAnalyzer {
    pub fn ok() -> Self {
        Self {
            report: Some(sample_report()),
            session: ScriptedSession::new(),
            fail_session: false,
            analyzed: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self { report: None, ..Self::ok() }
    }

    pub fn analyzed_count(&self) -> usize {
        self.analyzed.lock().expect("lock").len()
    }
}

#[async_trait]
impl Analyzer for FakeAnalyzer {
    async fn analyze(&self, files: &[FileRecord]) -> Result<AnalysisReport> {
        self.analyzed.lock().expect("lock").push(files.to_vec());
        self.report.clone().ok_or_else(|| anyhow!("model returned 500"))
    }

    async fn open_session(
        &self,
        _files: &[FileRecord],
        _report: &AnalysisReport,
    ) -> Result<Box<dyn ChatSession>> {
        if self.fail_session {
            return Err(anyhow!("could not open session"));
        }
        Ok(Box::new(self.session.clone()))
    }
}

pub fn sample_report() -> AnalysisReport {
    AnalysisReport::from_json(
        r#"{
            "mission": "Demo service",
            "architectureSimple": "Layers",
            "importantFiles": [{"path": "src/main.rs", "role": "entry point"}],
            "techStack": ["Rust"],
            "suggestedQuestions": ["Where does it start?"]
        }"#,
    )
    .expect("sample report")
}
