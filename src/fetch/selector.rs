//! Content selection: list, filter, rank, fetch, cap.

use crate::domain::{
    FileRecord, RepositoryIdentifier, SelectionSettings, SelectionStats, TreeEntry,
    TRUNCATION_MARKER,
};
use crate::fetch::host::{HostError, RepositoryHost};
use crate::rank::rank_entries;
use crate::scan::TreeFilter;
use crate::utils::{decode_text, truncate_chars};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum SelectError {
    /// The tree could not be listed under any supported branch name.
    #[error("could not access repository {repository}: {reason}")]
    RepositoryAccess { repository: String, reason: String },

    #[error("file selection cancelled")]
    Cancelled,
}

/// Outcome of a successful selection.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Identifier whose branch actually produced the tree.
    pub repository: RepositoryIdentifier,
    /// Non-empty records, in rank order.
    pub files: Vec<FileRecord>,
    pub stats: SelectionStats,
}

/// Picks a bounded, representative sample of a repository's files.
pub struct ContentSelector {
    host: Arc<dyn RepositoryHost>,
    filter: TreeFilter,
    primary_branch: String,
    fallback_branch: String,
    max_files: usize,
    max_file_chars: usize,
    concurrency: usize,
}

impl ContentSelector {
    pub fn new(host: Arc<dyn RepositoryHost>) -> Self {
        Self::with_settings(host, &SelectionSettings::default())
    }

    pub fn with_settings(host: Arc<dyn RepositoryHost>, settings: &SelectionSettings) -> Self {
        Self {
            host,
            filter: TreeFilter::new()
                .include_extensions(settings.include_extensions.clone())
                .exclude_dirs(settings.exclude_dirs.clone()),
            primary_branch: settings.primary_branch.clone(),
            fallback_branch: settings.fallback_branch.clone(),
            max_files: settings.max_files,
            max_file_chars: settings.max_file_chars,
            concurrency: settings.fetch_concurrency.max(1),
        }
    }

    /// Set the maximum number of files fetched
    pub fn max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    /// Set the per-file character cap
    pub fn max_file_chars(mut self, max_chars: usize) -> Self {
        self.max_file_chars = max_chars;
        self
    }

    pub fn primary_branch(&self) -> &str {
        &self.primary_branch
    }

    /// Select and fetch files for `repository`.
    ///
    /// Fails only if no tree listing can be obtained; individual file
    /// failures shrink the sample instead.
    pub async fn select_files(
        &self,
        repository: &RepositoryIdentifier,
        cancel: &CancellationToken,
    ) -> Result<Selection, SelectError> {
        let (resolved, entries, used_fallback) = self.list_tree(repository, cancel).await?;

        let mut stats = SelectionStats {
            entries_listed: entries.len(),
            used_fallback_branch: used_fallback,
            ..SelectionStats::default()
        };

        let eligible = self.filter.apply(entries);
        stats.files_eligible = eligible.len();

        let selected = rank_entries(eligible, self.max_files);
        stats.files_selected = selected.len();
        tracing::info!(
            "Selected {} of {} eligible files from {} on {} ({} listed)",
            stats.files_selected,
            stats.files_eligible,
            resolved,
            self.host.host_name(),
            stats.entries_listed
        );

        let fetches = stream::iter(selected)
            .map(|entry| self.fetch_record(&resolved, entry))
            .buffered(self.concurrency)
            .collect::<Vec<_>>();

        let records = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SelectError::Cancelled),
            records = fetches => records,
        };

        let mut files = Vec::with_capacity(records.len());
        for record in records {
            if record.is_empty() {
                stats.fetch_failures += 1;
                continue;
            }
            if record.was_truncated() {
                stats.files_truncated += 1;
            }
            files.push(record);
        }
        stats.files_fetched = files.len();

        if stats.fetch_failures > 0 {
            tracing::info!("{} files could not be fetched and were skipped", stats.fetch_failures);
        }

        Ok(Selection { repository: resolved, files, stats })
    }

    /// List the tree, retrying once on the fallback branch when the primary
    /// branch fails.
    async fn list_tree(
        &self,
        repository: &RepositoryIdentifier,
        cancel: &CancellationToken,
    ) -> Result<(RepositoryIdentifier, Vec<TreeEntry>, bool), SelectError> {
        match self.list_once(repository, cancel).await? {
            Ok(entries) => Ok((repository.clone(), entries, false)),
            Err(err) if repository.branch == self.primary_branch => {
                tracing::warn!(
                    "Tree listing for {} on {} failed ({}); retrying with branch '{}'",
                    repository,
                    self.host.host_name(),
                    err.description(),
                    self.fallback_branch
                );
                let fallback = repository.with_branch(self.fallback_branch.clone());
                match self.list_once(&fallback, cancel).await? {
                    Ok(entries) => Ok((fallback, entries, true)),
                    Err(err) => Err(access_error(&fallback, &err)),
                }
            }
            Err(err) => Err(access_error(repository, &err)),
        }
    }

    async fn list_once(
        &self,
        repository: &RepositoryIdentifier,
        cancel: &CancellationToken,
    ) -> Result<Result<Vec<TreeEntry>, HostError>, SelectError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SelectError::Cancelled),
            result = self.host.list_tree(repository) => Ok(result),
        }
    }

    /// Fetch one file. Failures produce an empty record.
    async fn fetch_record(
        &self,
        repository: &RepositoryIdentifier,
        entry: TreeEntry,
    ) -> FileRecord {
        let bytes = match self.host.fetch_raw(repository, &entry.path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::debug!("Skipping {}: {}", entry.path, err);
                return FileRecord::empty(entry.path);
            }
        };

        let Some(text) = decode_text(&bytes) else {
            tracing::debug!("Skipping {}: binary content", entry.path);
            return FileRecord::empty(entry.path);
        };

        let (content, size) = truncate_chars(text, self.max_file_chars, TRUNCATION_MARKER);
        let truncated = size > self.max_file_chars;
        FileRecord { path: entry.path, content, size, truncated }
    }
}

fn access_error(repository: &RepositoryIdentifier, err: &HostError) -> SelectError {
    SelectError::RepositoryAccess { repository: repository.to_string(), reason: err.description() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeHost;

    fn id(branch: &str) -> RepositoryIdentifier {
        RepositoryIdentifier::new("octo", "demo", branch)
    }

    fn selector(host: &Arc<FakeHost>) -> ContentSelector {
        ContentSelector::new(host.clone())
    }

    async fn select(host: &Arc<FakeHost>, branch: &str) -> Result<Selection, SelectError> {
        selector(host).select_files(&id(branch), &CancellationToken::new()).await
    }

    #[tokio::test]
    async fn test_filters_noise_and_keeps_sources() {
        let host = Arc::new(
            FakeHost::new()
                .with_file("main", "src/index.ts", "export {}")
                .with_file("main", "node_modules/pkg/index.js", "module.exports = 1")
                .with_file("main", "logo.png", "png"),
        );

        let selection = select(&host, "main").await.expect("select");
        let paths: Vec<&str> = selection.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["src/index.ts"]);
        assert_eq!(selection.stats.entries_listed, 3);
        assert_eq!(selection.stats.files_eligible, 1);
        assert!(!host.fetched_paths().iter().any(|p| p.contains("node_modules")));
    }

    #[tokio::test]
    async fn test_caps_count_and_ranks_readme_first() {
        let mut host = FakeHost::new();
        for i in 0..120 {
            host = host.with_file("main", &format!("src/mod{i}.rs"), "fn x() {}");
        }
        host = host.with_file("main", "docs/deep/README.md", "# Demo");
        let host = Arc::new(host);

        let selection = select(&host, "main").await.expect("select");
        assert_eq!(selection.files.len(), 100);
        assert_eq!(selection.files[0].path, "docs/deep/README.md");
        assert!(selection.files[1..].iter().all(|f| !f.path.to_lowercase().contains("readme")));
        assert_eq!(host.fetched_paths().len(), 100);
    }

    #[tokio::test]
    async fn test_truncates_long_content_and_keeps_original_size() {
        let long = "x".repeat(60_000);
        let host = Arc::new(FakeHost::new().with_file("main", "big.js", &long));

        let selection = select(&host, "main").await.expect("select");
        let record = &selection.files[0];
        assert!(record.content.ends_with(TRUNCATION_MARKER));
        assert_eq!(record.content.len(), 50_000 + TRUNCATION_MARKER.len());
        assert_eq!(record.size, 60_000);
        assert!(record.was_truncated());
        assert_eq!(selection.stats.files_truncated, 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_dropped_silently() {
        let host = Arc::new(
            FakeHost::new()
                .with_file("main", "a.rs", "fn a() {}")
                .with_failing_file("main", "b.rs")
                .with_file("main", "empty.rs", ""),
        );

        let selection = select(&host, "main").await.expect("select");
        let paths: Vec<&str> = selection.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["a.rs"]);
        assert_eq!(selection.stats.fetch_failures, 2);
        assert_eq!(selection.stats.files_fetched, 1);
    }

    #[tokio::test]
    async fn test_binary_payload_is_dropped() {
        let host = Arc::new(
            FakeHost::new()
                .with_bytes("main", "data.json", vec![0x00, 0x01, 0x02])
                .with_file("main", "ok.json", "{}"),
        );
        let selection = select(&host, "main").await.expect("select");
        assert_eq!(selection.files.len(), 1);
        assert_eq!(selection.files[0].path, "ok.json");
    }

    #[tokio::test]
    async fn test_falls_back_to_master_once() {
        let host = Arc::new(FakeHost::new().with_file("master", "lib.rs", "pub fn f() {}"));

        let selection = select(&host, "main").await.expect("select");
        assert_eq!(host.tree_requests(), vec!["main".to_string(), "master".to_string()]);
        assert_eq!(selection.repository.branch, "master");
        assert!(selection.stats.used_fallback_branch);
        assert_eq!(selection.files[0].path, "lib.rs");
        assert_eq!(host.fetched_paths(), vec!["master:lib.rs".to_string()]);
    }

    #[tokio::test]
    async fn test_both_branches_failing_is_access_error() {
        let host = Arc::new(FakeHost::new());

        let err = select(&host, "main").await.unwrap_err();
        assert!(matches!(err, SelectError::RepositoryAccess { .. }));
        assert!(err.to_string().contains("Not Found"));
        assert_eq!(host.tree_requests().len(), 2);
        assert!(host.fetched_paths().is_empty());
    }

    #[tokio::test]
    async fn test_non_default_branch_is_not_retried() {
        let host = Arc::new(FakeHost::new().with_file("master", "lib.rs", "x"));

        let err = select(&host, "develop").await.unwrap_err();
        assert!(matches!(err, SelectError::RepositoryAccess { .. }));
        assert_eq!(host.tree_requests(), vec!["develop".to_string()]);
    }

    #[tokio::test]
    async fn test_cancelled_before_listing() {
        let host = Arc::new(FakeHost::new().with_file("main", "a.rs", "x"));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = selector(&host).select_files(&id("main"), &cancel).await.unwrap_err();
        assert!(matches!(err, SelectError::Cancelled));
    }

    #[tokio::test]
    async fn test_custom_limits() {
        let host = Arc::new(
            FakeHost::new()
                .with_file("main", "a.rs", "abcdef")
                .with_file("main", "b.rs", "abc")
                .with_file("main", "c.rs", "abc"),
        );
        let selection = selector(&host)
            .max_files(2)
            .max_file_chars(4)
            .select_files(&id("main"), &CancellationToken::new())
            .await
            .expect("select");
        assert_eq!(selection.files.len(), 2);
        assert_eq!(selection.files[0].content, format!("abcd{TRUNCATION_MARKER}"));
        assert_eq!(selection.files[0].size, 6);
        assert_eq!(selection.files[1].content, "abc");
        assert!(selection.files[0].was_truncated());
        assert!(!selection.files[1].was_truncated());
    }

    #[tokio::test]
    async fn test_content_ending_in_marker_is_not_truncated() {
        let text = format!("see the log line{TRUNCATION_MARKER}");
        let host = Arc::new(FakeHost::new().with_file("main", "notes.md", &text));

        let selection = select(&host, "main").await.expect("select");
        let record = &selection.files[0];
        assert_eq!(record.content, text);
        assert_eq!(record.size, text.chars().count());
        assert!(!record.was_truncated());
        assert_eq!(selection.stats.files_truncated, 0);
    }
}
