//! GitHub tree listing and raw content over the REST API

use crate::domain::{GitHubSettings, RepositoryIdentifier, TreeEntry};
use crate::fetch::host::{HostError, RepositoryHost};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

/// [`RepositoryHost`] backed by `api.github.com` and `raw.githubusercontent.com`.
pub struct GitHubHost {
    client: Client,
    api_base: Url,
    raw_base: Url,
}

impl GitHubHost {
    pub fn new(settings: &GitHubSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        if let Some(token) = settings.token.as_deref().filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .context("GitHub token contains invalid header characters")?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        let api_base = Url::parse(&settings.api_base)
            .with_context(|| format!("Invalid GitHub API base URL: {}", settings.api_base))?;
        let raw_base = Url::parse(&settings.raw_base)
            .with_context(|| format!("Invalid raw content base URL: {}", settings.raw_base))?;

        Ok(Self { client, api_base, raw_base })
    }

    fn tree_url(&self, repository: &RepositoryIdentifier) -> Result<Url, HostError> {
        let mut url = join_segments(
            &self.api_base,
            [
                "repos",
                repository.owner.as_str(),
                repository.repo.as_str(),
                "git",
                "trees",
                repository.branch.as_str(),
            ],
        )?;
        url.query_pairs_mut().append_pair("recursive", "1");
        Ok(url)
    }

    fn raw_url(&self, repository: &RepositoryIdentifier, path: &str) -> Result<Url, HostError> {
        let RepositoryIdentifier { owner, repo, branch } = repository;
        let segments =
            [owner.as_str(), repo.as_str(), branch.as_str()].into_iter().chain(path.split('/'));
        join_segments(&self.raw_base, segments)
    }
}

/// Append percent-encoded path segments to a base URL.
fn join_segments<'a>(
    base: &Url,
    segments: impl IntoIterator<Item = &'a str>,
) -> Result<Url, HostError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| HostError::Decode(format!("{base} cannot be used as a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn check_status(response: Response) -> Result<Response, HostError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(HostError::status(status.as_u16(), status.canonical_reason().unwrap_or_default()))
    }
}

#[async_trait]
impl RepositoryHost for GitHubHost {
    async fn list_tree(
        &self,
        repository: &RepositoryIdentifier,
    ) -> Result<Vec<TreeEntry>, HostError> {
        let url = self.tree_url(repository)?;
        tracing::debug!("Listing tree: {}", url);

        let response = check_status(self.client.get(url).send().await?)?;
        let body: TreeResponse = response
            .json()
            .await
            .map_err(|e| HostError::Decode(format!("tree listing: {e}")))?;

        if body.truncated {
            tracing::warn!(
                "Tree listing for {} was truncated by GitHub; sampling from {} entries",
                repository,
                body.tree.len()
            );
        }
        Ok(body.tree)
    }

    async fn fetch_raw(
        &self,
        repository: &RepositoryIdentifier,
        path: &str,
    ) -> Result<Vec<u8>, HostError> {
        let url = self.raw_url(repository, path)?;
        let response = check_status(self.client.get(url).send().await?)?;
        Ok(response.bytes().await?.to_vec())
    }

    fn host_name(&self) -> &str {
        "github"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> GitHubHost {
        GitHubHost::new(&GitHubSettings::default()).expect("host")
    }

    #[test]
    fn test_tree_url() {
        let id = RepositoryIdentifier::new("rust-lang", "cargo", "master");
        let url = host().tree_url(&id).expect("url");
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/rust-lang/cargo/git/trees/master?recursive=1"
        );
    }

    #[test]
    fn test_host_name_for_logs() {
        assert_eq!(host().host_name(), "github");
    }

    #[test]
    fn test_raw_url_encodes_segments() {
        let id = RepositoryIdentifier::new("o", "r", "main");
        let url = host().raw_url(&id, "docs/getting started.md").expect("url");
        assert_eq!(
            url.as_str(),
            "https://raw.githubusercontent.com/o/r/main/docs/getting%20started.md"
        );
    }

    #[test]
    fn test_custom_base_with_path_prefix() {
        let settings = GitHubSettings {
            api_base: "https://ghe.example.com/api/v3/".to_string(),
            ..GitHubSettings::default()
        };
        let host = GitHubHost::new(&settings).expect("host");
        let id = RepositoryIdentifier::new("o", "r", "main");
        assert_eq!(
            host.tree_url(&id).expect("url").as_str(),
            "https://ghe.example.com/api/v3/repos/o/r/git/trees/main?recursive=1"
        );
    }

    #[test]
    fn test_tree_response_parses_entry_kinds() {
        let raw = r#"{
            "sha": "abc",
            "tree": [
                {"path": "src", "mode": "040000", "type": "tree", "sha": "1"},
                {"path": "src/main.rs", "mode": "100644", "type": "blob", "sha": "2", "size": 42},
                {"path": "vendored", "mode": "160000", "type": "commit", "sha": "3"},
                {"path": "odd", "type": "symlink"}
            ],
            "truncated": false
        }"#;
        let body: TreeResponse = serde_json::from_str(raw).expect("parse");
        assert_eq!(body.tree.len(), 4);
        assert!(body.tree[1].is_file());
        assert_eq!(body.tree[1].size, Some(42));
        assert_eq!(body.tree[2].kind, crate::domain::EntryKind::Commit);
        assert_eq!(body.tree[3].kind, crate::domain::EntryKind::Other);
    }

    #[test]
    fn test_status_description() {
        assert_eq!(HostError::status(404, "Not Found").description(), "Not Found");
        assert_eq!(HostError::status(599, "").description(), "HTTP 599");
    }
}
