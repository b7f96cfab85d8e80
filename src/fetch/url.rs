//! GitHub URL parsing

use crate::domain::{RepositoryIdentifier, PRIMARY_BRANCH};
use once_cell::sync::Lazy;
use regex::Regex;

static GITHUB_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.)?github\.com/([^/?#]+)/([^/?#]+)(?:/tree/([^/?#]+))?")
        .expect("GitHub URL pattern is valid")
});

/// Parse a GitHub URL, defaulting the branch to `main`.
///
/// Examples:
/// - `https://github.com/owner/repo`              → `owner/repo@main`
/// - `https://github.com/owner/repo/`             → `owner/repo@main`
/// - `https://github.com/owner/repo.git`          → `owner/repo@main`
/// - `https://github.com/owner/repo/tree/develop` → `owner/repo@develop`
/// - `https://github.com/owner`                   → `None`
pub fn parse_repo_url(raw: &str) -> Option<RepositoryIdentifier> {
    parse_repo_url_with_default(raw, PRIMARY_BRANCH)
}

/// Parse a GitHub URL, using `default_branch` when no `/tree/<branch>` is given.
pub fn parse_repo_url_with_default(
    raw: &str,
    default_branch: &str,
) -> Option<RepositoryIdentifier> {
    let cleaned = raw.trim().trim_end_matches('/');
    let caps = GITHUB_URL.captures(cleaned)?;

    let owner = caps.get(1)?.as_str();
    let repo = caps.get(2)?.as_str();
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if owner.is_empty() || repo.is_empty() {
        return None;
    }

    let branch = caps.get(3).map(|m| m.as_str()).unwrap_or(default_branch);
    Some(RepositoryIdentifier::new(owner, repo, branch))
}
