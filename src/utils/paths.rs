//! Repository path helpers

/// Number of `/` separators in a repository-relative path.
pub fn path_depth(path: &str) -> usize {
    path.matches('/').count()
}

/// Whether a path names a readme at any depth, in any case.
pub fn is_readme(path: &str) -> bool {
    path.to_lowercase().contains("readme")
}
