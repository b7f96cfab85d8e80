//! Tree filtering: which listed entries are worth sampling.

use crate::domain::{default_exclude_dirs, default_include_extensions, TreeEntry};

/// Keeps source and documentation files outside noise directories.
///
/// Both tests are plain substring/suffix checks on the repository path.
#[derive(Debug, Clone)]
pub struct TreeFilter {
    include_extensions: Vec<String>,
    exclude_dirs: Vec<String>,
}

impl Default for TreeFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeFilter {
    pub fn new() -> Self {
        Self {
            include_extensions: default_include_extensions()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude_dirs: default_exclude_dirs().iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Set file extensions to include (e.g., ".rs", ".py")
    pub fn include_extensions(mut self, extensions: Vec<String>) -> Self {
        self.include_extensions = extensions;
        self
    }

    /// Set directory names whose contents are skipped
    pub fn exclude_dirs(mut self, dirs: Vec<String>) -> Self {
        self.exclude_dirs = dirs;
        self
    }

    fn is_excluded(&self, path: &str) -> bool {
        self.exclude_dirs.iter().any(|dir| {
            let segment = format!("{}/", dir.trim_end_matches('/'));
            path.contains(&segment)
        })
    }

    fn has_included_extension(&self, path: &str) -> bool {
        self.include_extensions.iter().any(|ext| path.ends_with(ext.as_str()))
    }

    pub fn accepts(&self, entry: &TreeEntry) -> bool {
        entry.is_file()
            && !self.is_excluded(&entry.path)
            && self.has_included_extension(&entry.path)
    }

    /// Keep the accepted entries, in listing order.
    pub fn apply(&self, entries: Vec<TreeEntry>) -> Vec<TreeEntry> {
        entries.into_iter().filter(|entry| self.accepts(entry)).collect()
    }
}
