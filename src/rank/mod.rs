//! File ranking by importance
//!
//! Only a bounded number of files reach the analysis step, so the sample is
//! biased toward readmes and shallow (root-level) paths.

use crate::domain::TreeEntry;
use crate::utils::{is_readme, path_depth};
use std::cmp::Ordering;

/// Priority order between two candidate paths.
///
/// Readmes come first. Among non-readmes, fewer path separators come first.
/// Everything else compares equal, so a stable sort keeps listing order for
/// ties (two readmes, or two paths at the same depth).
pub fn compare_priority(a: &str, b: &str) -> Ordering {
    match (is_readme(a), is_readme(b)) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => path_depth(a).cmp(&path_depth(b)),
    }
}

/// Sort entries by priority (stable) and keep at most `max_files`.
pub fn rank_entries(mut entries: Vec<TreeEntry>, max_files: usize) -> Vec<TreeEntry> {
    entries.sort_by(|a, b| compare_priority(&a.path, &b.path));
    entries.truncate(max_files);
    entries
}
