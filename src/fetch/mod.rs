//! Repository acquisition: URL parsing, provider access, file selection

pub mod github;
pub mod host;
pub mod selector;
pub mod url;

pub use github::GitHubHost;
pub use host::{HostError, RepositoryHost};
pub use selector::{ContentSelector, SelectError, Selection};
pub use url::{parse_repo_url, parse_repo_url_with_default};
