//! Configuration model

use serde::{Deserialize, Deserializer, Serialize};

use super::{
    default_exclude_dirs, default_include_extensions, DEFAULT_MAX_FILES, DEFAULT_MAX_FILE_CHARS,
    FALLBACK_BRANCH, PRIMARY_BRANCH,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub github: GitHubSettings,
    pub selection: SelectionSettings,
    pub model: ModelSettings,
}

/// Hosting provider endpoints and credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubSettings {
    pub api_base: String,
    pub raw_base: String,
    /// Personal access token; raises the unauthenticated rate limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            raw_base: "https://raw.githubusercontent.com".to_string(),
            token: None,
            user_agent: format!("repo-guide/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
        }
    }
}

/// How files are chosen from a repository tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    pub primary_branch: String,
    pub fallback_branch: String,
    pub max_files: usize,
    pub max_file_chars: usize,
    pub fetch_concurrency: usize,
    #[serde(deserialize_with = "deserialize_extensions")]
    pub include_extensions: Vec<String>,
    #[serde(deserialize_with = "deserialize_string_list")]
    pub exclude_dirs: Vec<String>,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            primary_branch: PRIMARY_BRANCH.to_string(),
            fallback_branch: FALLBACK_BRANCH.to_string(),
            max_files: DEFAULT_MAX_FILES,
            max_file_chars: DEFAULT_MAX_FILE_CHARS,
            fetch_concurrency: 16,
            include_extensions: default_include_extensions()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude_dirs: default_exclude_dirs().iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Language model endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub api_base: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-3-pro-preview".to_string(),
            api_key: None,
            timeout_secs: 300,
        }
    }
}

/// A list given either as an array or as one comma-separated string.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringList {
    Csv(String),
    List(Vec<String>),
}

impl StringList {
    fn into_items(self) -> Vec<String> {
        let raw = match self {
            StringList::Csv(s) => s.split(',').map(str::to_string).collect(),
            StringList::List(items) => items,
        };
        raw.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
    }
}

fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(StringList::deserialize(deserializer)?.into_items())
}

fn deserialize_extensions<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = StringList::deserialize(deserializer)?.into_items();
    Ok(items.into_iter().map(normalize_extension).collect())
}

/// `rs` and `.rs` both mean `.rs`.
pub fn normalize_extension(ext: String) -> String {
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}
