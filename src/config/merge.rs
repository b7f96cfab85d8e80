//! Command-line overrides applied on top of the loaded configuration

use crate::domain::config::normalize_extension;
use crate::domain::Config;

/// Values given on the command line; `None` keeps the configured value.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub max_files: Option<usize>,
    pub max_file_chars: Option<usize>,
    pub fetch_concurrency: Option<usize>,
    pub include_extensions: Option<Vec<String>>,
    pub exclude_dirs: Option<Vec<String>>,
    pub model: Option<String>,
    pub github_token: Option<String>,
}

pub fn merge_cli_with_config(mut config: Config, cli: CliOverrides) -> Config {
    if let Some(max_files) = cli.max_files {
        config.selection.max_files = max_files;
    }
    if let Some(max_file_chars) = cli.max_file_chars {
        config.selection.max_file_chars = max_file_chars;
    }
    if let Some(concurrency) = cli.fetch_concurrency {
        config.selection.fetch_concurrency = concurrency.max(1);
    }
    if let Some(extensions) = cli.include_extensions {
        config.selection.include_extensions =
            extensions.into_iter().map(normalize_extension).collect();
    }
    if let Some(dirs) = cli.exclude_dirs {
        config.selection.exclude_dirs = dirs;
    }
    if let Some(model) = cli.model {
        config.model.model = model;
    }
    if cli.github_token.is_some() {
        config.github.token = cli.github_token;
    }
    config
}
