//! Config file loading and environment layering

use crate::domain::Config;
use anyhow::{Context, Result};
use figment::providers::{Env, Serialized};
use figment::Figment;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of environment overrides, e.g. `REPO_GUIDE_SELECTION__MAX_FILES`.
pub const ENV_PREFIX: &str = "REPO_GUIDE_";

const CONFIG_SECTION: &str = "repo-guide";

const CONFIG_CANDIDATES: [&str; 5] = [
    "repo-guide.toml",
    ".repo-guide.toml",
    "repo-guide.yml",
    "repo-guide.yaml",
    ".repo-guide.yml",
];

/// Load the file layer.
///
/// An explicit `config_path` must parse. A file discovered in `dir` that does
/// not parse is reported and replaced by defaults.
pub fn load_config(dir: &Path, config_path: Option<&Path>) -> Result<Config> {
    let explicit = config_path.is_some();

    let discovered = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config(dir),
    };

    let Some(config_file) = discovered else {
        return Ok(Config::default());
    };

    match read_config_file(&config_file) {
        Ok(config) => {
            tracing::debug!("Loaded config from {}", config_file.display());
            Ok(config)
        }
        Err(e) if explicit => Err(e),
        Err(e) => {
            tracing::warn!("Ignoring config {}: {:#}", config_file.display(), e);
            Ok(Config::default())
        }
    }
}

/// File layer, then `REPO_GUIDE_*` variables, then credential fallbacks.
pub fn load_layered(dir: &Path, config_path: Option<&Path>) -> Result<Config> {
    let config = load_config(dir, config_path)?;
    layer_env(config, ENV_PREFIX, |name| std::env::var(name).ok())
}

fn read_config_file(config_file: &Path) -> Result<Config> {
    let content = fs::read_to_string(config_file)
        .with_context(|| format!("Failed reading config file: {}", config_file.display()))?;

    let ext = config_file.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "toml" => parse_toml_config(&content, config_file),
        "yaml" | "yml" => parse_yaml_config(&content, config_file),
        other => anyhow::bail!(
            "Unsupported config extension '.{}' for file {}",
            other,
            config_file.display()
        ),
    }
}

/// Top-level keys, or the same keys under a `[repo-guide]` table.
fn parse_toml_config(content: &str, config_file: &Path) -> Result<Config> {
    let raw: toml::Value = toml::from_str(content)
        .with_context(|| format!("Invalid TOML syntax: {}", config_file.display()))?;

    let config_val = match raw.get(CONFIG_SECTION) {
        Some(nested) => nested.clone(),
        None => raw,
    };

    config_val.try_into().with_context(|| format!("Invalid TOML config: {}", config_file.display()))
}

fn parse_yaml_config(content: &str, config_file: &Path) -> Result<Config> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)
        .with_context(|| format!("Invalid YAML syntax: {}", config_file.display()))?;

    // An empty document is an empty config.
    if raw.is_null() {
        return Ok(Config::default());
    }

    let config_val = match raw.get(CONFIG_SECTION) {
        Some(nested) => nested.clone(),
        None => raw,
    };

    serde_yaml::from_value(config_val)
        .with_context(|| format!("Invalid YAML config: {}", config_file.display()))
}

fn discover_config(dir: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES.iter().map(|candidate| dir.join(candidate)).find(|path| path.is_file())
}

/// Merge prefixed environment variables over `config`, then fill missing
/// credentials from the conventional variables.
pub(crate) fn layer_env<F>(config: Config, prefix: &str, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: Config = Figment::from(Serialized::defaults(config))
        .merge(Env::prefixed(prefix).split("__"))
        .extract()
        .with_context(|| format!("Invalid {prefix}* environment configuration"))?;

    let lookup_secret = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    if config.github.token.is_none() {
        config.github.token = lookup_secret("GITHUB_TOKEN");
    }
    if config.model.api_key.is_none() {
        config.model.api_key =
            lookup_secret("GEMINI_API_KEY").or_else(|| lookup_secret("API_KEY"));
    }

    Ok(config)
}
