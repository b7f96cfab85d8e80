//! Integration tests for CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Command isolated from the caller's config files and credentials.
fn repo_guide(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("repo-guide"));
    cmd.current_dir(dir.path())
        .env_remove("GEMINI_API_KEY")
        .env_remove("API_KEY")
        .env_remove("GITHUB_TOKEN")
        .env_remove("REPO_GUIDE_SELECTION__PRIMARY_BRANCH")
        .env_remove("REPO_GUIDE_MODEL__API_KEY");
    cmd
}

#[test]
fn test_cli_version() {
    let tmp = TempDir::new().expect("tmp");
    repo_guide(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("repo-guide"));
}

#[test]
fn test_cli_help() {
    let tmp = TempDir::new().expect("tmp");
    repo_guide(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("architectural analysis"))
        .stdout(predicate::str::contains("parse"))
        .stdout(predicate::str::contains("files"))
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_parse_prints_identifier() {
    let tmp = TempDir::new().expect("tmp");
    repo_guide(&tmp)
        .args(["parse", "https://github.com/rust-lang/cargo/tree/stable"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Owner:  rust-lang"))
        .stdout(predicate::str::contains("Repo:   cargo"))
        .stdout(predicate::str::contains("Branch: stable"));
}

#[test]
fn test_parse_json_defaults_branch() {
    let tmp = TempDir::new().expect("tmp");
    let output = repo_guide(&tmp)
        .args(["parse", "--json", "github.com/o/r.git"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(parsed["owner"], "o");
    assert_eq!(parsed["repo"], "r");
    assert_eq!(parsed["branch"], "main");
}

#[test]
fn test_parse_rejects_invalid_url() {
    let tmp = TempDir::new().expect("tmp");
    repo_guide(&tmp)
        .args(["parse", "https://gitlab.com/o/r"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("valid GitHub repository URL"));
}

#[test]
fn test_files_rejects_invalid_url_before_network() {
    let tmp = TempDir::new().expect("tmp");
    repo_guide(&tmp)
        .args(["files", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("valid GitHub repository URL"));
}

#[test]
fn test_analyze_requires_api_key() {
    let tmp = TempDir::new().expect("tmp");
    repo_guide(&tmp)
        .args(["analyze", "https://github.com/o/r"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key is required"));
}

#[test]
fn test_discovered_config_sets_default_branch() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("repo-guide.toml"), "[selection]\nprimary_branch = \"trunk\"\n")
        .expect("write");

    repo_guide(&tmp)
        .args(["parse", "https://github.com/o/r"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Branch: trunk"));
}

#[test]
fn test_env_overrides_config_file() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("repo-guide.toml"), "[selection]\nprimary_branch = \"trunk\"\n")
        .expect("write");

    repo_guide(&tmp)
        .env("REPO_GUIDE_SELECTION__PRIMARY_BRANCH", "develop")
        .args(["parse", "https://github.com/o/r"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Branch: develop"));
}

#[test]
fn test_explicit_invalid_config_fails() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("custom.toml");
    fs::write(&path, "[selection]\nmax_files = \"lots\"\n").expect("write");

    repo_guide(&tmp)
        .args(["--config", path.to_str().expect("utf8 path"), "parse", "github.com/o/r"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid TOML config"));
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().expect("tmp");
    repo_guide(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("repo-guide"));
}
