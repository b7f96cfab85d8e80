//! Files command implementation

use anyhow::Result;
use clap::Args;
use serde_json::json;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use super::utils::{build_selector, load_settings, run_interruptible, SelectionArgs};
use crate::fetch::parse_repo_url_with_default;
use crate::pipeline::PipelineError;
use crate::render::render_selection;

#[derive(Args)]
pub struct FilesArgs {
    /// GitHub repository URL
    #[arg(value_name = "URL")]
    pub url: String,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Print the selection as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: FilesArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_settings(config_path, args.selection.overrides())?;

    let repository = parse_repo_url_with_default(&args.url, &config.selection.primary_branch)
        .ok_or_else(|| anyhow::anyhow!("{}", PipelineError::InvalidUrl(args.url.clone())))?;
    let selector = build_selector(&config)?;

    let cancel = CancellationToken::new();
    let selection =
        run_interruptible(selector.select_files(&repository, &cancel), || cancel.cancel())
            .await
            .map_err(|err| anyhow::anyhow!("{}", PipelineError::from(err)))?;

    if args.json {
        let files = selection
            .files
            .iter()
            .map(|f| json!({ "path": f.path, "chars": f.size, "truncated": f.was_truncated() }))
            .collect::<Vec<_>>();
        let out = json!({
            "repository": selection.repository,
            "stats": selection.stats,
            "files": files,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", render_selection(&selection.repository, &selection.stats, &selection.files));
    }
    Ok(())
}
