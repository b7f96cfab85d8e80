//! Parse command implementation

use anyhow::Result;
use clap::Args;
use std::path::Path;

use super::utils::load_settings;
use crate::config::CliOverrides;
use crate::fetch::parse_repo_url_with_default;
use crate::pipeline::PipelineError;
use crate::render::render_identifier;

#[derive(Args)]
pub struct ParseArgs {
    /// GitHub repository URL
    #[arg(value_name = "URL")]
    pub url: String,

    /// Print the identifier as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ParseArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_settings(config_path, CliOverrides::default())?;

    let repository = parse_repo_url_with_default(&args.url, &config.selection.primary_branch)
        .ok_or_else(|| anyhow::anyhow!("{}", PipelineError::InvalidUrl(args.url.clone())))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&repository)?);
    } else {
        print!("{}", render_identifier(&repository));
    }
    Ok(())
}
