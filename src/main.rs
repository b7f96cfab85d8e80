//! repo-guide: architectural analysis and chat for GitHub repositories

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    repo_guide::cli::run().await
}
