//! Command-line interface for repo-guide
//!
//! Provides `parse`, `files`, `analyze`, `chat` and `completions` subcommands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod analyze;
mod chat;
mod completions;
mod files;
mod parse;
mod utils;

/// Sample a GitHub repository, get an architectural analysis, and chat about the code
#[derive(Parser)]
#[command(name = "repo-guide")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (repo-guide.toml or repo-guide.yml)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how a repository URL is interpreted
    Parse(parse::ParseArgs),

    /// List the files that would be sent for analysis
    Files(files::FilesArgs),

    /// Analyze a repository and print the report
    Analyze(analyze::AnalyzeArgs),

    /// Analyze a repository, then ask follow-up questions
    Chat(chat::ChatArgs),

    /// Print shell completions
    Completions(completions::CompletionsArgs),
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Parse(args) => parse::run(args, config),
        Commands::Files(args) => files::run(args, config).await,
        Commands::Analyze(args) => analyze::run(args, config).await,
        Commands::Chat(args) => chat::run(args, config).await,
        Commands::Completions(args) => completions::run(args),
    }
}
