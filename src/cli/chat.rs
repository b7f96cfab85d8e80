//! Chat command implementation

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use std::io::{IsTerminal, Write};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio_util::sync::CancellationToken;

use super::analyze::run_pipeline;
use super::utils::{load_settings, run_interruptible, SelectionArgs};
use crate::chat::{ChatRelay, TurnOutcome};
use crate::render::render_report;

#[derive(Args)]
pub struct ChatArgs {
    /// GitHub repository URL
    #[arg(value_name = "URL")]
    pub url: String,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Model used for analysis and chat
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Print the full report before the first question
    #[arg(long)]
    pub show_report: bool,
}

pub async fn run(args: ChatArgs, config_path: Option<&Path>) -> Result<()> {
    let mut overrides = args.selection.overrides();
    overrides.model = args.model.clone();
    let config = load_settings(config_path, overrides)?;

    let mut analysis = run_pipeline(&args.url, &config, true).await?;

    if args.show_report {
        print!("{}", render_report(&analysis.repository, &analysis.report));
    } else {
        println!("{} {}", style("Ready:").green().bold(), analysis.report.mission.trim());
        if !analysis.report.suggested_questions.is_empty() {
            println!("Try asking:");
            for question in &analysis.report.suggested_questions {
                println!("  - {question}");
            }
        }
    }

    chat_loop(&mut analysis.chat).await
}

/// Read questions until an empty line, `exit`, or end of input.
pub(super) async fn chat_loop(relay: &mut ChatRelay) -> Result<()> {
    let mut prompt = Prompt::new();
    println!("{}", style("Ask a question (empty line or 'exit' to quit).").dim());

    while let Some(question) = prompt.next_question().await? {
        let question = question.trim().to_string();
        if question.is_empty() || question == "exit" || question == "quit" {
            break;
        }

        let cancel = CancellationToken::new();
        let mut echo = StreamEcho::default();
        let outcome = run_interruptible(
            relay.send(&question, &cancel, |reply| {
                print!("{}", echo.update(&reply.content));
                let _ = std::io::stdout().flush();
            }),
            || cancel.cancel(),
        )
        .await;

        match outcome {
            TurnOutcome::Completed | TurnOutcome::Failed => println!(),
            TurnOutcome::Cancelled => println!("\n{}", style("[cancelled]").yellow()),
        }
    }
    Ok(())
}

/// Question source: an interactive prompt on a terminal, plain lines otherwise.
enum Prompt {
    Interactive,
    Piped(Lines<BufReader<Stdin>>),
}

impl Prompt {
    fn new() -> Self {
        if std::io::stdin().is_terminal() {
            Prompt::Interactive
        } else {
            Prompt::Piped(BufReader::new(tokio::io::stdin()).lines())
        }
    }

    async fn next_question(&mut self) -> Result<Option<String>> {
        match self {
            Prompt::Interactive => {
                let answer = tokio::task::spawn_blocking(|| {
                    Input::<String>::with_theme(&ColorfulTheme::default())
                        .with_prompt("You")
                        .allow_empty(true)
                        .interact_text()
                })
                .await
                .context("Prompt task failed")?
                .context("Failed to read question")?;
                Ok(Some(answer))
            }
            Prompt::Piped(lines) => Ok(lines.next_line().await?),
        }
    }
}

/// Turns successive snapshots of the streamed reply into terminal output.
#[derive(Default)]
struct StreamEcho {
    shown: String,
}

impl StreamEcho {
    /// Text to print so the terminal shows `content`. A snapshot that does
    /// not extend what was shown (an error replacing the reply) starts a new
    /// line.
    fn update(&mut self, content: &str) -> String {
        let out = match content.strip_prefix(self.shown.as_str()) {
            Some(rest) => rest.to_string(),
            None => format!("\n{content}"),
        };
        self.shown = content.to_string();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::CHAT_ERROR_MESSAGE;

    #[test]
    fn test_echo_prints_only_new_text() {
        let mut echo = StreamEcho::default();
        assert_eq!(echo.update(""), "");
        assert_eq!(echo.update("Hel"), "Hel");
        assert_eq!(echo.update("Hello"), "lo");
        assert_eq!(echo.update("Hello"), "");
    }

    #[test]
    fn test_echo_replacement_starts_new_line() {
        let mut echo = StreamEcho::default();
        echo.update("par");
        assert_eq!(echo.update(CHAT_ERROR_MESSAGE), format!("\n{CHAT_ERROR_MESSAGE}"));
    }
}
