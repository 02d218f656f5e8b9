//! Terminal front end for the feedback widget.
//!
//! Every command drives the same `FeedbackWidget` a reading page embeds,
//! with the terminal acting as host: alerts go to stderr, confirmations are
//! read from stdin, and the page identifier comes from `--page`.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use feedback_desk::record::{PageFilter, Roster};
use feedback_desk::store::remote::DEFAULT_HTTP_TIMEOUT_SECS;
use feedback_desk::store::{DEFAULT_LIST_LIMIT, RemoteStore, StoreError};
use feedback_desk::widget::{FeedbackItemView, FeedbackWidget, ListView, RemoteConnector, WidgetError, WidgetHost};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("health check failed: HTTP {0}")]
    Unhealthy(u16),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Widget(#[from] WidgetError),
    #[error("{0}")]
    ListFailed(&'static str),
    #[error("server published an empty reviewer roster")]
    EmptyRoster,
}

impl CliError {
    /// Whether the widget already reported this failure through the host.
    fn alerted(&self) -> bool {
        matches!(self, Self::Widget(WidgetError::Invalid(_) | WidgetError::Store(_)))
    }
}

#[derive(Parser, Debug)]
#[command(name = "feedback", about = "Reviewer feedback from the terminal")]
struct Cli {
    #[arg(long, env = "FEEDBACK_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    /// Page identifier the feedback is attached to.
    #[arg(long, env = "FEEDBACK_PAGE", default_value = "index")]
    page: String,

    #[arg(long, env = "FEEDBACK_LIST_LIMIT", default_value_t = DEFAULT_LIST_LIMIT)]
    limit: usize,

    #[arg(long, env = "FEEDBACK_HTTP_TIMEOUT_SECS", default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the server is up.
    Ping,
    /// Print the reviewer roster.
    Reviewers,
    /// List feedback for `--page`, or every page with `--all`.
    List {
        #[arg(long)]
        all: bool,
    },
    /// Submit feedback as one of the reviewers.
    Submit {
        #[arg(long)]
        author: String,
        content: String,
    },
    Resolve {
        id: Uuid,
    },
    Reopen {
        id: Uuid,
    },
    Delete {
        id: Uuid,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

// =============================================================================
// HOST
// =============================================================================

struct TerminalHost {
    page: String,
    assume_yes: bool,
}

impl WidgetHost for TerminalHost {
    fn current_page(&self) -> String {
        self.page.clone()
    }

    fn alert(&self, message: &str) {
        eprintln!("{message}");
    }

    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{message} [y/N] ");
        if io::stderr().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

// =============================================================================
// COMMANDS
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if !err.alerted() {
                eprintln!("error: {err}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Ping => run_ping(&cli.base_url).await,
        Command::Reviewers => {
            let store = RemoteStore::new(&cli.base_url, cli.timeout)?;
            for name in store.reviewers().await? {
                println!("{name}");
            }
            Ok(())
        }
        Command::List { all } => {
            let widget = widget(&cli, false).await?;
            if all {
                widget.set_filter(PageFilter::All).await;
            }
            widget.open().await;
            print_list(&widget.view().list)
        }
        Command::Submit { ref author, ref content } => {
            let widget = widget(&cli, false).await?;
            widget.select_author(author);
            widget.set_draft(content);
            let record = widget.submit().await?;
            println!("{}", record.id);
            Ok(())
        }
        Command::Resolve { id } => set_resolved(&cli, id, true).await,
        Command::Reopen { id } => set_resolved(&cli, id, false).await,
        Command::Delete { id, yes } => {
            let widget = widget(&cli, yes).await?;
            if widget.delete(id).await? {
                println!("deleted {id}");
            } else {
                eprintln!("cancelled");
            }
            Ok(())
        }
    }
}

async fn run_ping(base_url: &str) -> Result<(), CliError> {
    let url = format!("{}/healthz", base_url.trim_end_matches('/'));
    let status = reqwest::get(url).await?.status();
    if !status.is_success() {
        return Err(CliError::Unhealthy(status.as_u16()));
    }
    println!("ok");
    Ok(())
}

async fn set_resolved(cli: &Cli, id: Uuid, resolved: bool) -> Result<(), CliError> {
    let widget = widget(cli, false).await?;
    let record = widget.toggle_resolved(id, resolved).await?;
    println!("{} {}", record.id, if record.resolved { "resolved" } else { "open" });
    Ok(())
}

/// Build a widget whose roster is the one the server publishes.
async fn widget(cli: &Cli, assume_yes: bool) -> Result<FeedbackWidget<TerminalHost>, CliError> {
    let roster = Roster::new(RemoteStore::new(&cli.base_url, cli.timeout)?.reviewers().await?);
    if roster.is_empty() {
        return Err(CliError::EmptyRoster);
    }
    let host = TerminalHost { page: cli.page.clone(), assume_yes };
    let connector = RemoteConnector { base_url: cli.base_url.clone(), timeout_secs: cli.timeout };
    Ok(FeedbackWidget::new(host, connector, roster).with_limit(cli.limit))
}

fn print_list(list: &ListView) -> Result<(), CliError> {
    match list {
        ListView::Idle => Ok(()),
        ListView::Empty(message) => {
            println!("{message}");
            Ok(())
        }
        ListView::Error(message) => Err(CliError::ListFailed(message)),
        ListView::Items(items) => {
            for item in items {
                println!("{}", render_item(item));
            }
            Ok(())
        }
    }
}

fn render_item(item: &FeedbackItemView) -> String {
    let mut line = format!("{}  {}  {}", item.id, item.created, item.author);
    if let Some(page) = &item.page {
        line.push_str(&format!(" ({page})"));
    }
    if item.resolved {
        line.push_str(" [resolved]");
    }
    line.push_str("\n    ");
    line.push_str(&item.content);
    line
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
