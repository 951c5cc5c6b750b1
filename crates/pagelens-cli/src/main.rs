//! PageLens CLI: entry point.
//!
//! # Commands
//!
//! - `pagelens summarize <PAGE>`: two-paragraph summary of a page
//! - `pagelens search <QUERY>...`: ask the model directly
//! - `pagelens key-info <PAGE> [--out FILE]`: highlight key excerpts
//! - `pagelens analyze <PAGE> [--list]`: study flashcards
//! - `pagelens background`: JSON request/response bridge on stdin/stdout
//! - `pagelens status` / `pagelens onboard`
//!
//! `--html FILE` also saves the rendered result as an HTML fragment.
//!
//! `<PAGE>` is an `http(s)` URL, a `file://` URL, or a path to an HTML file.

mod bridge;
mod deck;
mod helpers;
mod onboard;
mod status;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use pagelens_core::config::{load_config, Config};
use pagelens_core::Action;
use pagelens_popup::render::render_state;
use pagelens_popup::{Background, PageSource, Popup, ResultView, UiState, UrlPageSource};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// 🔎 PageLens: summarize, search, highlight, and study web pages with an LLM
#[derive(Parser)]
#[command(name = "pagelens", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Model to use (gpt-* or gemini-*). Defaults to the configured model.
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    logs: bool,

    /// Also write the result as an HTML fragment to this file
    #[arg(long, global = true, value_name = "FILE")]
    html: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a page
    Summarize {
        /// URL or HTML file
        page: String,
    },

    /// Ask the model a question
    Search {
        /// The query (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Find and highlight the key excerpts of a page
    KeyInfo {
        /// URL or HTML file
        page: String,

        /// Where to write the highlighted HTML
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Generate study flashcards from a page
    Analyze {
        /// URL or HTML file
        page: String,

        /// Print every card instead of opening the interactive deck
        #[arg(long, default_value_t = false)]
        list: bool,
    },

    /// Serve request envelopes from stdin, one JSON object per line
    Background,

    /// Show configuration and provider status
    Status,

    /// Create the default configuration file
    Onboard,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => status::run(),
        Commands::Onboard => onboard::run(),
        Commands::Background => {
            init_logging(cli.logs);
            bridge::run(&load_config(None)).await
        }
        Commands::Summarize { page } => {
            init_logging(cli.logs);
            let mut popup = build_popup(cli.model, Arc::new(UrlPageSource::new(page)));
            let state = popup.run(Action::Summary, None).await.clone();
            export_html(&state, cli.html.as_deref())?;
            show(state, &popup, None, false)
        }
        Commands::Search { query } => {
            init_logging(cli.logs);
            // Search never reads the page.
            let mut popup = build_popup(cli.model, Arc::new(UrlPageSource::new("about:blank")));
            let query = query.join(" ");
            let state = popup.run(Action::Search, Some(&query)).await.clone();
            export_html(&state, cli.html.as_deref())?;
            show(state, &popup, None, false)
        }
        Commands::KeyInfo { page, out } => {
            init_logging(cli.logs);
            let mut popup = build_popup(cli.model, Arc::new(UrlPageSource::new(page)));
            let state = popup.run(Action::KeyInfo, None).await.clone();
            export_html(&state, cli.html.as_deref())?;
            show(state, &popup, out.as_deref(), false)
        }
        Commands::Analyze { page, list } => {
            init_logging(cli.logs);
            let mut popup = build_popup(cli.model, Arc::new(UrlPageSource::new(page)));
            let state = popup.run(Action::Analyze, None).await.clone();
            export_html(&state, cli.html.as_deref())?;
            show(state, &popup, None, list)
        }
    }
}

/// Load config, start the background service, and wire a popup to `source`.
fn build_popup(model: Option<String>, source: Arc<dyn PageSource>) -> Popup {
    let config = load_config(None);
    let model = resolve_model(model, &config);
    info!(model = %model, "Starting popup");

    let (background, _task) = Background::from_config(&config).spawn(8);
    Popup::new(model, background, source)
}

fn resolve_model(flag: Option<String>, config: &Config) -> String {
    flag.filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| config.defaults.model.clone())
}

/// Write the rendered state when `--html` was given.
fn export_html(state: &UiState, path: Option<&str>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let path = helpers::expand_tilde(path);
    helpers::write_html(&path, &render_state(state))
        .with_context(|| format!("failed to write {}", path.display()))?;
    helpers::print_saved("rendered result", &path);
    Ok(())
}

/// Print the final state. Errors become the process error.
fn show(state: UiState, popup: &Popup, out: Option<&str>, list: bool) -> Result<()> {
    match state {
        UiState::Idle => {
            helpers::print_notice("Nothing to do.");
            Ok(())
        }
        UiState::Loading { action } => anyhow::bail!("{action} did not finish"),
        UiState::Error(message) => anyhow::bail!(message),
        UiState::Result(ResultView::Prose(text)) => {
            helpers::print_prose(&text);
            Ok(())
        }
        UiState::Result(ResultView::NoExcerpts) => {
            helpers::print_notice(pagelens_popup::render::NO_EXCERPTS_MESSAGE);
            Ok(())
        }
        UiState::Result(ResultView::Highlights { excerpts, report }) => {
            helpers::print_highlights(&excerpts, report.as_ref());

            let page = popup.page().context("no page was loaded")?;
            let path = match out {
                Some(path) => helpers::expand_tilde(path),
                None => helpers::default_highlights_path(),
            };
            helpers::write_html(&path, &page.document.to_html())
                .with_context(|| format!("failed to write {}", path.display()))?;
            helpers::print_saved("highlighted page", &path);
            Ok(())
        }
        UiState::Result(ResultView::Flashcards(mut deck)) => {
            if list {
                deck::print_all(&deck);
                Ok(())
            } else {
                deck::run(&mut deck)
            }
        }
    }
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("pagelens=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
