//! Veritas: credibility analysis for the article in front of you.
//!
//! Runs the page, background and popup contexts in one process: the page
//! context reads an HTML file, the background relay talks to the analysis
//! service, and the popup session prints what the popup would show.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use veritas_core::ConfigStore;
use veritas_extract::{Extractor, InlineStyleProbe, PageContext, PageDocument};
use veritas_popup::{PopupController, SessionState};
use veritas_relay::{on_installed, HttpBackend, Relay};

#[derive(Parser, Debug)]
#[command(name = "veritas", version, about = "Quick credibility analysis of a web page.")]
struct Cli {
    /// Directory holding config.json
    #[arg(long, global = true, env = "VERITAS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Seed the configuration with the default service URL
    Install,

    /// Show or change the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Print the page snapshot extracted from an HTML file
    Snapshot {
        /// HTML file standing in for the open tab
        file: PathBuf,

        /// URL the page was loaded from
        #[arg(long, default_value = "about:blank")]
        url: String,
    },

    /// Run one popup session against an HTML file
    Analyze {
        /// HTML file standing in for the open tab
        file: PathBuf,

        /// URL the page was loaded from
        #[arg(long, default_value = "about:blank")]
        url: String,

        /// Print the popup HTML instead of plain text
        #[arg(long)]
        html: bool,

        /// Give up on the analysis service after this many seconds
        #[arg(long, env = "VERITAS_REQUEST_TIMEOUT_SECS")]
        timeout_secs: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the stored configuration and the resolved endpoint
    Show,
    /// Point the relay at a different analysis service
    SetApiBase { url: String },
}

fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(|| PathBuf::from("data"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let data_dir = resolve_data_dir(cli.data_dir);

    match cli.command {
        Commands::Install => {
            let store = ConfigStore::load(&data_dir);
            on_installed(&store)?;
            println!("{}", store.current().analyze_endpoint());
        }
        Commands::Config { action } => {
            let store = ConfigStore::load(&data_dir);
            match action {
                ConfigAction::Show => {
                    let config = store.current();
                    println!("{}", serde_json::to_string_pretty(&config)?);
                    println!("endpoint: {}", config.analyze_endpoint());
                }
                ConfigAction::SetApiBase { url } => {
                    store.set_api_base(&url)?;
                    println!("endpoint: {}", store.current().analyze_endpoint());
                }
            }
        }
        Commands::Snapshot { file, url } => {
            let document = load_document(&file, url)?;
            let snapshot = Extractor::new(Arc::new(InlineStyleProbe)).refresh(&document);
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Commands::Analyze {
            file,
            url,
            html,
            timeout_secs,
        } => {
            let state = analyze(&data_dir, &file, url, html, timeout_secs).await?;
            if state != SessionState::Rendered {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn load_document(file: &Path, url: String) -> anyhow::Result<PageDocument> {
    let html = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    Ok(PageDocument::new(url, html))
}

async fn analyze(
    data_dir: &Path,
    file: &Path,
    url: String,
    html: bool,
    timeout_secs: Option<u64>,
) -> anyhow::Result<SessionState> {
    let store = ConfigStore::load(data_dir);
    if !store.is_persisted() {
        info!("First run, installing defaults in {}", data_dir.display());
        on_installed(&store)?;
    }

    let backend = HttpBackend::new(timeout_secs.map(Duration::from_secs))?;
    let background = Relay::new(backend, store.subscribe()).spawn();
    let page = PageContext::spawn(load_document(file, url)?, Arc::new(InlineStyleProbe));

    let controller = PopupController::new(page.port(), background.port());
    let state = controller.analyze().await?;

    let view = controller.view();
    if html {
        print!("{}", view.to_html());
    } else {
        println!("{}", view.to_text());
    }

    page.close();
    background.shutdown();
    Ok(state)
}
