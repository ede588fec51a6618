use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{BackendApi, ControllerOptions, HttpBackend, SessionController};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod repl;

use config::{load_settings, normalize_api_base};

/// Index a website with the RAG backend and chat about its content.
#[derive(Parser, Debug)]
#[command(name = "sitechat", version)]
struct Args {
    /// Backend base URL, e.g. http://127.0.0.1:8000
    #[arg(long)]
    api_base: Option<String>,
    /// Abandon a backend request after this many seconds (0 disables)
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Settings file; defaults to ./sitechat.toml when present
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the backend is reachable
    Health,
    /// Start an interactive session
    Chat {
        /// Website to index before the first prompt
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(api_base) = args.api_base {
        settings.api_base = api_base;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.request_timeout_secs = Some(timeout_secs);
    }
    let api_base = normalize_api_base(&settings.api_base)?;
    info!(%api_base, timeout = ?settings.request_timeout(), "backend configured");

    let backend = Arc::new(HttpBackend::new(api_base.clone()));
    match args.command {
        Command::Health => {
            let health = backend
                .health()
                .await
                .with_context(|| format!("backend at {api_base} is unreachable"))?;
            if !health.is_ok() {
                bail!("backend at {api_base} reported status '{}'", health.status);
            }
            println!("backend at {api_base} is healthy");
        }
        Command::Chat { url } => {
            let controller = SessionController::with_options(
                backend,
                ControllerOptions {
                    request_timeout: settings.request_timeout(),
                },
            );
            repl::run(controller, url).await?;
        }
    }

    Ok(())
}
