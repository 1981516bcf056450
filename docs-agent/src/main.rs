// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use docs_agent::app::{create_router, AppState, VERSION};
use docs_agent::config::Config;
use docs_agent::error::DocsError;
use docs_agent::services::index::DocsIndex;
use docs_agent::services::logging;
use docs_agent::services::notification::{Notifier, UpdateNotification};
use docs_agent::services::refresher::AutoRefresher;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "docs-agent", version = VERSION, about = "Documentation search bot backend")]
struct Cli {
    /// Default log filter when RUST_LOG is not set
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Index the documentation and serve commands over HTTP (default)
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
        /// Local docs directory (overrides DOCS_ROOT)
        #[arg(long)]
        docs_root: Option<PathBuf>,
    },
    /// Post a release or documentation-update announcement built from CI variables
    Notify {
        /// Webhook URL (overrides NOTIFICATION_TARGET)
        #[arg(long)]
        target: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref()).context("Failed to set tracing subscriber")?;

    let mut config = Config::from_env();

    match cli.command.unwrap_or(Command::Serve {
        port: None,
        docs_root: None,
    }) {
        Command::Serve { port, docs_root } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(docs_root) = docs_root {
                config.docs_root = docs_root;
            }
            serve(config).await
        }
        Command::Notify { target } => notify(target.or(config.notification_target)).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    info!(
        version = VERSION,
        mode = %config.indexing_mode,
        docs_root = %config.docs_root.display(),
        sources = ?config.docs_urls,
        "docs-agent starting"
    );

    let state = AppState::new(config.clone(), DocsIndex::from_config(&config));

    let outcome = state.index.refresh().await;
    if !outcome.success {
        warn!("initial indexing failed, serving an empty index until the next refresh");
    }

    if config.auto_refresh {
        let refresher = AutoRefresher::new(Arc::clone(&state.index), config.refresh_interval);
        tokio::spawn(async move {
            refresher.start().await;
        });
    }

    let app = create_router(state);

    // Bind to 0.0.0.0 to accept connections from any network interface (required for Docker)
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(%addr, "docs-agent v{} listening", VERSION);
    axum::serve(listener, app).await.context("Server error")
}

async fn notify(target: Option<String>) -> Result<()> {
    let target =
        target.ok_or_else(|| DocsError::ConfigurationMissing("NOTIFICATION_TARGET".to_string()))?;

    let message = UpdateNotification::from_lookup(|key| env::var(key).ok()).render(Utc::now());
    Notifier::new()
        .send(&target, &message)
        .await
        .context("Failed to send notification")?;
    Ok(())
}
