//! # Scangate
//!
//! Gateway binary: loads configuration, wires scanner clients and serves the
//! REST and MCP surfaces until interrupted.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scangate_config::{ConfigLoad, ConfigLoader};
use scangate_server::{
    AppState, create_app,
    infra::startup::{ProdStartupHooks, StartupHooks},
};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "scangate")]
#[command(about = "Security scan gateway with REST and MCP front-ends")]
struct Cli {
    /// Configuration file (YAML, TOML or JSON)
    #[arg(short, long, env = "SCANGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Skip loading a .env file
    #[arg(long, default_value_t = false)]
    no_env_file: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_server(cli, &ProdStartupHooks).await
}

async fn run_server<H>(cli: Cli, hooks: &H) -> anyhow::Result<()>
where
    H: StartupHooks,
{
    let mut loader = ConfigLoader::new();
    if let Some(path) = cli.config.clone() {
        loader = loader.with_config_path(path);
    }
    if cli.no_env_file {
        loader = loader.without_env_file();
    }

    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = config.metadata.config_path.as_ref() {
        info!(path = %path.display(), "configuration file loaded");
    }
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }

    let config = Arc::new(config);
    let state = AppState::from_config(Arc::clone(&config))?;
    hooks.run(&state).await?;

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(
        "Starting Scangate on {} ({} scanner backend(s), license {})",
        addr,
        state.scanners.scanner_names().len(),
        if config.license.is_licensed() { "enabled" } else { "disabled" }
    );

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Scangate stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
