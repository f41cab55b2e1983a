//! ipa-ta - Token Annotator microservice
//!
//! **Module Identity:**
//! - Name: ipa-ta (Token Annotator)
//! - Port: 5740 (default)
//!
//! Adds IPA transcriptions to token batches using Wikipron pronunciation
//! datasets downloaded on demand and cached on disk.

use anyhow::{Context, Result};
use clap::Parser;
use ipa_common::config::{self, CliOverrides, ServiceConfig, TomlConfig};
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};

use ipa_ta::{build_router, AppState};

/// Command-line arguments for ipa-ta
#[derive(Parser, Debug)]
#[command(name = "ipa-ta")]
#[command(about = "IPA Token Annotator microservice")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "IPA_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding downloaded datasets
    #[arg(short, long)]
    dataset_dir: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // TOML is read before tracing exists so its log level can apply;
    // the outcome is logged once the subscriber is up
    let config_path = config::config_file_path(args.config.as_deref());
    let toml_result = config_path.as_deref().map(config::read_toml_config);
    let log_level = match &toml_result {
        Some(Ok(toml_config)) => toml_config.logging.level.clone(),
        _ => "info".to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .init();

    info!(
        "Starting IPA Token Annotator (ipa-ta) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let toml_config = match (config_path, toml_result) {
        (Some(path), Some(Ok(toml_config))) => {
            info!("Config file: {}", path.display());
            toml_config
        }
        (_, Some(Err(e))) => {
            warn!("{}; using defaults", e);
            TomlConfig::default()
        }
        _ => {
            info!("No config file found, using defaults");
            TomlConfig::default()
        }
    };

    let cli = CliOverrides {
        dataset_dir: args.dataset_dir,
        host: args.host,
        port: args.port,
    };
    let service_config =
        ServiceConfig::resolve(&cli, toml_config).context("Invalid configuration")?;

    info!("Dataset directory: {}", service_config.dataset_dir.display());
    info!("Remote source: {}", service_config.remote.base_url);
    info!(
        "Single-variety strategy: {:?}, max concurrent lookups: {}",
        service_config.annotation.single_variety,
        service_config.annotation.max_concurrent_lookups
    );

    let bind_addr = format!("{}:{}", service_config.host, service_config.port);
    let state = AppState::new(service_config).context("Failed to initialize dataset fetcher")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    info!("Listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
