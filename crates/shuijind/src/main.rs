//! shuijind - shuijin Server Daemon
//!
//! Tracks the last value each gateway reported for a fixed set of slots and
//! serves it over HTTP, optionally alongside the web front-end.
//!
//! Usage:
//!   shuijind [OPTIONS] [config.toml]
//!
//! If no config file is provided, defaults are used (port 3068, 40 slots,
//! gateways 241-245, no UI).

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use shuijin_api::{create_router, AppState};
use shuijin_core::{GatewayAllowList, SlotStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::DaemonConfig;

/// Parsed command-line arguments
#[derive(Debug, Default)]
struct Args {
    /// Server config file (TOML)
    config_path: Option<String>,
    /// Overrides `[server] port`
    port: Option<u16>,
    /// Overrides `[ui] dir`
    ui_dir: Option<PathBuf>,
    /// `--help` was given
    help: bool,
}

/// Parse arguments (without the program name)
///
/// A missing or unparsable option value is an error rather than a
/// silent fallback to the configured value.
fn parse_args<I>(args: I) -> anyhow::Result<Args>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    let mut result = Args::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--port" | "-p" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| anyhow::anyhow!("Missing argument for --port"))?;
                let port = value
                    .parse::<u16>()
                    .with_context(|| format!("Invalid --port value '{}'", value))?;
                result.port = Some(port);
                i += 2;
            }
            "--ui" | "-u" => {
                let dir = args
                    .get(i + 1)
                    .ok_or_else(|| anyhow::anyhow!("Missing argument for --ui"))?;
                result.ui_dir = Some(PathBuf::from(dir));
                i += 2;
            }
            "--help" | "-h" => {
                result.help = true;
                i += 1;
            }
            arg if !arg.starts_with('-') => {
                // Positional argument = config file
                result.config_path = Some(arg.to_string());
                i += 1;
            }
            _ => {
                tracing::warn!("Unknown argument: {}", args[i]);
                i += 1;
            }
        }
    }

    Ok(result)
}

fn print_help() {
    eprintln!(
        r#"shuijind - shuijin Server Daemon

Usage: shuijind [OPTIONS] [config.toml]

Options:
  -p, --port <port>   Listen port (overrides [server] port, default 3068)
  -u, --ui <dir>      Serve the web front-end from this directory
  -h, --help          Print this help message

Examples:
  # Run with defaults
  shuijind

  # Run with config file
  shuijind shuijin.toml

  # Serve the built UI on another port
  shuijind --ui ui/dist --port 8080
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "shuijind=info,shuijin_api=info,shuijin_core=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting shuijind (shuijin Server Daemon)");

    let args = parse_args(std::env::args().skip(1))?;
    if args.help {
        print_help();
        return Ok(());
    }

    let mut config = if let Some(ref path) = args.config_path {
        tracing::info!("Loading config from: {}", path);
        DaemonConfig::load(path)?
    } else {
        tracing::info!("No config file provided, using defaults");
        DaemonConfig::default()
    };

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dir) = args.ui_dir {
        config.ui.dir = Some(dir);
    }
    config.validate()?;

    let store = Arc::new(SlotStore::from_config(&config.store));
    let gateways = GatewayAllowList::from_config(&config.gateway);
    tracing::info!(
        slots = store.len(),
        gateways = ?gateways.codes(),
        "Slot store provisioned"
    );

    let mut state = AppState::new(store, gateways);
    if let Some(ref dir) = config.ui.dir {
        if !dir.join("index.html").is_file() {
            tracing::warn!("UI directory has no index.html: {}", dir.display());
        }
        state = state.with_ui_dir(dir);
    }

    let app = create_router(state);

    let addr = config.listen_addr();
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
