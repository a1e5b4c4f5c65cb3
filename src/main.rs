//! Wildcard-subdomain edge node.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request                ┌──────────────────────────────────────────┐
//!     Host: a.example.com           │                EDGE NODE                 │
//!     GET /docs/                    │                                          │
//!     ──────────────────────────────┼─▶ http server ─▶ routing::rewriter       │
//!                                   │   (request id,   (a.example.com/docs/    │
//!                                   │    timeouts)      → /a/docs/index.html)  │
//!                                   │                        │                 │
//!     Client Response               │                        ▼                 │
//!     ◀─────────────────────────────┼── response ◀──── origin forward ◀───────┼──── Origin store
//!                                   │                                          │
//!                                   │  config (TOML + env) · watcher · metrics │
//!                                   └──────────────────────────────────────────┘
//! ```
//!
//! Usage: `wildcard-edge [CONFIG]`. Without a path argument `EDGE_CONFIG` is
//! consulted; with neither, defaults plus environment overrides are used.

use std::net::SocketAddr;
use std::path::PathBuf;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use wildcard_edge::config::watcher::ConfigWatcher;
use wildcard_edge::config::{load_config, load_from_env};
use wildcard_edge::lifecycle::{signals, Shutdown};
use wildcard_edge::observability::{logging, metrics};
use wildcard_edge::HttpServer;

const CONFIG_PATH_ENV: &str = "EDGE_CONFIG";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

    let config = match &config_path {
        Some(path) => load_config(path)?,
        None => load_from_env()?,
    };

    logging::init(&config.observability.log_level)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?config_path,
        bind_address = %config.listener.bind_address,
        subdomain_base = %config.rewrite.subdomain_base,
        origin = %config.origin.address,
        "wildcard-edge starting"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    // Hold the watcher for the life of the process; dropping it stops events.
    let (_watcher, config_updates) = match &config_path {
        Some(path) => {
            let (watcher, rx) = ConfigWatcher::new(path);
            (Some(watcher.run()?), rx)
        }
        None => {
            let (_, rx) = mpsc::unbounded_channel();
            (None, rx)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, shutdown.signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
