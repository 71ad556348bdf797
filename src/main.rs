//! Lookup Gateway
//!
//! # Architecture Overview
//!
//! ```text
//!   Browser / lookup-cli
//!        │  GET /            (page: token + remaining quota)
//!        │  POST /           (action, type, query, token)
//!        ▼
//!   ┌──────────────────────────────────────────────────────────┐
//!   │ http::server  (request id, trace, timeout, body limit)   │
//!   │      │                                                   │
//!   │      ▼                                                   │
//!   │ session ──▶ security::token ──▶ security::rate_limit     │
//!   │                                      │                   │
//!   │                                      ▼                   │
//!   │                          security::sanitize              │
//!   │                                      │                   │
//!   │                                      ▼                   │
//!   │                          upstream::client ───────────────┼──▶ Lookup API
//!   │                                      │                   │
//!   │                                      ▼                   │
//!   │                          lookup::redact ──▶ JSON reply   │
//!   └──────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use lookup_gateway::config::{self, GatewayConfig};
use lookup_gateway::lifecycle::{wait_for_signal, Shutdown};
use lookup_gateway::observability::{logging, metrics};
use lookup_gateway::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "lookup-gateway")]
#[command(about = "Throttled, token-guarded relay for a third-party lookup API")]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override observability.log_level.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if let Some(level) = args.log_level {
        config.observability.log_level = level;
    }
    config::validate_config(&config).map_err(config::ConfigError::Validation)?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!("lookup-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        requests_per_minute = config.throttle.requests_per_minute,
        upstream_timeout_ms = config.upstream.timeout_ms,
        accept_previous_token = config.token.accept_previous_bucket,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    let server = HttpServer::new(config)?;
    let server_shutdown = shutdown.subscribe();

    let signal_shutdown = Arc::clone(&shutdown);
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
