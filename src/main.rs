//! Security middleware (v1)
//!
//! An identity-validating reverse proxy built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────────────┐
//!                    │                SECURITY MIDDLEWARE                 │
//!                    │                                                    │
//!   Caller request   │  ┌──────────┐   ┌──────────┐   ┌──────────────┐   │
//!   ─────────────────┼─▶│ net/tls  │──▶│  http    │──▶│   security   │   │
//!   (cert or header) │  │ acceptor │   │ gateway  │   │identity/trust│   │
//!                    │  └──────────┘   └────┬─────┘   └──────────────┘   │
//!                    │                      │                             │
//!                    │                      ▼                             │
//!                    │               ┌──────────────┐                     │
//!                    │               │    proxy     │                     │
//!                    │               │ classify +   │───────────────────┼──▶ Backend
//!                    │               │  forwarder   │                     │
//!                    │               └──────┬───────┘                     │
//!                    │                      ▼                             │
//!                    │               ┌──────────────┐   ┌────────────┐   │
//!                    │               │  audit log   │◀──│   admin    │   │
//!                    │               └──────────────┘   └────────────┘   │
//!                    └────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use security_middleware::config::{load_config, MiddlewareConfig};
use security_middleware::lifecycle::{self, Shutdown};
use security_middleware::observability::{logging, metrics};
use security_middleware::HttpServer;

#[derive(Parser)]
#[command(name = "security-middleware")]
#[command(about = "Identity-validating reverse proxy", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Built-in defaults when omitted.
    #[arg(short, long, env = "SECURITY_MIDDLEWARE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => MiddlewareConfig::default(),
    };

    logging::init_logging(&config.observability);

    tracing::info!("security-middleware v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = %config.backend.base_url,
        tls = config.listener.tls.is_some(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        lifecycle::wait_for_signal(&shutdown).await;
    });

    server.run(listener, signal).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
