//! Function gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────────────────────────┐
//!                     │                 FAAS GATEWAY                  │
//!   Client Request    │  ┌────────┐   ┌────────────┐   ┌──────────┐   │
//!   ──────────────────┼─▶│ server │──▶│ basic auth │──▶│  proxy   │   │
//!                     │  └────────┘   │ (optional) │   └────┬─────┘   │
//!                     │               └────────────┘        │         │
//!                     │                                     ▼         │
//!                     │                              ┌──────────┐     │
//!                     │                              │ resolver │     │
//!                     │                              └────┬─────┘     │
//!                     │                                   ▼           │
//!   Client Response   │  ┌────────┐    ┌──────────────────────────┐   │   Function
//!   ◀─────────────────┼──│ relay  │◀───│ pooled client → watchdog │◀──┼── :8080
//!                     │  └────────┘    └──────────────────────────┘   │
//!                     └───────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use faas_gateway::config::{env::ProcessEnv, load_config};
use faas_gateway::lifecycle::{startup, Shutdown};
use faas_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "faas-gateway")]
#[command(about = "Forwards function invocations to their watchdogs", long_about = None)]
struct Args {
    /// TOML configuration file; defaults plus environment when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref(), &ProcessEnv)?;
    logging::init_logging(&config.observability)?;

    tracing::info!("faas-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        read_timeout_ms = config.timeouts.read_ms,
        write_timeout_ms = config.timeouts.write_ms,
        resolver = ?config.resolver.kind,
        basic_auth = config.auth.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = startup::build_server(config)?;

    let shutdown = Shutdown::new();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
