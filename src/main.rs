//! Tenant gate
//!
//! Routing gate in front of a page backend. Resolves the tenant from the
//! Host header, reads the session, and passes, rewrites or redirects.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id ─▶ trace ─▶ timeout
//!                                              │
//!                      /healthz, /api/auth/* ◀─┤
//!                                              ▼
//!                                     gate middleware
//!                          (scope → tenant → session → decision)
//!                                              │
//!                 307 redirect ◀───────────────┤
//!                                              ▼
//!                                   proxy (x-gate-tenant)
//!                                              │
//!                                              ▼
//!                                        page backend
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use tenant_gate::config::{load_config, GateConfig};
use tenant_gate::lifecycle::signals::spawn_signal_listener;
use tenant_gate::observability::{logging, metrics};
use tenant_gate::{GateServer, Shutdown};

#[derive(Parser)]
#[command(name = "tenant-gate")]
#[command(about = "Tenant-aware routing gate", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "TENANT_GATE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GateConfig::default(),
    };

    logging::init(&config.observability.log_level);
    tracing::info!("tenant-gate v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        root_domain = %config.tenancy.root_domain,
        environment = ?config.tenancy.environment,
        users = config.users.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_listener(&shutdown);

    let server = GateServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
