//! realmsd: serves the live Catalyst realm list over HTTP.

mod config;
mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use catalyst_client::{select_registry, CommsStatusClient};
use clap::Parser;
use realms_core::{init_tracing, LogFormat, RealmDiscovery, METRICS};
use tracing::{info, Level};

use crate::config::Args;
use crate::routes::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    init_tracing(LogFormat::from_json_flag(args.json), level);

    let registry = select_registry(&args.chain_config(), &args.nodes)
        .context("Failed to configure node registry")?;
    let transport = Arc::new(CommsStatusClient::new().context("Failed to build HTTP client")?);
    let discovery = RealmDiscovery::new(registry, transport, args.discovery_config());

    let state = AppState::new(Arc::new(discovery), args.cache_ttl());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    info!(
        addr = %args.bind,
        cache_ttl_secs = args.cache_ttl().as_secs(),
        static_nodes = args.nodes.len(),
        "realmsd listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    METRICS.flush();
    info!("realmsd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
