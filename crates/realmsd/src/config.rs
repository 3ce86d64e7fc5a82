//! Daemon configuration: flags with environment fallbacks.

use std::net::SocketAddr;
use std::time::Duration;

use catalyst_client::{ChainConfig, DEFAULT_CATALYST_CONTRACT, DEFAULT_RPC_URL};
use clap::Parser;
use realms_core::{DiscoveryConfig, DEFAULT_LOOKUP_CONCURRENCY};

#[derive(Parser, Debug, Clone)]
#[command(name = "realmsd")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Serve the live Catalyst realm list over HTTP", long_about = None)]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "REALMS_BIND", default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    /// How long a discovery result is served before the next pass
    #[arg(long, env = "REALMS_CACHE_TTL_SECS", default_value_t = 3600)]
    pub cache_ttl_secs: u64,

    /// Ethereum JSON-RPC endpoint used to read the node registry
    #[arg(long, env = "ETHEREUM_RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Deadline for each JSON-RPC request
    #[arg(long, env = "ETHEREUM_RPC_TIMEOUT_MS", default_value_t = 10_000)]
    pub rpc_timeout_ms: u64,

    /// Catalyst registry contract address
    #[arg(long, env = "CATALYST_CONTRACT", default_value = DEFAULT_CATALYST_CONTRACT)]
    pub contract: String,

    /// Probe these domains instead of reading the chain (repeatable)
    #[arg(long = "node", value_name = "DOMAIN")]
    pub nodes: Vec<String>,

    /// Per-node status deadline
    #[arg(long, env = "REALMS_PROBE_TIMEOUT_MS", default_value_t = 5000)]
    pub probe_timeout_ms: u64,

    /// Optional deadline for a whole probe phase
    #[arg(long, env = "REALMS_TOTAL_BUDGET_MS")]
    pub total_budget_ms: Option<u64>,

    /// Deadline for each registry call (count or one record)
    #[arg(long, env = "REALMS_LOOKUP_TIMEOUT_MS", default_value_t = 15_000)]
    pub lookup_timeout_ms: u64,

    /// Concurrent registry record lookups
    #[arg(long, env = "REALMS_LOOKUP_CONCURRENCY", default_value_t = DEFAULT_LOOKUP_CONCURRENCY)]
    pub lookup_concurrency: usize,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, env = "REALMS_LOG_JSON")]
    pub json: bool,
}

impl Args {
    pub fn chain_config(&self) -> ChainConfig {
        ChainConfig::new(&self.rpc_url)
            .with_contract(&self.contract)
            .with_rpc_timeout(Duration::from_millis(self.rpc_timeout_ms.max(1)))
    }

    pub fn discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig::default()
            .with_probe_timeout(Duration::from_millis(self.probe_timeout_ms.max(1)))
            .with_total_budget(self.total_budget_ms.map(Duration::from_millis))
            .with_lookup_concurrency(self.lookup_concurrency)
            .with_lookup_timeout(Duration::from_millis(self.lookup_timeout_ms.max(1)))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs.max(1))
    }
}
