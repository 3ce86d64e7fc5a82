//! Realms CLI - Catalyst realm discovery from the command line
//!
//! ## Commands
//!
//! - `discover`: run one discovery pass and print the live realms
//! - `nodes`: list the registry's nodes after normalization
//! - `probe`: check a single domain's comms status

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use catalyst_client::{
    select_registry, ChainConfig, CommsStatusClient, DEFAULT_CATALYST_CONTRACT, DEFAULT_RPC_URL,
};
use clap::{Parser, Subcommand};
use realms_core::{init_tracing, DiscoveryConfig, LogFormat, NormalizedNode, RealmDiscovery};
use serde::Serialize;
use tracing::{debug, Level};

#[derive(Parser)]
#[command(name = "realms")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Discover live realms on the Catalyst network", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Ethereum JSON-RPC endpoint used to read the node registry
    #[arg(long, global = true, env = "ETHEREUM_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    /// Deadline for each JSON-RPC request in milliseconds
    #[arg(long, global = true, env = "ETHEREUM_RPC_TIMEOUT_MS", default_value_t = 10_000)]
    rpc_timeout_ms: u64,

    /// Catalyst registry contract address
    #[arg(long, global = true, env = "CATALYST_CONTRACT", default_value = DEFAULT_CATALYST_CONTRACT)]
    contract: String,

    /// Use these domains instead of the on-chain registry (repeatable)
    #[arg(long = "node", global = true, value_name = "DOMAIN")]
    nodes: Vec<String>,

    /// Per-node status deadline in milliseconds
    #[arg(long, global = true, env = "REALMS_PROBE_TIMEOUT_MS", default_value_t = 5000)]
    probe_timeout_ms: u64,

    /// Deadline for the whole probe phase in milliseconds
    #[arg(long, global = true, env = "REALMS_TOTAL_BUDGET_MS")]
    total_budget_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one discovery pass and print the live realms as JSON
    Discover {
        /// Print the full pass report instead of only the realm list
        #[arg(long)]
        report: bool,
    },

    /// List registry nodes that survive normalization
    Nodes,

    /// Probe a single domain's comms status
    Probe {
        /// Domain to probe, e.g. `peer.decentraland.org`
        domain: String,
    },
}

impl Cli {
    /// Probe timing comes from flags; registry lookup knobs from the environment.
    fn discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig::from_env()
            .with_probe_timeout(Duration::from_millis(self.probe_timeout_ms.max(1)))
            .with_total_budget(self.total_budget_ms.map(Duration::from_millis))
    }

    fn build_discovery(&self) -> Result<RealmDiscovery> {
        let chain = ChainConfig::new(&self.rpc_url)
            .with_contract(&self.contract)
            .with_rpc_timeout(Duration::from_millis(self.rpc_timeout_ms.max(1)));
        let registry =
            select_registry(&chain, &self.nodes).context("Failed to configure node registry")?;
        let transport = CommsStatusClient::new().context("Failed to build HTTP client")?;
        Ok(RealmDiscovery::new(
            registry,
            Arc::new(transport),
            self.discovery_config(),
        ))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    init_tracing(LogFormat::from_json_flag(cli.json), level);

    let discovery = cli.build_discovery()?;
    debug!(config = ?discovery.config(), static_nodes = cli.nodes.len(), "discovery ready");

    let output = match &cli.command {
        Commands::Discover { report } => cmd_discover(&discovery, *report).await?,
        Commands::Nodes => cmd_nodes(&discovery).await?,
        Commands::Probe { domain } => cmd_probe(&discovery, domain).await?,
    };
    println!("{output}");

    Ok(())
}

fn to_pretty<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Run a pass and render realms (or the whole report) as JSON
async fn cmd_discover(discovery: &RealmDiscovery, report: bool) -> Result<String> {
    let pass = discovery
        .discover()
        .await
        .context("Discovery pass failed")?;

    if report {
        to_pretty(&pass)
    } else {
        to_pretty(&pass.realms)
    }
}

/// Render normalized registry nodes, one per line
async fn cmd_nodes(discovery: &RealmDiscovery) -> Result<String> {
    let nodes = discovery
        .list_nodes()
        .await
        .context("Failed to read node registry")?;
    Ok(render_nodes(&nodes))
}

fn render_nodes(nodes: &[NormalizedNode]) -> String {
    if nodes.is_empty() {
        return "No nodes found".to_string();
    }
    nodes
        .iter()
        .map(|node| format!("{}  {}", node.id(), node.domain()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Probe one domain and render the outcome as JSON
async fn cmd_probe(discovery: &RealmDiscovery, domain: &str) -> Result<String> {
    match discovery.probe_domain(domain).await {
        Some(outcome) => to_pretty(&outcome),
        None => bail!("Domain rejected (insecure or malformed): {}", domain),
    }
}
