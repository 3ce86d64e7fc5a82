//! Chain endpoint configuration

use std::time::Duration;

use crate::error::CatalystError;
use crate::Result;

/// Public mainnet JSON-RPC endpoint used when none is configured.
pub const DEFAULT_RPC_URL: &str = "https://ethereum-rpc.publicnode.com";

/// Catalyst registry contract on Ethereum mainnet.
pub const DEFAULT_CATALYST_CONTRACT: &str = "0x4a2f10076101650f40342885b99b6b101d83c486";

/// Per-request deadline for JSON-RPC calls.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the Catalyst registry lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// HTTP(S) JSON-RPC endpoint
    pub rpc_url: String,
    /// Registry contract address, `0x`-prefixed hex
    pub contract_address: String,
    /// Deadline for each JSON-RPC request
    pub rpc_timeout: Duration,
}

impl Default for ChainConfig {
    fn default() -> Self {
        ChainConfig {
            rpc_url: std::env::var("ETHEREUM_RPC_URL")
                .unwrap_or_else(|_| DEFAULT_RPC_URL.to_string()),
            contract_address: std::env::var("CATALYST_CONTRACT")
                .unwrap_or_else(|_| DEFAULT_CATALYST_CONTRACT.to_string()),
            rpc_timeout: std::env::var("ETHEREUM_RPC_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_RPC_TIMEOUT),
        }
    }
}

impl ChainConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific endpoint and the mainnet contract
    pub fn new(rpc_url: &str) -> Self {
        ChainConfig {
            rpc_url: rpc_url.to_string(),
            contract_address: DEFAULT_CATALYST_CONTRACT.to_string(),
            rpc_timeout: DEFAULT_RPC_TIMEOUT,
        }
    }

    /// Point at a different registry contract
    pub fn with_contract(mut self, address: &str) -> Self {
        self.contract_address = address.to_string();
        self
    }

    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = timeout;
        self
    }

    /// Check the endpoint scheme, the contract address shape and the timeout.
    pub fn validate(&self) -> Result<()> {
        let url = self.rpc_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CatalystError::InvalidConfig(format!(
                "rpc url must be http(s): {url}"
            )));
        }

        if self.rpc_timeout.is_zero() {
            return Err(CatalystError::InvalidConfig("rpc timeout must be non-zero".into()));
        }

        let hex_part = self
            .contract_address
            .strip_prefix("0x")
            .ok_or_else(|| CatalystError::InvalidConfig("contract address must start with 0x".into()))?;
        if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CatalystError::InvalidConfig(format!(
                "contract address must be 20 bytes of hex: {}",
                self.contract_address
            )));
        }
        Ok(())
    }
}
