//! Ethereum JSON-RPC over HTTP
//!
//! Only `eth_call` against the latest block is needed for registry reads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::abi;
use crate::error::CatalystError;
use crate::Result;

const USER_AGENT: &str = concat!("realms-catalyst-client/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Minimal JSON-RPC client for read-only contract calls
pub struct JsonRpcClient {
    endpoint: String,
    http_client: reqwest::Client,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Create a client for `endpoint`; every request fails after `timeout`
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self::with_client(endpoint, http_client))
    }

    /// Reuse an existing HTTP client
    pub fn with_client(endpoint: &str, http_client: reqwest::Client) -> Self {
        JsonRpcClient {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http_client,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `eth_call` with hex calldata, returning the decoded return bytes
    pub async fn eth_call(&self, to: &str, data: &str) -> Result<Vec<u8>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "eth_call",
            "params": [{ "to": to, "data": data }, "latest"],
        });

        debug!(id, to, "eth_call");

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalystError::Http(format!(
                "rpc endpoint returned HTTP {}",
                status.as_u16()
            )));
        }

        let body: Value = response.json().await?;
        let parsed: RpcResponse = serde_json::from_value(body)?;

        if let Some(err) = parsed.error {
            return Err(CatalystError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        let result = parsed
            .result
            .ok_or_else(|| CatalystError::Abi("response has neither result nor error".into()))?;
        abi::decode_hex(&result)
    }
}
