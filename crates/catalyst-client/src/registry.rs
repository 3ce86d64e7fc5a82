//! Registry source backed by the on-chain Catalyst contract

use std::sync::Arc;

use async_trait::async_trait;
use realms_core::{CandidateNode, LookupFailed, RegistrySource, StaticRegistrySource};
use tracing::debug;

use crate::abi;
use crate::config::ChainConfig;
use crate::rpc::JsonRpcClient;
use crate::Result;

pub const CATALYST_COUNT: &str = "catalystCount()";
pub const CATALYST_IDS: &str = "catalystIds(uint256)";
pub const CATALYST_BY_ID: &str = "catalystById(bytes32)";

/// Reads candidate nodes from the Catalyst registry contract.
///
/// A record is resolved in two calls: the id at an index, then the record
/// for that id.
pub struct EthRegistrySource {
    rpc: JsonRpcClient,
    contract: String,
}

impl EthRegistrySource {
    /// Build a source from validated chain configuration
    pub fn new(config: &ChainConfig) -> Result<Self> {
        config.validate()?;
        Ok(EthRegistrySource {
            rpc: JsonRpcClient::new(&config.rpc_url, config.rpc_timeout)?,
            contract: config.contract_address.to_lowercase(),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(&ChainConfig::from_env())
    }

    pub fn contract(&self) -> &str {
        &self.contract
    }

    async fn node_count(&self) -> Result<u64> {
        let data = self
            .rpc
            .eth_call(&self.contract, &abi::encode_call(CATALYST_COUNT, &[]))
            .await?;
        abi::decode_uint(&data)
    }

    async fn record_at(&self, index: u64) -> Result<abi::CatalystRecord> {
        let id_data = self
            .rpc
            .eth_call(
                &self.contract,
                &abi::encode_call(CATALYST_IDS, &[abi::encode_uint(index)]),
            )
            .await?;
        let id = abi::decode_bytes32(&id_data)?;

        let record_data = self
            .rpc
            .eth_call(&self.contract, &abi::encode_call(CATALYST_BY_ID, &[id]))
            .await?;
        let record = abi::decode_catalyst(&record_data)?;
        debug!(
            index,
            id = %record.id_hex(),
            owner = %record.owner_hex(),
            domain = %record.domain,
            "registry record"
        );
        Ok(record)
    }
}

#[async_trait]
impl RegistrySource for EthRegistrySource {
    async fn count(&self) -> std::result::Result<u64, LookupFailed> {
        Ok(self.node_count().await?)
    }

    async fn node_at(&self, index: u64) -> std::result::Result<CandidateNode, LookupFailed> {
        let record = self.record_at(index).await?;
        Ok(CandidateNode::new(record.id_hex(), record.domain))
    }
}

/// Pick the registry a binary should read.
///
/// A non-empty `static_nodes` list bypasses the chain entirely.
pub fn select_registry(
    config: &ChainConfig,
    static_nodes: &[String],
) -> Result<Arc<dyn RegistrySource>> {
    if static_nodes.is_empty() {
        Ok(Arc::new(EthRegistrySource::new(config)?))
    } else {
        debug!(count = static_nodes.len(), "using static node list");
        Ok(Arc::new(StaticRegistrySource::from_domains(
            static_nodes.iter().cloned(),
        )))
    }
}
