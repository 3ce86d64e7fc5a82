//! Catalyst Client: chain and node adapters for realm discovery
//!
//! Implements the two ports `realms-core` needs against the real network:
//!
//! - [`EthRegistrySource`] reads the Catalyst node registry contract over
//!   Ethereum JSON-RPC (`eth_call`).
//! - [`CommsStatusClient`] fetches a node's comms status over HTTPS.

pub mod abi;
pub mod comms;
pub mod config;
pub mod error;
pub mod registry;
pub mod rpc;

pub use comms::CommsStatusClient;
pub use config::{ChainConfig, DEFAULT_CATALYST_CONTRACT, DEFAULT_RPC_TIMEOUT, DEFAULT_RPC_URL};
pub use error::CatalystError;
pub use registry::{select_registry, EthRegistrySource};
pub use rpc::JsonRpcClient;

/// Result type for catalyst-client operations
pub type Result<T> = std::result::Result<T, CatalystError>;
