//! Error types for catalyst-client

use thiserror::Error;

/// Errors raised while talking to the chain or to a node.
#[derive(Error, Debug)]
pub enum CatalystError {
    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// The JSON-RPC endpoint answered with an error object
    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Return data did not match the expected ABI layout
    #[error("ABI decode error: {0}")]
    Abi(String),

    /// Invalid endpoint or contract configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for CatalystError {
    fn from(err: reqwest::Error) -> Self {
        CatalystError::Http(err.to_string())
    }
}

impl From<CatalystError> for realms_core::LookupFailed {
    fn from(err: CatalystError) -> Self {
        realms_core::LookupFailed::new(err.to_string())
    }
}
