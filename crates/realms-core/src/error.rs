//! Error types for realm discovery.

use thiserror::Error;

/// Errors that fail a whole discovery pass.
///
/// Per-node failures never show up here; they become
/// [`crate::ProbeStatus::Unreachable`] or [`crate::ProbeStatus::TimedOut`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    /// The registry could not be read at all (the node count query failed).
    #[error("node registry unavailable: {detail}")]
    RegistryUnavailable { detail: String },

    /// A registry record could not be read or parsed into a candidate node.
    #[error("node registry corrupt at index {index}: {detail}")]
    RegistryCorrupt { index: u64, detail: String },
}

impl DiscoveryError {
    /// Stable machine-readable code, used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            DiscoveryError::RegistryUnavailable { .. } => "registry_unavailable",
            DiscoveryError::RegistryCorrupt { .. } => "registry_corrupt",
        }
    }
}

/// Convenience result alias.
pub type DiscoveryResult<T> = std::result::Result<T, DiscoveryError>;

/// A registry source failed to answer a single query.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("registry lookup failed: {0}")]
pub struct LookupFailed(pub String);

impl LookupFailed {
    pub fn new(detail: impl Into<String>) -> Self {
        Self(detail.into())
    }
}

/// Why a status request to a node failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Connection, DNS or TLS failure before any response arrived.
    #[error("request failed: {0}")]
    Request(String),

    /// The node answered with a non-success HTTP status.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// The body was not a valid status payload.
    #[error("malformed status body: {0}")]
    Decode(String),
}
