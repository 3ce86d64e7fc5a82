//! Comms status payloads and per-node probe outcomes.

use serde::{Deserialize, Serialize};

use crate::domain::node::NormalizedNode;

/// Path (with query) appended to a node domain to reach its status endpoint.
pub const STATUS_PATH: &str = "/comms/status?includeLayers=true";

/// Body returned by a node's comms status endpoint.
///
/// Only the fields the aggregator needs are modelled; anything else in the
/// body is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    /// Whether the node currently accepts users.
    pub ready: bool,
    /// Realm the node belongs to. Nodes report this as `name`.
    #[serde(rename = "name", alias = "realmName")]
    pub realm_name: String,
    /// Layers in the order the node reports them.
    #[serde(default)]
    pub layers: Vec<LayerStatus>,
}

impl StatusPayload {
    pub fn layer_names(&self) -> Vec<String> {
        self.layers.iter().map(|l| l.name.clone()).collect()
    }
}

/// A single layer entry of a [`StatusPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerStatus {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_users: Option<u32>,
}

impl LayerStatus {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            users_count: None,
            max_users: None,
        }
    }
}

/// How a single probe resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "payload", rename_all = "snake_case")]
pub enum ProbeStatus {
    /// The node answered with a well-formed status body.
    Healthy(StatusPayload),
    /// Connection, HTTP or decode failure.
    Unreachable,
    /// No answer before the probe deadline or the overall budget.
    TimedOut,
}

/// The single, final outcome for one normalized node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    pub node: NormalizedNode,
    pub status: ProbeStatus,
}

impl ProbeOutcome {
    pub fn new(node: NormalizedNode, status: ProbeStatus) -> Self {
        Self { node, status }
    }

    /// The payload, if the node is healthy and reported `ready`.
    pub fn ready_payload(&self) -> Option<&StatusPayload> {
        match &self.status {
            ProbeStatus::Healthy(payload) if payload.ready => Some(payload),
            _ => None,
        }
    }
}
