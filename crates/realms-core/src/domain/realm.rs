//! Realm output types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A live, joinable realm as served to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Realm {
    /// Realm name as reported by the node.
    pub id: String,
    /// Domain of the node the realm was first seen on.
    pub url: String,
    /// Layer names in node-reported order.
    pub layers: Vec<String>,
}

/// Result of one discovery pass, with per-stage counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub pass_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Records read from the registry.
    pub candidates: usize,
    /// Candidates that survived normalization and were probed.
    pub normalized: usize,
    pub healthy: usize,
    pub unreachable: usize,
    pub timed_out: usize,
    pub realms: Vec<Realm>,
}

impl DiscoveryReport {
    /// Number of normalized nodes that did not answer in time or at all.
    pub fn failed_probes(&self) -> usize {
        self.unreachable + self.timed_out
    }
}
