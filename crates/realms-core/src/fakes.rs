//! In-memory fakes for the discovery traits (testing only)
//!
//! Provides `ScriptedTransport` and `BrokenRegistrySource`, which satisfy
//! the trait contracts without any network access.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{CandidateNode, LayerStatus, StatusPayload};
use crate::error::{LookupFailed, TransportError};
use crate::prober::StatusTransport;
use crate::registry::RegistrySource;

// ---------------------------------------------------------------------------
// ScriptedTransport
// ---------------------------------------------------------------------------

/// What a scripted node does when probed.
#[derive(Debug, Clone)]
pub enum NodeBehavior {
    /// Answer with `payload` after `delay`.
    Respond {
        payload: StatusPayload,
        delay: Duration,
    },
    /// Fail with `error` after `delay`.
    Fail {
        error: TransportError,
        delay: Duration,
    },
    /// Never answer.
    Hang,
    /// Panic inside the probe.
    Panic,
}

impl NodeBehavior {
    pub fn ready(realm: &str, layers: &[&str]) -> Self {
        Self::respond(true, realm, layers)
    }

    pub fn not_ready(realm: &str) -> Self {
        Self::respond(false, realm, &[])
    }

    pub fn status(code: u16) -> Self {
        Self::Fail {
            error: TransportError::Status(code),
            delay: Duration::ZERO,
        }
    }

    pub fn refused() -> Self {
        Self::Fail {
            error: TransportError::Request("connection refused".to_string()),
            delay: Duration::ZERO,
        }
    }

    pub fn malformed() -> Self {
        Self::Fail {
            error: TransportError::Decode("expected value at line 1 column 1".to_string()),
            delay: Duration::ZERO,
        }
    }

    /// Delay the answer (or failure) by `delay`. No effect on `Hang`/`Panic`.
    pub fn after(self, delay: Duration) -> Self {
        match self {
            Self::Respond { payload, .. } => Self::Respond { payload, delay },
            Self::Fail { error, .. } => Self::Fail { error, delay },
            other => other,
        }
    }

    fn respond(ready: bool, realm: &str, layers: &[&str]) -> Self {
        Self::Respond {
            payload: StatusPayload {
                ready,
                realm_name: realm.to_string(),
                layers: layers.iter().map(|l| LayerStatus::named(*l)).collect(),
            },
            delay: Duration::ZERO,
        }
    }
}

/// Transport whose answers are scripted per domain.
///
/// Unknown domains fail as refused connections. Tracks how many fetches are
/// in flight, counting a cancelled fetch as finished.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    behaviors: HashMap<String, NodeBehavior>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the behavior for a normalized domain such as `https://a.example`.
    pub fn with(mut self, domain: &str, behavior: NodeBehavior) -> Self {
        self.behaviors.insert(domain.to_string(), behavior);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl StatusTransport for ScriptedTransport {
    async fn fetch_status(&self, domain: &str) -> Result<StatusPayload, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        match self.behaviors.get(domain).cloned() {
            Some(NodeBehavior::Respond { payload, delay }) => {
                tokio::time::sleep(delay).await;
                Ok(payload)
            }
            Some(NodeBehavior::Fail { error, delay }) => {
                tokio::time::sleep(delay).await;
                Err(error)
            }
            Some(NodeBehavior::Hang) => std::future::pending().await,
            Some(NodeBehavior::Panic) => panic!("scripted panic probing {domain}"),
            None => Err(TransportError::Request(format!("unknown node {domain}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// BrokenRegistrySource
// ---------------------------------------------------------------------------

/// Registry source that fails or stalls on `count`, or fails at one index.
#[derive(Debug, Clone)]
pub struct BrokenRegistrySource {
    nodes: Vec<CandidateNode>,
    fail_count: Option<String>,
    stall_count: bool,
    corrupt_index: Option<u64>,
}

impl BrokenRegistrySource {
    /// `count` fails with `detail`.
    pub fn unavailable(detail: &str) -> Self {
        Self {
            nodes: Vec::new(),
            fail_count: Some(detail.to_string()),
            stall_count: false,
            corrupt_index: None,
        }
    }

    /// `count` never answers.
    pub fn silent() -> Self {
        Self {
            nodes: Vec::new(),
            fail_count: None,
            stall_count: true,
            corrupt_index: None,
        }
    }

    /// `count` succeeds, `node_at(index)` fails.
    pub fn corrupt_at(nodes: Vec<CandidateNode>, index: u64) -> Self {
        Self {
            nodes,
            fail_count: None,
            stall_count: false,
            corrupt_index: Some(index),
        }
    }
}

#[async_trait]
impl RegistrySource for BrokenRegistrySource {
    async fn count(&self) -> Result<u64, LookupFailed> {
        if self.stall_count {
            return std::future::pending().await;
        }
        match &self.fail_count {
            Some(detail) => Err(LookupFailed::new(detail.clone())),
            None => Ok(self.nodes.len() as u64),
        }
    }

    async fn node_at(&self, index: u64) -> Result<CandidateNode, LookupFailed> {
        if Some(index) == self.corrupt_index {
            return Err(LookupFailed::new(format!("undecodable record at {index}")));
        }
        usize::try_from(index)
            .ok()
            .and_then(|i| self.nodes.get(i))
            .cloned()
            .ok_or_else(|| LookupFailed::new(format!("no node at index {index}")))
    }
}
