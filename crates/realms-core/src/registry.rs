//! Registry client: reads the authoritative candidate node list.
//!
//! [`RegistryClient`] drives any [`RegistrySource`] (the on-chain contract in
//! production, [`StaticRegistrySource`] for local runs and tests) and turns
//! its failures into pass-level [`DiscoveryError`]s.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::{DEFAULT_LOOKUP_CONCURRENCY, DEFAULT_LOOKUP_TIMEOUT};
use crate::domain::CandidateNode;
use crate::error::{DiscoveryError, DiscoveryResult, LookupFailed};

/// Injectable source of truth for registered nodes.
///
/// Implementations decide whether concurrent `node_at` calls are safe; the
/// client only issues them up to its configured bound.
#[async_trait]
pub trait RegistrySource: Send + Sync {
    /// Number of registered nodes.
    async fn count(&self) -> Result<u64, LookupFailed>;

    /// The node stored at `index`, for `index` in `[0, count)`.
    async fn node_at(&self, index: u64) -> Result<CandidateNode, LookupFailed>;
}

/// Reads every candidate node from a [`RegistrySource`].
pub struct RegistryClient {
    source: Arc<dyn RegistrySource>,
    lookup_concurrency: usize,
    lookup_timeout: Duration,
}

impl RegistryClient {
    pub fn new(source: Arc<dyn RegistrySource>) -> Self {
        Self {
            source,
            lookup_concurrency: DEFAULT_LOOKUP_CONCURRENCY,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_lookup_concurrency(mut self, concurrency: usize) -> Self {
        self.lookup_concurrency = concurrency.max(1);
        self
    }

    /// Bound each `count` and `node_at` call; an expired call fails like a
    /// source error.
    pub fn with_lookup_timeout(mut self, lookup_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }

    /// List all candidate nodes in registry index order.
    ///
    /// Fails with [`DiscoveryError::RegistryUnavailable`] when the count
    /// cannot be read in time and with [`DiscoveryError::RegistryCorrupt`]
    /// when any single record cannot. No partial list is ever returned.
    pub async fn list_candidate_nodes(&self) -> DiscoveryResult<Vec<CandidateNode>> {
        let limit = self.lookup_timeout;
        let count = timeout(limit, self.source.count())
            .await
            .unwrap_or_else(|_| Err(expired("count", limit)))
            .map_err(|e| DiscoveryError::RegistryUnavailable { detail: e.0 })?;
        debug!(count, "registry reports candidate nodes");

        stream::iter(0..count)
            .map(|index| {
                let source = Arc::clone(&self.source);
                async move {
                    timeout(limit, source.node_at(index))
                        .await
                        .unwrap_or_else(|_| Err(expired("node_at", limit)))
                        .map_err(|e| DiscoveryError::RegistryCorrupt {
                            index,
                            detail: e.0,
                        })
                }
            })
            .buffered(self.lookup_concurrency)
            .try_collect()
            .await
    }
}

fn expired(call: &str, limit: Duration) -> LookupFailed {
    warn!(call, timeout_ms = limit.as_millis() as u64, "registry call timed out");
    LookupFailed::new(format!("{call} timed out after {}ms", limit.as_millis()))
}

/// Registry source backed by a fixed in-memory list.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistrySource {
    nodes: Vec<CandidateNode>,
}

impl StaticRegistrySource {
    pub fn new(nodes: Vec<CandidateNode>) -> Self {
        Self { nodes }
    }

    /// Build a source from bare domains, assigning ids `static-0`, `static-1`, ...
    pub fn from_domains<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let nodes = domains
            .into_iter()
            .enumerate()
            .map(|(i, domain)| CandidateNode::new(format!("static-{i}"), domain))
            .collect();
        Self { nodes }
    }
}

#[async_trait]
impl RegistrySource for StaticRegistrySource {
    async fn count(&self) -> Result<u64, LookupFailed> {
        Ok(self.nodes.len() as u64)
    }

    async fn node_at(&self, index: u64) -> Result<CandidateNode, LookupFailed> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.nodes.get(i))
            .cloned()
            .ok_or_else(|| LookupFailed::new(format!("no node at index {index}")))
    }
}
