//! Discovery orchestration: registry → normalizer → prober → aggregator.

use std::sync::Arc;

use chrono::Utc;
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::aggregator::aggregate;
use crate::config::DiscoveryConfig;
use crate::domain::{CandidateNode, DiscoveryReport, NormalizedNode, ProbeOutcome, ProbeStatus, Realm};
use crate::error::DiscoveryResult;
use crate::metrics::METRICS;
use crate::normalize::{normalize, normalize_one};
use crate::obs::{
    emit_candidates_listed, emit_discovery_finished, emit_discovery_started, emit_probe_resolved,
    emit_registry_failed, DiscoverySpan,
};
use crate::prober::{Prober, StatusTransport};
use crate::registry::{RegistryClient, RegistrySource};

/// Runs discovery passes against a registry source and a status transport.
///
/// Holds no state between passes; every call to [`RealmDiscovery::discover`]
/// starts from a fresh registry read.
pub struct RealmDiscovery {
    registry: RegistryClient,
    prober: Prober,
    config: DiscoveryConfig,
}

impl RealmDiscovery {
    pub fn new(
        source: Arc<dyn RegistrySource>,
        transport: Arc<dyn StatusTransport>,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            registry: RegistryClient::new(source)
                .with_lookup_concurrency(config.lookup_concurrency)
                .with_lookup_timeout(config.lookup_timeout),
            prober: Prober::new(transport),
            config,
        }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Run one full pass and return the realms with per-stage counts.
    ///
    /// Fails only when the registry cannot be enumerated.
    pub async fn discover(&self) -> DiscoveryResult<DiscoveryReport> {
        let pass_id = Uuid::new_v4();
        self.run_pass(pass_id)
            .instrument(DiscoverySpan::span(pass_id))
            .await
    }

    /// Run one full pass and return only the realm list.
    pub async fn get_realms(&self) -> DiscoveryResult<Vec<Realm>> {
        Ok(self.discover().await?.realms)
    }

    /// Read and normalize the registry without probing.
    pub async fn list_nodes(&self) -> DiscoveryResult<Vec<NormalizedNode>> {
        Ok(normalize(self.registry.list_candidate_nodes().await?))
    }

    /// Normalize and probe a single ad-hoc domain.
    ///
    /// Returns `None` when the domain is rejected by the normalizer.
    pub async fn probe_domain(&self, domain: &str) -> Option<ProbeOutcome> {
        let node = normalize_one(&CandidateNode::new("adhoc", domain))?;
        Some(self.prober.probe_one(&node, self.config.probe_timeout).await)
    }

    async fn run_pass(&self, pass_id: Uuid) -> DiscoveryResult<DiscoveryReport> {
        let started = Instant::now();
        METRICS.inc_passes();
        emit_discovery_started(pass_id);

        let candidates = match self.registry.list_candidate_nodes().await {
            Ok(candidates) => candidates,
            Err(err) => {
                METRICS.inc_failed_passes();
                emit_registry_failed(pass_id, &err);
                return Err(err);
            }
        };
        let candidate_count = candidates.len();
        let nodes = normalize(candidates);
        emit_candidates_listed(candidate_count, nodes.len());

        METRICS.add_probes_launched(nodes.len());
        let outcomes = self
            .prober
            .probe_all(&nodes, self.config.probe_timeout, self.config.total_budget)
            .await;

        let (mut healthy, mut unreachable, mut timed_out) = (0, 0, 0);
        for outcome in &outcomes {
            METRICS.record_probe(&outcome.status);
            emit_probe_resolved(outcome);
            match outcome.status {
                ProbeStatus::Healthy(_) => healthy += 1,
                ProbeStatus::Unreachable => unreachable += 1,
                ProbeStatus::TimedOut => timed_out += 1,
            }
        }

        let realms = aggregate(&outcomes);
        METRICS.add_realms_listed(realms.len());
        emit_discovery_finished(
            pass_id,
            started.elapsed().as_millis() as u64,
            healthy,
            unreachable + timed_out,
            realms.len(),
        );

        Ok(DiscoveryReport {
            pass_id,
            generated_at: Utc::now(),
            candidates: candidate_count,
            normalized: nodes.len(),
            healthy,
            unreachable,
            timed_out,
            realms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{NodeBehavior, ScriptedTransport};
    use crate::registry::StaticRegistrySource;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_report_counts_each_stage() {
        let source = StaticRegistrySource::from_domains([
            "a.example",
            "http://insecure.example",
            "b.example",
            "c.example",
        ]);
        let transport = ScriptedTransport::new()
            .with("https://a.example", NodeBehavior::ready("red", &["amber"]))
            .with("https://b.example", NodeBehavior::refused())
            .with("https://c.example", NodeBehavior::Hang);
        let discovery = RealmDiscovery::new(
            Arc::new(source),
            Arc::new(transport),
            DiscoveryConfig::default(),
        );

        let report = discovery.discover().await.unwrap();
        assert_eq!(report.candidates, 4);
        assert_eq!(report.normalized, 3);
        assert_eq!(report.healthy, 1);
        assert_eq!(report.unreachable, 1);
        assert_eq!(report.timed_out, 1);
        assert_eq!(report.failed_probes(), 2);
        assert_eq!(report.realms.len(), 1);
    }

    #[tokio::test]
    async fn test_probe_domain_rejects_insecure_scheme() {
        let discovery = RealmDiscovery::new(
            Arc::new(StaticRegistrySource::default()),
            Arc::new(ScriptedTransport::new()),
            DiscoveryConfig::default(),
        );
        assert!(discovery.probe_domain("http://peer.example").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_domain_uses_configured_timeout() {
        let transport = ScriptedTransport::new().with(
            "https://peer.example",
            NodeBehavior::ready("red", &[]).after(Duration::from_secs(2)),
        );
        let discovery = RealmDiscovery::new(
            Arc::new(StaticRegistrySource::default()),
            Arc::new(transport),
            DiscoveryConfig::default().with_probe_timeout(Duration::from_secs(1)),
        );
        let outcome = discovery.probe_domain("peer.example").await.unwrap();
        assert_eq!(outcome.status, ProbeStatus::TimedOut);
    }

    #[tokio::test]
    async fn test_list_nodes_normalizes_registry() {
        let discovery = RealmDiscovery::new(
            Arc::new(StaticRegistrySource::from_domains([" a.example ", "http://b.example"])),
            Arc::new(ScriptedTransport::new()),
            DiscoveryConfig::default(),
        );
        let nodes = discovery.list_nodes().await.unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].domain(), "https://a.example");
    }
}
