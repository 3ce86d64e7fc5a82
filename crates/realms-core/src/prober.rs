//! Liveness prober: one bounded status check per node, all in parallel.
//!
//! Every probe runs as its own tokio task racing three things: the overall
//! budget (a child of a shared [`CancellationToken`]), its own deadline and
//! the transport call. Whichever finishes first decides the outcome and the
//! losers are dropped, so a late response can never overwrite a timeout.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn, Instrument};

use crate::domain::{NormalizedNode, ProbeOutcome, ProbeStatus, StatusPayload};
use crate::error::TransportError;

/// Injectable HTTP transport for node status requests.
///
/// Dropping the returned future must abort the request.
#[async_trait]
pub trait StatusTransport: Send + Sync {
    /// Fetch `domain` + [`crate::STATUS_PATH`] and decode the body.
    async fn fetch_status(&self, domain: &str) -> Result<StatusPayload, TransportError>;
}

/// Fans status probes out over a [`StatusTransport`].
pub struct Prober {
    transport: Arc<dyn StatusTransport>,
}

impl Prober {
    pub fn new(transport: Arc<dyn StatusTransport>) -> Self {
        Self { transport }
    }

    /// Probe every node concurrently and return one outcome per node, in
    /// input order.
    ///
    /// Returns only after every probe task has finished. When `total_budget`
    /// elapses first, all pending probes are cancelled and resolve to
    /// [`ProbeStatus::TimedOut`].
    pub async fn probe_all(
        &self,
        nodes: &[NormalizedNode],
        per_probe_timeout: Duration,
        total_budget: Option<Duration>,
    ) -> Vec<ProbeOutcome> {
        if nodes.is_empty() {
            return Vec::new();
        }

        let budget = CancellationToken::new();
        let mut join_set = JoinSet::new();
        for (idx, node) in nodes.iter().enumerate() {
            let transport = Arc::clone(&self.transport);
            let domain = node.domain().to_string();
            let cancel = budget.child_token();
            let span = tracing::debug_span!(
                "realms.probe",
                node_id = %node.id(),
                url = %node.status_url()
            );
            join_set.spawn(
                async move {
                    let status =
                        probe_node(transport.as_ref(), &domain, per_probe_timeout, cancel).await;
                    (idx, status)
                }
                .instrument(span),
            );
        }

        let budget_expiry = async {
            match total_budget {
                Some(limit) => sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(budget_expiry);
        let mut budget_spent = false;

        let mut slots: Vec<Option<ProbeStatus>> = vec![None; nodes.len()];
        loop {
            tokio::select! {
                joined = join_set.join_next() => {
                    let Some(joined) = joined else { break };
                    match joined {
                        Ok((idx, status)) => slots[idx] = Some(status),
                        Err(e) => warn!(error = %e, "probe task did not complete"),
                    }
                }
                _ = &mut budget_expiry, if !budget_spent => {
                    budget_spent = true;
                    warn!(
                        pending = join_set.len(),
                        "probe budget exhausted, cancelling pending probes"
                    );
                    budget.cancel();
                }
            }
        }

        nodes
            .iter()
            .cloned()
            .zip(slots)
            .map(|(node, slot)| {
                let status = slot.unwrap_or_else(|| {
                    warn!(domain = %node.domain(), "probe produced no result, marking unreachable");
                    ProbeStatus::Unreachable
                });
                ProbeOutcome::new(node, status)
            })
            .collect()
    }

    /// Probe a single node with no overall budget.
    pub async fn probe_one(&self, node: &NormalizedNode, timeout: Duration) -> ProbeOutcome {
        let status = probe_node(
            self.transport.as_ref(),
            node.domain(),
            timeout,
            CancellationToken::new(),
        )
        .await;
        ProbeOutcome::new(node.clone(), status)
    }
}

async fn probe_node(
    transport: &dyn StatusTransport,
    domain: &str,
    timeout: Duration,
    cancel: CancellationToken,
) -> ProbeStatus {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!("probe cancelled by overall budget");
            ProbeStatus::TimedOut
        }
        _ = sleep(timeout) => {
            debug!(timeout_ms = timeout.as_millis() as u64, "aborting status fetch");
            ProbeStatus::TimedOut
        }
        result = transport.fetch_status(domain) => match result {
            Ok(payload) => ProbeStatus::Healthy(payload),
            Err(err) => {
                debug!(error = %err, "node unreachable");
                ProbeStatus::Unreachable
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{NodeBehavior, ScriptedTransport};
    use crate::normalize::normalize;
    use crate::CandidateNode;
    use tokio::time::Instant;

    fn nodes(domains: &[&str]) -> Vec<NormalizedNode> {
        normalize(
            domains
                .iter()
                .enumerate()
                .map(|(i, d)| CandidateNode::new(format!("0x{i:02x}"), *d))
                .collect(),
        )
    }

    fn realm_of(outcome: &ProbeOutcome) -> Option<&str> {
        match &outcome.status {
            ProbeStatus::Healthy(p) => Some(p.realm_name.as_str()),
            _ => None,
        }
    }

    const FIVE_SECS: Duration = Duration::from_secs(5);

    #[tokio::test(start_paused = true)]
    async fn test_outcomes_follow_input_order_not_completion_order() {
        let transport = ScriptedTransport::new()
            .with("https://a.example", NodeBehavior::ready("alpha", &[]).after(Duration::from_millis(300)))
            .with("https://b.example", NodeBehavior::ready("beta", &[]).after(Duration::from_millis(200)))
            .with("https://c.example", NodeBehavior::ready("gamma", &[]).after(Duration::from_millis(100)));
        let prober = Prober::new(Arc::new(transport));

        let outcomes = prober
            .probe_all(&nodes(&["a.example", "b.example", "c.example"]), FIVE_SECS, None)
            .await;

        let realms: Vec<_> = outcomes.iter().map(realm_of).collect();
        assert_eq!(realms, vec![Some("alpha"), Some("beta"), Some("gamma")]);
        assert_eq!(outcomes[0].node.domain(), "https://a.example");
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_transport_times_out_at_probe_deadline() {
        let transport = ScriptedTransport::new().with("https://slow.example", NodeBehavior::Hang);
        let prober = Prober::new(Arc::new(transport));

        let started = Instant::now();
        let outcomes = prober
            .probe_all(&nodes(&["slow.example"]), FIVE_SECS, None)
            .await;
        let elapsed = started.elapsed();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].status, ProbeStatus::TimedOut);
        assert!(elapsed >= FIVE_SECS);
        assert!(elapsed < FIVE_SECS + Duration::from_millis(50), "elapsed={elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_does_not_upgrade_timeout() {
        let transport = ScriptedTransport::new().with(
            "https://late.example",
            NodeBehavior::ready("red", &["amber"]).after(Duration::from_secs(6)),
        );
        let prober = Prober::new(Arc::new(transport));

        let outcomes = prober
            .probe_all(&nodes(&["late.example"]), FIVE_SECS, None)
            .await;
        assert_eq!(outcomes[0].status, ProbeStatus::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_is_unreachable_and_siblings_unaffected() {
        let transport = ScriptedTransport::new()
            .with("https://down.example", NodeBehavior::status(502))
            .with("https://up.example", NodeBehavior::ready("red", &["amber"]))
            .with("https://garbled.example", NodeBehavior::malformed());
        let prober = Prober::new(Arc::new(transport));

        let outcomes = prober
            .probe_all(
                &nodes(&["down.example", "up.example", "garbled.example"]),
                FIVE_SECS,
                None,
            )
            .await;

        assert_eq!(outcomes[0].status, ProbeStatus::Unreachable);
        assert_eq!(realm_of(&outcomes[1]), Some("red"));
        assert_eq!(outcomes[2].status, ProbeStatus::Unreachable);
    }

    #[tokio::test(start_paused = true)]
    async fn test_total_budget_cancels_pending_probes_but_returns_all() {
        let transport = ScriptedTransport::new()
            .with("https://fast.example", NodeBehavior::ready("red", &[]))
            .with("https://hang.example", NodeBehavior::Hang)
            .with(
                "https://slow.example",
                NodeBehavior::ready("blue", &[]).after(Duration::from_secs(3)),
            );
        let transport = Arc::new(transport);
        let prober = Prober::new(transport.clone());

        let started = Instant::now();
        let outcomes = prober
            .probe_all(
                &nodes(&["fast.example", "hang.example", "slow.example"]),
                FIVE_SECS,
                Some(Duration::from_secs(1)),
            )
            .await;
        let elapsed = started.elapsed();

        assert_eq!(outcomes.len(), 3);
        assert_eq!(realm_of(&outcomes[0]), Some("red"));
        assert_eq!(outcomes[1].status, ProbeStatus::TimedOut);
        assert_eq!(outcomes[2].status, ProbeStatus::TimedOut);
        assert!(elapsed < Duration::from_secs(2), "elapsed={elapsed:?}");
        assert_eq!(transport.in_flight(), 0, "no probe may outlive probe_all");
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_probe_times_out_full_coverage() {
        let domains: Vec<String> = (0..8).map(|i| format!("n{i}.example")).collect();
        let mut transport = ScriptedTransport::new();
        for d in &domains {
            transport = transport.with(&format!("https://{d}"), NodeBehavior::Hang);
        }
        let prober = Prober::new(Arc::new(transport));
        let refs: Vec<&str> = domains.iter().map(String::as_str).collect();
        let input = nodes(&refs);

        let outcomes = prober.probe_all(&input, FIVE_SECS, None).await;

        assert_eq!(outcomes.len(), input.len());
        for (outcome, node) in outcomes.iter().zip(&input) {
            assert_eq!(&outcome.node, node);
            assert_eq!(outcome.status, ProbeStatus::TimedOut);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_probes_run_concurrently() {
        let mut transport = ScriptedTransport::new();
        let mut domains = Vec::new();
        for i in 0..10 {
            let d = format!("p{i}.example");
            transport = transport.with(
                &format!("https://{d}"),
                NodeBehavior::ready("red", &[]).after(Duration::from_secs(1)),
            );
            domains.push(d);
        }
        let transport = Arc::new(transport);
        let prober = Prober::new(transport.clone());
        let refs: Vec<&str> = domains.iter().map(String::as_str).collect();

        let started = Instant::now();
        let outcomes = prober.probe_all(&nodes(&refs), FIVE_SECS, None).await;

        assert_eq!(outcomes.len(), 10);
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(transport.max_in_flight() > 1);
    }

    #[tokio::test]
    async fn test_panicking_probe_still_yields_outcome() {
        let transport = ScriptedTransport::new()
            .with("https://boom.example", NodeBehavior::Panic)
            .with("https://ok.example", NodeBehavior::ready("red", &[]));
        let prober = Prober::new(Arc::new(transport));

        let outcomes = prober
            .probe_all(&nodes(&["boom.example", "ok.example"]), FIVE_SECS, None)
            .await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].status, ProbeStatus::Unreachable);
        assert_eq!(realm_of(&outcomes[1]), Some("red"));
    }

    #[tokio::test]
    async fn test_empty_input_returns_empty() {
        let prober = Prober::new(Arc::new(ScriptedTransport::new()));
        assert!(prober.probe_all(&[], FIVE_SECS, None).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_one_reports_single_outcome() {
        let transport =
            ScriptedTransport::new().with("https://one.example", NodeBehavior::not_ready("red"));
        let prober = Prober::new(Arc::new(transport));
        let node = &nodes(&["one.example"])[0];

        let outcome = prober.probe_one(node, FIVE_SECS).await;
        assert_eq!(outcome.node, *node);
        assert!(outcome.ready_payload().is_none());
        assert!(matches!(outcome.status, ProbeStatus::Healthy(_)));
    }
}
