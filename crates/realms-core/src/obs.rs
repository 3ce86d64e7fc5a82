//! Structured lifecycle events for discovery passes.
//!
//! Events are emitted at `info!` (per-probe events at `debug!`). Filter with
//! `RUST_LOG`; pass `--json` to the binaries for JSON lines.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{ProbeOutcome, ProbeStatus};
use crate::error::DiscoveryError;

/// Pass-scoped span; attach with `.instrument(DiscoverySpan::span(pass_id))`.
pub struct DiscoverySpan;

impl DiscoverySpan {
    pub fn span(pass_id: Uuid) -> tracing::Span {
        tracing::info_span!("realms.discovery", pass_id = %pass_id)
    }
}

pub fn emit_discovery_started(pass_id: Uuid) {
    info!(event = "discovery.started", pass_id = %pass_id);
}

pub fn emit_candidates_listed(candidates: usize, normalized: usize) {
    info!(
        event = "discovery.candidates_listed",
        candidates = candidates,
        normalized = normalized,
        dropped = candidates.saturating_sub(normalized),
    );
}

pub fn emit_probe_resolved(outcome: &ProbeOutcome) {
    let status = match &outcome.status {
        ProbeStatus::Healthy(p) if p.ready => "ready",
        ProbeStatus::Healthy(_) => "not_ready",
        ProbeStatus::Unreachable => "unreachable",
        ProbeStatus::TimedOut => "timed_out",
    };
    debug!(
        event = "discovery.probe_resolved",
        node_id = %outcome.node.id(),
        domain = %outcome.node.domain(),
        status = status,
    );
}

pub fn emit_discovery_finished(
    pass_id: Uuid,
    duration_ms: u64,
    healthy: usize,
    failed: usize,
    realms: usize,
) {
    info!(
        event = "discovery.finished",
        pass_id = %pass_id,
        duration_ms = duration_ms,
        healthy = healthy,
        failed = failed,
        realms = realms,
    );
}

pub fn emit_registry_failed(pass_id: Uuid, error: &DiscoveryError) {
    warn!(
        event = "discovery.registry_failed",
        pass_id = %pass_id,
        code = error.code(),
        error = %error,
    );
}
