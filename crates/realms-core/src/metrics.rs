//! Process-wide atomic counters for discovery passes.
//!
//! Counters are bumped at the call site. Call [`Metrics::flush`] to emit
//! them as one `tracing::info!` event (the daemon does so after each pass).

use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::ProbeStatus;

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    passes_run: AtomicU64,
    passes_failed: AtomicU64,
    probes_launched: AtomicU64,
    probes_healthy: AtomicU64,
    probes_unreachable: AtomicU64,
    probes_timed_out: AtomicU64,
    realms_listed: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            passes_run: AtomicU64::new(0),
            passes_failed: AtomicU64::new(0),
            probes_launched: AtomicU64::new(0),
            probes_healthy: AtomicU64::new(0),
            probes_unreachable: AtomicU64::new(0),
            probes_timed_out: AtomicU64::new(0),
            realms_listed: AtomicU64::new(0),
        }
    }

    pub fn inc_passes(&self) {
        self.passes_run.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failed_passes(&self) {
        self.passes_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_probes_launched(&self, n: usize) {
        self.probes_launched.fetch_add(n as u64, Ordering::Relaxed);
    }

    /// Count one resolved probe under its outcome.
    pub fn record_probe(&self, status: &ProbeStatus) {
        let counter = match status {
            ProbeStatus::Healthy(_) => &self.probes_healthy,
            ProbeStatus::Unreachable => &self.probes_unreachable,
            ProbeStatus::TimedOut => &self.probes_timed_out,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_realms_listed(&self, n: usize) {
        self.realms_listed.fetch_add(n as u64, Ordering::Relaxed);
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            passes_run = self.passes_run(),
            passes_failed = self.passes_failed(),
            probes_launched = self.probes_launched(),
            probes_healthy = self.probes_healthy(),
            probes_unreachable = self.probes_unreachable(),
            probes_timed_out = self.probes_timed_out(),
            realms_listed = self.realms_listed(),
        );
    }

    pub fn passes_run(&self) -> u64 {
        self.passes_run.load(Ordering::Relaxed)
    }

    pub fn passes_failed(&self) -> u64 {
        self.passes_failed.load(Ordering::Relaxed)
    }

    pub fn probes_launched(&self) -> u64 {
        self.probes_launched.load(Ordering::Relaxed)
    }

    pub fn probes_healthy(&self) -> u64 {
        self.probes_healthy.load(Ordering::Relaxed)
    }

    pub fn probes_unreachable(&self) -> u64 {
        self.probes_unreachable.load(Ordering::Relaxed)
    }

    pub fn probes_timed_out(&self) -> u64 {
        self.probes_timed_out.load(Ordering::Relaxed)
    }

    pub fn realms_listed(&self) -> u64 {
        self.realms_listed.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        for counter in [
            &self.passes_run,
            &self.passes_failed,
            &self.probes_launched,
            &self.probes_healthy,
            &self.probes_unreachable,
            &self.probes_timed_out,
            &self.realms_listed,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
