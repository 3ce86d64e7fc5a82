//! Discovery pass configuration.

use std::time::Duration;

/// Per-probe deadline used when nothing else is configured.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Concurrent registry index lookups used when nothing else is configured.
pub const DEFAULT_LOOKUP_CONCURRENCY: usize = 16;

/// Deadline for each registry call (`count` or one `node_at`).
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(15);

/// Timing and fan-out knobs for one discovery pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Deadline for each individual node probe.
    pub probe_timeout: Duration,
    /// Optional upper bound on the whole probe fan-out.
    pub total_budget: Option<Duration>,
    /// Maximum registry `node_at` lookups in flight at once.
    pub lookup_concurrency: usize,
    /// Deadline for each registry call.
    pub lookup_timeout: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            total_budget: None,
            lookup_concurrency: DEFAULT_LOOKUP_CONCURRENCY,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }
}

impl DiscoveryConfig {
    /// Build a config from `REALMS_PROBE_TIMEOUT_MS`, `REALMS_TOTAL_BUDGET_MS`,
    /// `REALMS_LOOKUP_CONCURRENCY` and `REALMS_LOOKUP_TIMEOUT_MS`. Unset or
    /// invalid values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let millis = |key: &str| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
        };

        Self {
            probe_timeout: millis("REALMS_PROBE_TIMEOUT_MS").unwrap_or(defaults.probe_timeout),
            total_budget: millis("REALMS_TOTAL_BUDGET_MS").or(defaults.total_budget),
            lookup_concurrency: lookup("REALMS_LOOKUP_CONCURRENCY")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.lookup_concurrency),
            lookup_timeout: millis("REALMS_LOOKUP_TIMEOUT_MS").unwrap_or(defaults.lookup_timeout),
        }
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_total_budget(mut self, budget: Option<Duration>) -> Self {
        self.total_budget = budget;
        self
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Zero is clamped to one so lookups always make progress.
    pub fn with_lookup_concurrency(mut self, concurrency: usize) -> Self {
        self.lookup_concurrency = concurrency.max(1);
        self
    }
}
