//! Realms Core Library
//!
//! Discovers the live realms of the Catalyst network: reads candidate nodes
//! from a registry, probes each one's comms status under a deadline and
//! collapses the answers into a deduplicated, order-stable realm list.

pub mod aggregator;
pub mod config;
pub mod discovery;
pub mod domain;
pub mod error;
pub mod fakes;
pub mod metrics;
pub mod normalize;
pub mod obs;
pub mod prober;
pub mod registry;
pub mod telemetry;

pub use aggregator::aggregate;
pub use config::{
    DiscoveryConfig, DEFAULT_LOOKUP_CONCURRENCY, DEFAULT_LOOKUP_TIMEOUT, DEFAULT_PROBE_TIMEOUT,
};
pub use discovery::RealmDiscovery;
pub use domain::{
    CandidateNode, DiscoveryReport, LayerStatus, NormalizedNode, ProbeOutcome, ProbeStatus, Realm,
    StatusPayload, STATUS_PATH,
};
pub use error::{DiscoveryError, DiscoveryResult, LookupFailed, TransportError};
pub use metrics::METRICS;
pub use normalize::{canonical_domain, is_insecure, normalize, normalize_one};
pub use prober::{Prober, StatusTransport};
pub use registry::{RegistryClient, RegistrySource, StaticRegistrySource};
pub use telemetry::{init_tracing, LogFormat};

/// Realms version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
