//! Domain model for a single discovery pass.
//!
//! Every type here is transient: built during one pass and dropped with it.

pub mod node;
pub mod realm;
pub mod status;

pub use node::{CandidateNode, NormalizedNode};
pub use realm::{DiscoveryReport, Realm};
pub use status::{LayerStatus, ProbeOutcome, ProbeStatus, StatusPayload, STATUS_PATH};
