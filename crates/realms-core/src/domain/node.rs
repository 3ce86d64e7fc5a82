//! Registry node records before and after normalization.

use serde::{Deserialize, Serialize};

use crate::domain::status::STATUS_PATH;

/// A node record exactly as the registry returned it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateNode {
    /// Opaque registry identifier.
    pub id: String,
    /// Raw domain string; may lack a scheme or carry stray whitespace.
    pub domain: String,
}

impl CandidateNode {
    pub fn new(id: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            domain: domain.into(),
        }
    }
}

/// A candidate whose domain is an `https://` URL with no surrounding
/// whitespace and no trailing slash.
///
/// Only [`crate::normalize`] builds these, so holding one is proof the
/// node passed the transport policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NormalizedNode {
    id: String,
    domain: String,
}

impl NormalizedNode {
    pub(crate) fn new(id: String, domain: String) -> Self {
        Self { id, domain }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Full URL of the node's comms status endpoint.
    pub fn status_url(&self) -> String {
        format!("{}{}", self.domain, STATUS_PATH)
    }
}

impl std::fmt::Display for NormalizedNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_url_appends_comms_path() {
        let node = NormalizedNode::new("0x01".into(), "https://peer.example.org".into());
        assert_eq!(
            node.status_url(),
            "https://peer.example.org/comms/status?includeLayers=true"
        );
    }

    #[test]
    fn test_candidate_roundtrips_through_json() {
        let node = CandidateNode::new("0xab", " peer.example.org ");
        let json = serde_json::to_string(&node).unwrap();
        let back: CandidateNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }
}
