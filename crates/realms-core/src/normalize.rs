//! Node normalizer: transport policy for registry domains.
//!
//! Pure filter+map. Candidates that violate the policy are dropped, never
//! reported as errors.

use tracing::debug;
use url::Url;

use crate::domain::{CandidateNode, NormalizedNode};

const INSECURE_SCHEME: &str = "http://";
const SECURE_SCHEME: &str = "https://";

/// Normalize candidates in order, dropping those that cannot be served over
/// `https://`.
pub fn normalize(candidates: Vec<CandidateNode>) -> Vec<NormalizedNode> {
    candidates
        .into_iter()
        .filter_map(|candidate| {
            let node = normalize_one(&candidate);
            if node.is_none() {
                debug!(id = %candidate.id, domain = %candidate.domain, "dropping candidate node");
            }
            node
        })
        .collect()
}

/// Normalize a single candidate, or `None` when it must be dropped.
pub fn normalize_one(candidate: &CandidateNode) -> Option<NormalizedNode> {
    if is_insecure(&candidate.domain) {
        return None;
    }
    let domain = canonical_domain(&candidate.domain)?;
    Some(NormalizedNode::new(candidate.id.clone(), domain))
}

/// True when the trimmed domain starts with `http://` (any case).
pub fn is_insecure(domain: &str) -> bool {
    starts_with_ignore_case(domain.trim(), INSECURE_SCHEME)
}

/// Trim, force a lowercase `https://` prefix and strip trailing slashes.
///
/// Returns `None` when the result is not a URL with a host. Does not apply
/// the insecure-scheme rule; see [`is_insecure`].
pub fn canonical_domain(domain: &str) -> Option<String> {
    let trimmed = domain.trim();
    let rest = if starts_with_ignore_case(trimmed, SECURE_SCHEME) {
        &trimmed[SECURE_SCHEME.len()..]
    } else {
        trimmed
    };
    let rest = rest.trim_end_matches('/');
    if rest.is_empty() {
        return None;
    }

    let canonical = format!("{SECURE_SCHEME}{rest}");
    match Url::parse(&canonical) {
        Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => Some(canonical),
        _ => None,
    }
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
