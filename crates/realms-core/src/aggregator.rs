//! Realm aggregator: collapses probe outcomes into the served realm list.

use std::collections::HashSet;

use crate::domain::{ProbeOutcome, Realm};

/// Build the ordered, deduplicated realm list.
///
/// Only healthy outcomes whose payload reports `ready` contribute. When two
/// nodes report the same realm name the earlier outcome wins, so the result
/// depends only on the order of `outcomes`.
pub fn aggregate(outcomes: &[ProbeOutcome]) -> Vec<Realm> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut realms = Vec::new();

    for outcome in outcomes {
        let Some(payload) = outcome.ready_payload() else {
            continue;
        };
        if !seen.insert(payload.realm_name.as_str()) {
            continue;
        }
        realms.push(Realm {
            id: payload.realm_name.clone(),
            url: outcome.node.domain().to_string(),
            layers: payload.layer_names(),
        });
    }

    realms
}
