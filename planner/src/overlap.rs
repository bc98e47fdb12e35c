/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::nodes::{PlanNode, TriplesNode};
use log::debug;
use shared::terms::TriplePattern;

/// Makes the nodes' triple sets disjoint. For every pair the shared triples
/// stay with the cheaper node (the earlier one on equal priority); nodes
/// left without triples are dropped.
pub fn resolve_overlap(mut nodes: Vec<PlanNode>) -> Vec<PlanNode> {
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            let right = nodes[j].collect_triples();
            let shared: Vec<TriplePattern> = nodes[i]
                .collect_triples()
                .into_iter()
                .filter(|t| right.iter().any(|r| r.same_triple(t)))
                .collect();
            if shared.is_empty() {
                continue;
            }
            let loser = if nodes[i].priority() > nodes[j].priority() {
                i
            } else {
                j
            };
            debug!("Removing {} shared triples from node {}", shared.len(), loser);
            nodes[loser].remove_triples(&shared);
        }
    }
    nodes.retain(|n| !n.collect_triples().is_empty());
    nodes
}
