/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Enumeration of the minimum vertex covers of a BGP, seen as a multigraph
//! with one subject-object edge per triple.

use crate::error::{PlanningError, PlanningResult};
use log::debug;
use rustc_hash::FxHashSet;
use shared::terms::TriplePattern;
use std::collections::BTreeSet;

pub type VertexCover = BTreeSet<String>;

/// All minimum-cardinality vertex covers, sorted.
pub fn minimum_vertex_covers(triples: &[TriplePattern]) -> PlanningResult<Vec<VertexCover>> {
    Ok(bounded_minimum_vertex_covers(triples, usize::MAX)?.unwrap_or_default())
}

/// Like [`minimum_vertex_covers`], but gives up with `None` as soon as more
/// than `candidate_limit` candidates survive pruning.
///
/// Candidates are expanded edge by edge; a candidate that already covers the
/// edge is carried over, any other branches on the two endpoints. Dominated
/// candidates (duplicates and strict supersets) are pruned after every edge.
pub fn bounded_minimum_vertex_covers(
    triples: &[TriplePattern],
    candidate_limit: usize,
) -> PlanningResult<Option<Vec<VertexCover>>> {
    let Some(first) = triples.first() else {
        return Err(PlanningError::EmptyBgp);
    };

    let mut candidates: Vec<VertexCover> = vec![BTreeSet::from([first.subject.clone()])];
    if first.object != first.subject {
        candidates.push(BTreeSet::from([first.object.clone()]));
    }

    for triple in &triples[1..] {
        let (u, v) = (&triple.subject, &triple.object);
        let mut next = Vec::with_capacity(candidates.len() * 2);
        for candidate in candidates {
            if candidate.contains(u) || candidate.contains(v) {
                next.push(candidate);
                continue;
            }
            let mut with_u = candidate.clone();
            with_u.insert(u.clone());
            next.push(with_u);
            if u != v {
                let mut with_v = candidate;
                with_v.insert(v.clone());
                next.push(with_v);
            }
        }
        candidates = prune_dominated(next);
        if candidates.len() > candidate_limit {
            debug!(
                "{} vertex cover candidates exceed the limit of {}",
                candidates.len(),
                candidate_limit
            );
            return Ok(None);
        }
    }
    debug!("{} vertex cover candidates", candidates.len());

    let min_size = candidates.iter().map(|c| c.len()).min().unwrap_or(0);
    candidates.retain(|c| c.len() == min_size);
    let mut covers = prune_dominated(candidates);
    covers.sort();
    Ok(Some(covers))
}

/// Drops duplicates and every candidate that strictly contains another one
fn prune_dominated(candidates: Vec<VertexCover>) -> Vec<VertexCover> {
    let mut unique: Vec<VertexCover> = candidates
        .into_iter()
        .collect::<FxHashSet<_>>()
        .into_iter()
        .collect();
    unique.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

    // a superset of a dropped candidate is also a superset of a kept one
    let mut kept: Vec<VertexCover> = Vec::with_capacity(unique.len());
    for candidate in unique {
        let dominated = kept
            .iter()
            .any(|k| k.len() < candidate.len() && k.is_subset(&candidate));
        if !dominated {
            kept.push(candidate);
        }
    }
    kept
}

/// Whether every triple has its subject or object in the cover
pub fn is_vertex_cover(triples: &[TriplePattern], cover: &VertexCover) -> bool {
    triples
        .iter()
        .all(|t| cover.contains(&t.subject) || cover.contains(&t.object))
}
