/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Join tree construction over a pool of candidate leaves.
//!
//! Both builders work on an arena of `Option<PlanNode>` slots; a slot is
//! emptied when its node is moved into a join.

use crate::cost::CostEstimator;
use crate::error::{PlanningError, PlanningResult};
use crate::nodes::{PlanNode, TriplesNode};
use log::debug;

struct CandidatePool {
    slots: Vec<Option<PlanNode>>,
}

impl CandidatePool {
    fn new(nodes: Vec<PlanNode>) -> Self {
        Self {
            slots: nodes.into_iter().map(Some).collect(),
        }
    }

    fn live(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|_| i))
            .collect()
    }

    /// Live slot with the lowest priority, the lowest index on ties
    fn cheapest(&self) -> Option<usize> {
        self.live().into_iter().min_by(|a, b| {
            self.priority(*a)
                .total_cmp(&self.priority(*b))
                .then(a.cmp(b))
        })
    }

    fn priority(&self, index: usize) -> f64 {
        self.slots[index]
            .as_ref()
            .map_or(f64::INFINITY, |node| node.priority())
    }

    fn connected(&self, a: usize, b: usize) -> bool {
        match (&self.slots[a], &self.slots[b]) {
            (Some(left), Some(right)) => left.shares_variable_with(right),
            _ => false,
        }
    }

    fn take(&mut self, index: usize) -> PlanningResult<PlanNode> {
        self.slots[index].take().ok_or_else(|| {
            PlanningError::IncompleteAssignment(format!("slot {} consumed twice", index))
        })
    }

    fn disconnected(&self) -> PlanningError {
        let nodes: Vec<&PlanNode> = self.slots.iter().flatten().collect();
        PlanningError::DisconnectedGraph {
            components: count_components(&nodes),
        }
    }
}

/// Number of groups of nodes connected through shared variables
pub fn count_components(nodes: &[&PlanNode]) -> usize {
    let mut component: Vec<Option<usize>> = vec![None; nodes.len()];
    let mut count = 0;
    for start in 0..nodes.len() {
        if component[start].is_some() {
            continue;
        }
        component[start] = Some(count);
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            for next in 0..nodes.len() {
                if component[next].is_none() && nodes[current].shares_variable_with(nodes[next]) {
                    component[next] = Some(count);
                    stack.push(next);
                }
            }
        }
        count += 1;
    }
    count
}

/// Cost-greedy bushy tree: the cheapest live node is joined with the first
/// connected node in slot order, and the join goes back into the pool.
///
/// The partner is not compared on cost; input nodes keep their input order
/// and joins are appended after them.
pub fn build_root_tree(nodes: Vec<PlanNode>) -> PlanningResult<PlanNode> {
    if nodes.is_empty() {
        return Err(PlanningError::EmptyBgp);
    }
    let mut pool = CandidatePool::new(nodes);
    loop {
        let Some(taken) = pool.cheapest() else {
            return Err(PlanningError::EmptyBgp);
        };
        let live = pool.live();
        if live.len() == 1 {
            return pool.take(taken);
        }
        let matched = live
            .into_iter()
            .find(|&other| other != taken && pool.connected(taken, other));
        let Some(matched) = matched else {
            return Err(pool.disconnected());
        };
        debug!("Joining slot {} with slot {}", taken, matched);
        let left = pool.take(taken)?;
        let right = pool.take(matched)?;
        pool.slots.push(Some(PlanNode::join(left, right)));
    }
}

/// Left-deep tree: the cheapest connected pair forms the bottom join, then
/// the spine grows by the connected candidate giving the cheapest join.
pub fn build_linear_tree(nodes: Vec<PlanNode>) -> PlanningResult<PlanNode> {
    if nodes.is_empty() {
        return Err(PlanningError::EmptyBgp);
    }
    let mut pool = CandidatePool::new(nodes);
    if pool.slots.len() == 1 {
        return pool.take(0);
    }

    let mut bottom: Option<(usize, usize, f64)> = None;
    for i in 0..pool.slots.len() {
        for j in (i + 1)..pool.slots.len() {
            if !pool.connected(i, j) {
                continue;
            }
            let cost = CostEstimator::estimate_join(pool.priority(i), pool.priority(j));
            if bottom.map_or(true, |(_, _, best)| cost < best) {
                bottom = Some((i, j, cost));
            }
        }
    }
    let Some((i, j, _)) = bottom else {
        return Err(pool.disconnected());
    };
    debug!("Bottom join on slots {} and {}", i, j);
    let left = pool.take(i)?;
    let right = pool.take(j)?;
    let mut spine = PlanNode::join(left, right);

    loop {
        let live = pool.live();
        if live.is_empty() {
            return Ok(spine);
        }
        let mut next: Option<(usize, f64)> = None;
        for index in live {
            let Some(candidate) = &pool.slots[index] else {
                continue;
            };
            if !spine.shares_variable_with(candidate) {
                continue;
            }
            let cost = CostEstimator::estimate_join(spine.priority(), candidate.priority());
            if next.map_or(true, |(_, best)| cost < best) {
                next = Some((index, cost));
            }
        }
        let Some((index, _)) = next else {
            pool.slots.push(Some(spine));
            return Err(pool.disconnected());
        };
        debug!("Adding slot {} to the spine", index);
        let right = pool.take(index)?;
        spine = PlanNode::join(spine, right);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::VerticalPartitionNode;
    use crate::stats::{DatabaseStatistics, PredicateStatistics};
    use shared::terms::TriplePattern;

    fn stats() -> DatabaseStatistics {
        DatabaseStatistics::new()
            .with_predicate("<p1>", PredicateStatistics::new("p1", 10, 10))
            .with_predicate("<p2>", PredicateStatistics::new("p2", 20, 20))
            .with_predicate("<p3>", PredicateStatistics::new("p3", 5, 5))
            .with_predicate("<p4>", PredicateStatistics::new("p4", 40, 40))
    }

    fn vp(s: &str, p: &str, o: &str) -> PlanNode {
        VerticalPartitionNode::new(TriplePattern::new(s, p, o), &stats())
            .unwrap()
            .into()
    }

    fn leaf_predicates(node: &PlanNode) -> Vec<String> {
        node.collect_triples().into_iter().map(|t| t.predicate).collect()
    }

    #[test]
    fn test_single_node_is_root() {
        let root = build_root_tree(vec![vp("?a", "<p1>", "?b")]).unwrap();
        assert!(!root.is_join());
        let root = build_linear_tree(vec![vp("?a", "<p1>", "?b")]).unwrap();
        assert!(!root.is_join());
    }

    #[test]
    fn test_root_mode_starts_from_cheapest() {
        let nodes = vec![
            vp("?a", "<p1>", "?b"),
            vp("?b", "<p2>", "?c"),
            vp("?c", "<p3>", "?d"),
        ];
        let root = build_root_tree(nodes).unwrap();
        assert_eq!(root.join_count(), 2);
        // p3 (5) joins p2 (20) first, the result (100) then joins p1 (10)
        match &root {
            PlanNode::Join(join) => {
                assert_eq!(leaf_predicates(&join.left), vec!["<p1>"]);
                assert_eq!(leaf_predicates(&join.right), vec!["<p3>", "<p2>"]);
            }
            _ => panic!("expected a join"),
        }
        assert_eq!(root.priority(), 1000.0);
    }

    #[test]
    fn test_root_mode_partner_is_first_connected_slot() {
        let nodes = vec![
            vp("?x", "<p4>", "?a"),
            vp("?y", "<p2>", "?a"),
            vp("?a", "<p3>", "?z"),
        ];
        let root = build_root_tree(nodes).unwrap();
        // p3 (5) is taken first and pairs with p4 (40), not the cheaper p2 (20)
        match &root {
            PlanNode::Join(join) => {
                assert_eq!(leaf_predicates(&join.left), vec!["<p2>"]);
                assert_eq!(leaf_predicates(&join.right), vec!["<p3>", "<p4>"]);
            }
            _ => panic!("expected a join"),
        }
    }

    #[test]
    fn test_linear_mode_builds_left_deep_tree() {
        let nodes = vec![
            vp("?a", "<p1>", "?b"),
            vp("?b", "<p2>", "?c"),
            vp("?c", "<p3>", "?d"),
            vp("?d", "<p4>", "?e"),
        ];
        let root = build_linear_tree(nodes).unwrap();
        assert_eq!(root.join_count(), 3);
        // cheapest connected pair is p2 x p3 (100)
        assert_eq!(
            leaf_predicates(&root),
            vec!["<p2>", "<p3>", "<p1>", "<p4>"]
        );
        let mut current = &root;
        while let PlanNode::Join(join) = current {
            assert!(!join.right.is_join());
            current = &join.left;
        }
    }

    #[test]
    fn test_disconnected_root_mode() {
        let nodes = vec![vp("?a", "<p1>", "?b"), vp("?c", "<p2>", "?d")];
        assert_eq!(
            build_root_tree(nodes),
            Err(PlanningError::DisconnectedGraph { components: 2 })
        );
    }

    #[test]
    fn test_disconnected_linear_mode() {
        let nodes = vec![
            vp("?a", "<p1>", "?b"),
            vp("?b", "<p2>", "?c"),
            vp("?x", "<p3>", "?y"),
        ];
        assert_eq!(
            build_linear_tree(nodes),
            Err(PlanningError::DisconnectedGraph { components: 2 })
        );
    }

    #[test]
    fn test_empty_pool() {
        assert_eq!(build_root_tree(Vec::new()), Err(PlanningError::EmptyBgp));
    }
}
