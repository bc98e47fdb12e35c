/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Assignment of triple patterns to candidate leaves.
//!
//! Constant-predicate triples are grouped greedily around a shared resource
//! (largest group first); whatever is left over, together with every
//! variable-predicate triple, becomes a single-triple leaf.

pub mod mapping;
pub mod triples_group;

pub use mapping::TriplesGroupsMapping;
pub use triples_group::{GroupKind, TriplesGroup};

use crate::error::{PlanningError, PlanningResult};
use crate::nodes::{
    InverseWidePropertyTableNode, JoinedWidePropertyTableNode, PlanNode, TripleTableNode,
    VerticalPartitionNode, WidePropertyTableNode,
};
use crate::settings::{Layout, Settings};
use crate::stats::StatisticsProvider;
use log::{debug, info};
use shared::terms::{ElementType, TriplePattern};
use std::collections::BTreeSet;

/// Builds the candidate leaves for a BGP: grouped nodes first, in extraction
/// order, then one node per remaining triple in input order.
pub fn create_nodes(
    triples: &[TriplePattern],
    settings: &Settings,
    stats: &dyn StatisticsProvider,
) -> PlanningResult<Vec<PlanNode>> {
    let mut nodes = Vec::new();
    let mut pool: Vec<TriplePattern> = triples
        .iter()
        .filter(|t| !t.is_predicate_var())
        .cloned()
        .collect();

    if settings.grouping_enabled && settings.is_using_any_grouped_layout() && !pool.is_empty() {
        info!("Creating grouped nodes...");
        let mut mapping = TriplesGroupsMapping::new(&pool, settings);
        debug!("{} candidate groups", mapping.groups().len());
        while let Some(group) = mapping.extract_best_group() {
            if group.size() < settings.min_group_size {
                break;
            }
            let group_nodes = group.create_nodes(stats)?;
            if group_nodes.is_empty() {
                debug!(
                    "Discarding group around {} ({:?}): layout cannot host it",
                    group.resource, group.kind
                );
                continue;
            }
            let grouped = group.triples();
            debug!("Grouped {} triples around {}", grouped.len(), group.resource);
            mapping.remove_triples(&grouped);
            pool.retain(|t| !grouped.iter().any(|g| g.same_triple(t)));
            nodes.extend(group_nodes);
        }
        info!("Number of unassigned triple patterns: {}", pool.len());
    }

    for triple in triples {
        if triple.is_predicate_var() {
            nodes.push(variable_predicate_node(triple, settings, stats)?);
        } else if pool.iter().any(|t| t.same_triple(triple)) {
            nodes.push(single_triple_node(triple, settings, stats)?);
        }
    }
    Ok(nodes)
}

/// One joined node per cover resource, holding every triple that touches the
/// resource. Triples touching two cover resources appear in both nodes until
/// the overlap is resolved.
pub fn create_cover_nodes(
    triples: &[TriplePattern],
    cover: &BTreeSet<String>,
    layout: Layout,
    stats: &dyn StatisticsProvider,
) -> PlanningResult<Vec<PlanNode>> {
    let mut nodes = Vec::with_capacity(cover.len());
    for resource in cover {
        let mut group = TriplesGroup::new(GroupKind::Joined(layout), resource);
        for triple in triples {
            group.add_triple(triple);
        }
        let forward = group.forward_triples().to_vec();
        let inverse = group.inverse_triples().to_vec();
        let node = JoinedWidePropertyTableNode::new(resource, layout, forward, inverse, stats)?;
        nodes.push(node.into());
    }
    Ok(nodes)
}

/// Leaf for a constant-predicate triple that was not grouped
fn single_triple_node(
    triple: &TriplePattern,
    settings: &Settings,
    stats: &dyn StatisticsProvider,
) -> PlanningResult<PlanNode> {
    let single = vec![triple.clone()];
    if settings.is_using(Layout::WidePropertyTable) {
        return Ok(WidePropertyTableNode::new(single, stats)?.into());
    }
    if settings.is_using(Layout::InverseWidePropertyTable) {
        return Ok(InverseWidePropertyTableNode::new(single, stats)?.into());
    }
    for layout in [Layout::JoinedOuter, Layout::JoinedLeftOuter] {
        if settings.is_using(layout) {
            return Ok(singleton_joined_node(triple, layout, stats)?.into());
        }
    }
    if settings.is_using(Layout::VerticalPartitioning) {
        return Ok(VerticalPartitionNode::new(triple.clone(), stats)?.into());
    }
    if settings.is_using(Layout::TripleTable) {
        return Ok(TripleTableNode::new(triple.clone(), stats)?.into());
    }
    Err(PlanningError::UnassignableTriple(triple.to_string()))
}

/// Leaf for a triple whose predicate is a variable. Property tables are only
/// preferred when an endpoint is bound.
fn variable_predicate_node(
    triple: &TriplePattern,
    settings: &Settings,
    stats: &dyn StatisticsProvider,
) -> PlanningResult<PlanNode> {
    let subject_bound = triple.subject_type == ElementType::Constant;
    let object_bound = triple.object_type == ElementType::Constant;

    if subject_bound && settings.is_using(Layout::WidePropertyTable) {
        return Ok(WidePropertyTableNode::new(vec![triple.clone()], stats)?.into());
    }
    if object_bound && settings.is_using(Layout::InverseWidePropertyTable) {
        return Ok(InverseWidePropertyTableNode::new(vec![triple.clone()], stats)?.into());
    }
    if subject_bound || object_bound {
        for layout in [Layout::JoinedOuter, Layout::JoinedLeftOuter] {
            if settings.is_using(layout) {
                return Ok(singleton_joined_node(triple, layout, stats)?.into());
            }
        }
    }

    if settings.is_using(Layout::TripleTable) {
        return Ok(TripleTableNode::new(triple.clone(), stats)?.into());
    }
    if settings.is_using(Layout::VerticalPartitioning) {
        return Ok(VerticalPartitionNode::new(triple.clone(), stats)?.into());
    }
    if settings.is_using(Layout::WidePropertyTable) {
        return Ok(WidePropertyTableNode::new(vec![triple.clone()], stats)?.into());
    }
    for layout in [Layout::JoinedOuter, Layout::JoinedLeftOuter] {
        if settings.is_using(layout) {
            return Ok(singleton_joined_node(triple, layout, stats)?.into());
        }
    }
    if settings.is_using(Layout::InverseWidePropertyTable) {
        return Ok(InverseWidePropertyTableNode::new(vec![triple.clone()], stats)?.into());
    }
    Err(PlanningError::UnassignableTriple(triple.to_string()))
}

fn singleton_joined_node(
    triple: &TriplePattern,
    layout: Layout,
    stats: &dyn StatisticsProvider,
) -> PlanningResult<JoinedWidePropertyTableNode> {
    JoinedWidePropertyTableNode::new(
        &triple.subject,
        layout,
        vec![triple.clone()],
        Vec::new(),
        stats,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::TriplesNode;
    use crate::stats::{DatabaseStatistics, PredicateStatistics};

    fn stats() -> DatabaseStatistics {
        DatabaseStatistics::new()
            .with_predicate("<title>", PredicateStatistics::new("title", 100, 100))
            .with_predicate("<writtenBy>", PredicateStatistics::new("writtenBy", 120, 100))
            .with_predicate("<name>", PredicateStatistics::new("name", 50, 50))
            .with_predicate("<cites>", PredicateStatistics::new("cites", 300, 80))
    }

    fn bgp() -> Vec<TriplePattern> {
        vec![
            TriplePattern::new("?b", "<title>", "?t"),
            TriplePattern::new("?b", "<writtenBy>", "?a"),
            TriplePattern::new("?a", "<name>", "?n"),
        ]
    }

    fn layouts(nodes: &[PlanNode]) -> Vec<Layout> {
        nodes.iter().filter_map(|n| n.layout()).collect()
    }

    #[test]
    fn test_vertical_partitioning_only() {
        let settings = Settings::with_layouts(&[Layout::VerticalPartitioning]);
        let nodes = create_nodes(&bgp(), &settings, &stats()).unwrap();
        assert_eq!(layouts(&nodes), vec![Layout::VerticalPartitioning; 3]);
    }

    #[test]
    fn test_wpt_groups_by_subject() {
        let settings =
            Settings::with_layouts(&[Layout::WidePropertyTable, Layout::VerticalPartitioning]);
        let nodes = create_nodes(&bgp(), &settings, &stats()).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].layout(), Some(Layout::WidePropertyTable));
        assert_eq!(nodes[0].collect_triples().len(), 2);
        // the leftover goes to a single-triple WPT before VP
        assert_eq!(nodes[1].layout(), Some(Layout::WidePropertyTable));
    }

    #[test]
    fn test_min_group_size_stops_grouping() {
        let settings = Settings::with_layouts(&[Layout::WidePropertyTable])
            .with_layout(Layout::VerticalPartitioning)
            .with_min_group_size(3);
        let nodes = create_nodes(&bgp(), &settings, &stats()).unwrap();
        assert_eq!(nodes.len(), 3);
    }

    #[test]
    fn test_grouping_disabled() {
        let settings = Settings::with_layouts(&[Layout::WidePropertyTable]).with_grouping(false);
        let nodes = create_nodes(&bgp(), &settings, &stats()).unwrap();
        assert_eq!(nodes.len(), 3);
        assert!(nodes.iter().all(|n| n.collect_triples().len() == 1));
    }

    #[test]
    fn test_inner_join_leftover_falls_back_to_vp() {
        let settings =
            Settings::with_layouts(&[Layout::JoinedInner, Layout::VerticalPartitioning]);
        let nodes = create_nodes(&bgp(), &settings, &stats()).unwrap();
        // ?a is the object of writtenBy and the subject of name
        assert_eq!(nodes[0].layout(), Some(Layout::JoinedInner));
        assert_eq!(nodes[0].collect_triples().len(), 2);
        assert_eq!(nodes[1].layout(), Some(Layout::VerticalPartitioning));
        assert_eq!(nodes.len(), 2);
    }

    #[test]
    fn test_variable_predicate_prefers_triple_table() {
        let settings = Settings::with_layouts(&[Layout::TripleTable, Layout::VerticalPartitioning]);
        let triples = vec![TriplePattern::new("?s", "?p", "?o")];
        let nodes = create_nodes(&triples, &settings, &stats()).unwrap();
        assert_eq!(nodes[0].layout(), Some(Layout::TripleTable));
    }

    #[test]
    fn test_variable_predicate_bound_subject_uses_wpt() {
        let settings = Settings::with_layouts(&[Layout::TripleTable, Layout::WidePropertyTable]);
        let triples = vec![TriplePattern::new("<book1>", "?p", "?o")];
        let nodes = create_nodes(&triples, &settings, &stats()).unwrap();
        assert_eq!(nodes[0].layout(), Some(Layout::WidePropertyTable));
    }

    #[test]
    fn test_unassignable_triple() {
        let settings = Settings::with_layouts(&[Layout::JoinedInner]);
        let triples = vec![TriplePattern::new("?s", "<title>", "?o")];
        assert!(matches!(
            create_nodes(&triples, &settings, &stats()),
            Err(PlanningError::UnassignableTriple(_))
        ));
    }

    #[test]
    fn test_cover_nodes_share_triples() {
        let cover: BTreeSet<String> = ["?a".to_string(), "?b".to_string()].into_iter().collect();
        let nodes = create_cover_nodes(&bgp(), &cover, Layout::JoinedOuter, &stats()).unwrap();
        assert_eq!(nodes.len(), 2);
        // writtenBy touches both ?a and ?b
        assert_eq!(nodes[0].collect_triples().len(), 2);
        assert_eq!(nodes[1].collect_triples().len(), 2);
    }
}
