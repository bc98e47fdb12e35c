/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::error::{PlanningError, PlanningResult};
use crate::grouping::{create_cover_nodes, create_nodes};
use crate::join_tree::{build_linear_tree, build_root_tree};
use crate::nodes::{PlanNode, TriplesNode};
use crate::overlap::resolve_overlap;
use crate::settings::{Layout, Settings};
use crate::stats::StatisticsProvider;
use crate::vertex_cover::bounded_minimum_vertex_covers;
use log::{debug, info, warn};
use shared::prefixes::PrefixMapping;
use shared::terms::TriplePattern;
use shared::triple::Triple;

/// Turns a basic graph pattern into a join tree over the physical layouts
/// enabled in the settings.
///
/// The planner only borrows its inputs; every call to [`BgpPlanner::plan`]
/// owns its working state, so one planner can serve any number of BGPs.
pub struct BgpPlanner<'a> {
    stats: &'a dyn StatisticsProvider,
    settings: &'a Settings,
}

impl<'a> BgpPlanner<'a> {
    pub fn new(stats: &'a dyn StatisticsProvider, settings: &'a Settings) -> Self {
        Self { stats, settings }
    }

    /// Plans a BGP given as source triples, expanding prefixed names first
    pub fn plan_triples(
        &self,
        triples: &[Triple],
        prefixes: &PrefixMapping,
    ) -> PlanningResult<PlanNode> {
        let bgp = triples
            .iter()
            .map(|t| TriplePattern::from_triple(t, prefixes))
            .collect::<Result<Vec<_>, _>>()?;
        self.plan(&bgp)
    }

    /// Plans a BGP. The leaves of the returned tree partition `bgp`.
    pub fn plan(&self, bgp: &[TriplePattern]) -> PlanningResult<PlanNode> {
        if bgp.is_empty() {
            return Err(PlanningError::EmptyBgp);
        }
        let candidates = self.candidates(bgp)?;
        let root = if self.settings.use_linear_plan {
            info!("Building linear join tree over {} nodes", candidates.len());
            build_linear_tree(candidates)?
        } else {
            info!("Building join tree over {} nodes", candidates.len());
            build_root_tree(candidates)?
        };
        check_partition(&root, bgp)?;
        Ok(root)
    }

    /// Candidate leaves handed to the join tree builder
    pub fn candidates(&self, bgp: &[TriplePattern]) -> PlanningResult<Vec<PlanNode>> {
        if bgp.is_empty() {
            return Err(PlanningError::EmptyBgp);
        }
        if self.settings.is_minimum_join_plan() {
            if bgp.len() > self.settings.vertex_cover_triple_limit {
                warn!(
                    "BGP has {} triple patterns, above the vertex cover limit of {}; using grouped nodes",
                    bgp.len(),
                    self.settings.vertex_cover_triple_limit
                );
            } else if let Some(nodes) = self.minimum_join_candidates(bgp)? {
                return Ok(nodes);
            }
        }
        create_nodes(bgp, self.settings, self.stats)
    }

    /// Joined nodes around the vertex cover whose nodes have the lowest
    /// product of priorities, made disjoint. `None` when the covers are too
    /// many to enumerate.
    fn minimum_join_candidates(
        &self,
        bgp: &[TriplePattern],
    ) -> PlanningResult<Option<Vec<PlanNode>>> {
        let layout = if self.settings.is_using(Layout::JoinedOuter) {
            Layout::JoinedOuter
        } else {
            Layout::JoinedInner
        };
        let limit = self.settings.vertex_cover_candidate_limit;
        let Some(covers) = bounded_minimum_vertex_covers(bgp, limit)? else {
            warn!(
                "More than {} vertex cover candidates for {} triple patterns; using grouped nodes",
                limit,
                bgp.len()
            );
            return Ok(None);
        };
        info!(
            "Found {} minimum vertex covers of size {}",
            covers.len(),
            covers.first().map_or(0, |c| c.len())
        );

        let mut best: Option<(f64, Vec<PlanNode>)> = None;
        for cover in &covers {
            let nodes = create_cover_nodes(bgp, cover, layout, self.stats)?;
            let score: f64 = nodes.iter().map(|n| n.priority()).product();
            debug!("Vertex cover {:?} scores {}", cover, score);
            if best.as_ref().map_or(true, |(best_score, _)| score < *best_score) {
                best = Some((score, nodes));
            }
        }
        let (_, nodes) = best.ok_or(PlanningError::EmptyBgp)?;
        Ok(Some(resolve_overlap(nodes)))
    }
}

/// Verifies that the leaf triples of `root` equal `bgp` as a multiset
fn check_partition(root: &PlanNode, bgp: &[TriplePattern]) -> PlanningResult<()> {
    let mut unassigned: Vec<&TriplePattern> = bgp.iter().collect();
    for triple in root.collect_triples() {
        match unassigned.iter().position(|t| t.same_triple(&triple)) {
            Some(index) => {
                unassigned.swap_remove(index);
            }
            None => {
                return Err(PlanningError::IncompleteAssignment(format!(
                    "{} is resolved more than once",
                    triple
                )))
            }
        }
    }
    match unassigned.first() {
        Some(missing) => Err(PlanningError::IncompleteAssignment(format!(
            "{} is not resolved by any leaf",
            missing
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{DatabaseStatistics, PredicateStatistics};
    use shared::terms::Term;
    use std::time::{Duration, Instant};

    fn stats() -> DatabaseStatistics {
        DatabaseStatistics::new()
            .with_predicate("<title>", PredicateStatistics::new("title", 100, 100))
            .with_predicate("<writtenBy>", PredicateStatistics::new("writtenBy", 120, 100))
            .with_predicate("<name>", PredicateStatistics::new("name", 50, 50))
    }

    fn bgp() -> Vec<TriplePattern> {
        vec![
            TriplePattern::new("?b", "<title>", "?t"),
            TriplePattern::new("?b", "<writtenBy>", "?a"),
            TriplePattern::new("?a", "<name>", "?n"),
        ]
    }

    #[test]
    fn test_empty_bgp() {
        let stats = stats();
        let settings = Settings::default();
        let planner = BgpPlanner::new(&stats, &settings);
        assert_eq!(planner.plan(&[]), Err(PlanningError::EmptyBgp));
    }

    #[test]
    fn test_default_settings_plan() {
        let stats = stats();
        let settings = Settings::default();
        let planner = BgpPlanner::new(&stats, &settings);
        let root = planner.plan(&bgp()).unwrap();
        assert_eq!(root.leaves().len(), 3);
        assert_eq!(root.join_count(), 2);
    }

    #[test]
    fn test_partition_check_detects_duplicates() {
        let stats = stats();
        let node: PlanNode = crate::nodes::VerticalPartitionNode::new(bgp()[0].clone(), &stats)
            .unwrap()
            .into();
        let doubled = PlanNode::join(node.clone(), node);
        assert!(matches!(
            check_partition(&doubled, &bgp()[..1]),
            Err(PlanningError::IncompleteAssignment(_))
        ));
        assert!(matches!(
            check_partition(&doubled, &bgp()),
            Err(PlanningError::IncompleteAssignment(_))
        ));
    }

    #[test]
    fn test_vertex_cover_limit_falls_back_to_grouping() {
        let stats = stats();
        let settings = Settings::with_layouts(&[Layout::JoinedOuter])
            .with_vertex_cover(true)
            .with_vertex_cover_triple_limit(2);
        let planner = BgpPlanner::new(&stats, &settings);
        let root = planner.plan(&bgp()).unwrap();
        assert_eq!(root.collect_triples().len(), 3);
    }

    #[test]
    fn test_many_covers_fall_back_to_grouping() {
        let stats = stats();
        let settings = Settings::with_layouts(&[Layout::JoinedOuter]).with_vertex_cover(true);
        // ten triangles linked by the predicate variable: 3^10 minimum covers
        let bgp: Vec<TriplePattern> = (0..10)
            .flat_map(|i| {
                let (a, b, c) = (format!("?a{}", i), format!("?b{}", i), format!("?c{}", i));
                vec![
                    TriplePattern::new(&a, "?p", &b),
                    TriplePattern::new(&b, "?p", &c),
                    TriplePattern::new(&c, "?p", &a),
                ]
            })
            .collect();
        assert!(bgp.len() <= settings.vertex_cover_triple_limit);

        let planner = BgpPlanner::new(&stats, &settings);
        let started = Instant::now();
        let candidates = planner.candidates(&bgp).unwrap();
        // grouped path: one singleton joined node per variable-predicate triple
        assert_eq!(candidates.len(), bgp.len());
        let root = planner.plan(&bgp).unwrap();
        assert_eq!(root.collect_triples().len(), bgp.len());
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_unassignable_variable_predicate() {
        let stats = stats();
        let settings = Settings::with_layouts(&[Layout::JoinedInner]);
        let planner = BgpPlanner::new(&stats, &settings);
        let bgp = vec![TriplePattern::new("?s", "?p", "?o")];
        assert_eq!(
            planner.plan(&bgp),
            Err(PlanningError::UnassignableTriple(bgp[0].to_string()))
        );
    }

    #[test]
    fn test_plan_source_triples() {
        let stats = DatabaseStatistics::new().with_predicate(
            "<http://xmlns.com/foaf/0.1/name>",
            PredicateStatistics::new("name", 10, 10),
        );
        let settings = Settings::default();
        let planner = BgpPlanner::new(&stats, &settings);
        let triples = vec![Triple::new(
            Term::variable("p"),
            Term::prefixed("foaf", "name"),
            Term::variable("n"),
        )];
        let root = planner
            .plan_triples(&triples, &PrefixMapping::with_common_prefixes())
            .unwrap();
        assert_eq!(root.table_name(), Some("name".to_string()));
    }

    #[test]
    fn test_unknown_prefix() {
        let stats = stats();
        let settings = Settings::default();
        let planner = BgpPlanner::new(&stats, &settings);
        let triples = vec![Triple::new(
            Term::variable("p"),
            Term::prefixed("nope", "name"),
            Term::variable("n"),
        )];
        assert!(matches!(
            planner.plan_triples(&triples, &PrefixMapping::new()),
            Err(PlanningError::Prefix(_))
        ));
    }
}
