/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::triples_group::{GroupKind, TriplesGroup};
use crate::settings::{Layout, Settings};
use shared::terms::TriplePattern;

/// Candidate groups over a pool of triples, ordered forward groups first,
/// then inverse groups, then joined groups; inside each kind by the first
/// appearance of the pivot.
#[derive(Debug, Clone, Default)]
pub struct TriplesGroupsMapping {
    groups: Vec<TriplesGroup>,
}

impl TriplesGroupsMapping {
    pub fn new(triples: &[TriplePattern], settings: &Settings) -> Self {
        let mut mapping = Self::default();
        if settings.is_using(Layout::WidePropertyTable) {
            mapping.add_groups(triples, GroupKind::Forward, |t| vec![t.subject.as_str()]);
        }
        if settings.is_using(Layout::InverseWidePropertyTable) {
            mapping.add_groups(triples, GroupKind::Inverse, |t| vec![t.object.as_str()]);
        }
        if let Some(layout) = settings.joined_layout() {
            mapping.add_groups(triples, GroupKind::Joined(layout), |t| {
                vec![t.subject.as_str(), t.object.as_str()]
            });
        }
        mapping
    }

    fn add_groups<F>(&mut self, triples: &[TriplePattern], kind: GroupKind, pivots: F)
    where
        F: Fn(&TriplePattern) -> Vec<&str>,
    {
        let start = self.groups.len();
        for triple in triples {
            let mut seen: Vec<&str> = Vec::new();
            for pivot in pivots(triple) {
                // a self-loop names the same pivot twice
                if seen.contains(&pivot) {
                    continue;
                }
                seen.push(pivot);
                let index = match self.groups[start..].iter().position(|g| g.resource == pivot) {
                    Some(i) => start + i,
                    None => {
                        self.groups.push(TriplesGroup::new(kind, pivot));
                        self.groups.len() - 1
                    }
                };
                self.groups[index].add_triple(triple);
            }
        }
    }

    pub fn groups(&self) -> &[TriplesGroup] {
        &self.groups
    }

    /// Removes and returns the largest group; the earliest candidate wins ties.
    pub fn extract_best_group(&mut self) -> Option<TriplesGroup> {
        let mut best: Option<usize> = None;
        for (index, group) in self.groups.iter().enumerate() {
            match best {
                Some(b) if self.groups[b].size() >= group.size() => {}
                _ => best = Some(index),
            }
        }
        best.map(|index| self.groups.remove(index))
    }

    /// Drops the given triples from every candidate, discarding emptied groups
    pub fn remove_triples(&mut self, triples: &[TriplePattern]) {
        for group in &mut self.groups {
            group.remove_triples(triples);
        }
        self.groups.retain(|g| !g.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bgp() -> Vec<TriplePattern> {
        vec![
            TriplePattern::new("?b", "<title>", "?t"),
            TriplePattern::new("?b", "<writtenBy>", "?a"),
            TriplePattern::new("?a", "<name>", "?n"),
            TriplePattern::new("?x", "<cites>", "?b"),
        ]
    }

    #[test]
    fn test_forward_groups_by_subject() {
        let settings = Settings::with_layouts(&[Layout::WidePropertyTable]);
        let mapping = TriplesGroupsMapping::new(&bgp(), &settings);
        let pivots: Vec<&str> = mapping.groups().iter().map(|g| g.resource.as_str()).collect();
        assert_eq!(pivots, vec!["?b", "?a", "?x"]);
        assert_eq!(mapping.groups()[0].size(), 2);
    }

    #[test]
    fn test_joined_groups_cover_both_endpoints() {
        let settings = Settings::with_layouts(&[Layout::JoinedOuter]);
        let mut mapping = TriplesGroupsMapping::new(&bgp(), &settings);
        let best = mapping.extract_best_group().unwrap();
        assert_eq!(best.resource, "?b");
        assert_eq!(best.size(), 3);
        assert_eq!(best.kind, GroupKind::Joined(Layout::JoinedOuter));
    }

    #[test]
    fn test_largest_group_wins() {
        let settings =
            Settings::with_layouts(&[Layout::WidePropertyTable, Layout::InverseWidePropertyTable]);
        let triples = vec![
            TriplePattern::new("?s", "<p>", "?o"),
            TriplePattern::new("?s", "<q>", "?o2"),
            TriplePattern::new("?x", "<p>", "?o"),
            TriplePattern::new("?y", "<q>", "?o"),
        ];
        let mut mapping = TriplesGroupsMapping::new(&triples, &settings);
        let best = mapping.extract_best_group().unwrap();
        assert_eq!(best.kind, GroupKind::Inverse);
        assert_eq!(best.size(), 3);
        let next = mapping.extract_best_group().unwrap();
        assert_eq!(next.kind, GroupKind::Forward);
        assert_eq!(next.resource, "?s");
    }

    #[test]
    fn test_tie_prefers_forward_groups() {
        let settings =
            Settings::with_layouts(&[Layout::WidePropertyTable, Layout::InverseWidePropertyTable]);
        let triples = vec![
            TriplePattern::new("?s", "<p>", "?o"),
            TriplePattern::new("?s", "<q>", "?o"),
        ];
        let mut mapping = TriplesGroupsMapping::new(&triples, &settings);
        let best = mapping.extract_best_group().unwrap();
        assert_eq!(best.kind, GroupKind::Forward);
        assert_eq!(best.size(), 2);
    }

    #[test]
    fn test_self_loop_added_once() {
        let settings = Settings::with_layouts(&[Layout::JoinedOuter]);
        let triples = vec![TriplePattern::new("?a", "<knows>", "?a")];
        let mapping = TriplesGroupsMapping::new(&triples, &settings);
        assert_eq!(mapping.groups().len(), 1);
        assert_eq!(mapping.groups()[0].size(), 1);
    }

    #[test]
    fn test_remove_triples_drops_empty_groups() {
        let settings = Settings::with_layouts(&[Layout::WidePropertyTable]);
        let mut mapping = TriplesGroupsMapping::new(&bgp(), &settings);
        mapping.remove_triples(&[TriplePattern::new("?a", "<name>", "?n")]);
        assert_eq!(mapping.groups().len(), 2);
    }
}
