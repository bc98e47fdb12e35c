/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::error::PlanningResult;
use crate::nodes::{
    InverseWidePropertyTableNode, JoinedWidePropertyTableNode, PlanNode, WidePropertyTableNode,
};
use crate::settings::Layout;
use crate::stats::StatisticsProvider;
use shared::terms::TriplePattern;

/// Which position of its triples the pivot resource occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKind {
    /// Pivot is the subject of every triple
    Forward,
    /// Pivot is the object of every triple
    Inverse,
    /// Pivot is the subject of the forward part and the object of the inverse part
    Joined(Layout),
}

/// Triples sharing a pivot resource
#[derive(Debug, Clone, PartialEq)]
pub struct TriplesGroup {
    pub kind: GroupKind,
    pub resource: String,
    forward: Vec<TriplePattern>,
    inverse: Vec<TriplePattern>,
}

impl TriplesGroup {
    pub fn new(kind: GroupKind, resource: &str) -> Self {
        Self {
            kind,
            resource: resource.to_string(),
            forward: Vec::new(),
            inverse: Vec::new(),
        }
    }

    /// Adds a triple if it touches the pivot in the position the group
    /// kind requires. Returns whether the triple was taken.
    pub fn add_triple(&mut self, triple: &TriplePattern) -> bool {
        let as_subject = triple.subject == self.resource;
        let as_object = triple.object == self.resource;
        match self.kind {
            GroupKind::Forward if as_subject => self.forward.push(triple.clone()),
            GroupKind::Inverse if as_object => self.inverse.push(triple.clone()),
            GroupKind::Joined(_) if as_subject => self.forward.push(triple.clone()),
            GroupKind::Joined(_) if as_object => self.inverse.push(triple.clone()),
            _ => return false,
        }
        true
    }

    pub fn size(&self) -> usize {
        self.forward.len() + self.inverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn forward_triples(&self) -> &[TriplePattern] {
        &self.forward
    }

    pub fn inverse_triples(&self) -> &[TriplePattern] {
        &self.inverse
    }

    pub fn triples(&self) -> Vec<TriplePattern> {
        let mut triples = self.forward.clone();
        triples.extend(self.inverse.iter().cloned());
        triples
    }

    pub fn remove_triples(&mut self, to_remove: &[TriplePattern]) {
        self.forward
            .retain(|t| !to_remove.iter().any(|r| r.same_triple(t)));
        self.inverse
            .retain(|t| !to_remove.iter().any(|r| r.same_triple(t)));
    }

    /// Materializes the group into plan leaves. Joined layouts that cannot
    /// answer the group (left outer without forward triples, inner without
    /// both parts) yield no node.
    pub fn create_nodes(&self, stats: &dyn StatisticsProvider) -> PlanningResult<Vec<PlanNode>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        let node: PlanNode = match self.kind {
            GroupKind::Forward => WidePropertyTableNode::new(self.forward.clone(), stats)?.into(),
            GroupKind::Inverse => {
                InverseWidePropertyTableNode::new(self.inverse.clone(), stats)?.into()
            }
            GroupKind::Joined(layout) => {
                let hostable = match layout {
                    Layout::JoinedLeftOuter => !self.forward.is_empty(),
                    Layout::JoinedInner => !self.forward.is_empty() && !self.inverse.is_empty(),
                    _ => true,
                };
                if !hostable {
                    return Ok(Vec::new());
                }
                JoinedWidePropertyTableNode::new(
                    &self.resource,
                    layout,
                    self.forward.clone(),
                    self.inverse.clone(),
                    stats,
                )?
                .into()
            }
        };
        Ok(vec![node])
    }
}
