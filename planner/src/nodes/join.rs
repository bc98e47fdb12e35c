/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{PlanNode, TriplesNode};
use crate::cost::CostEstimator;
use shared::terms::TriplePattern;

/// Inner join of two subtrees on their shared variables
#[derive(Debug, Clone, PartialEq)]
pub struct JoinNode {
    pub left: Box<PlanNode>,
    pub right: Box<PlanNode>,
    /// Variables bound on both sides, in order of appearance on the left
    pub join_variables: Vec<String>,
    priority: f64,
}

impl JoinNode {
    pub fn new(left: PlanNode, right: PlanNode) -> Self {
        let priority = CostEstimator::estimate_join(left.priority(), right.priority());
        let right_vars = right.variables();
        let join_variables = left
            .variables()
            .into_iter()
            .filter(|v| right_vars.contains(v))
            .collect();
        Self {
            left: Box::new(left),
            right: Box::new(right),
            join_variables,
            priority,
        }
    }
}

impl TriplesNode for JoinNode {
    fn priority(&self) -> f64 {
        self.priority
    }

    fn collect_triples(&self) -> Vec<TriplePattern> {
        let mut triples = self.left.collect_triples();
        triples.extend(self.right.collect_triples());
        triples
    }

    /// Triples of a join are owned by its leaves
    fn remove_triples(&mut self, _to_remove: &[TriplePattern]) {}
}
