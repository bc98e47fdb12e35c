/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Plan nodes: one leaf variant per physical layout plus the join node.
//!
//! Every variant implements [`TriplesNode`]; [`PlanNode`] is the sum type
//! handed to the join-tree builders and, finally, to the execution layer.

pub mod join;
pub mod leaf;

pub use join::JoinNode;
pub use leaf::{
    InverseWidePropertyTableNode, JoinedWidePropertyTableNode, PropertyColumn, TripleTableNode,
    VerticalPartitionNode, WidePropertyTableNode, IWPT_TABLE_NAME, TRIPLE_TABLE_NAME,
    WPT_TABLE_NAME,
};

use crate::settings::Layout;
use shared::terms::TriplePattern;
use std::fmt;

/// Behaviour shared by every plan node
pub trait TriplesNode {
    /// Estimated output cardinality; lower is better
    fn priority(&self) -> f64;

    /// Triples resolved by the node
    fn collect_triples(&self) -> Vec<TriplePattern>;

    /// Drops every triple that exactly matches an entry of `to_remove`
    fn remove_triples(&mut self, to_remove: &[TriplePattern]);
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanNode {
    TripleTable(TripleTableNode),
    VerticalPartition(VerticalPartitionNode),
    WidePropertyTable(WidePropertyTableNode),
    InverseWidePropertyTable(InverseWidePropertyTableNode),
    JoinedWidePropertyTable(JoinedWidePropertyTableNode),
    Join(JoinNode),
}

impl PlanNode {
    fn as_triples_node(&self) -> &dyn TriplesNode {
        match self {
            PlanNode::TripleTable(n) => n,
            PlanNode::VerticalPartition(n) => n,
            PlanNode::WidePropertyTable(n) => n,
            PlanNode::InverseWidePropertyTable(n) => n,
            PlanNode::JoinedWidePropertyTable(n) => n,
            PlanNode::Join(n) => n,
        }
    }

    fn as_triples_node_mut(&mut self) -> &mut dyn TriplesNode {
        match self {
            PlanNode::TripleTable(n) => n,
            PlanNode::VerticalPartition(n) => n,
            PlanNode::WidePropertyTable(n) => n,
            PlanNode::InverseWidePropertyTable(n) => n,
            PlanNode::JoinedWidePropertyTable(n) => n,
            PlanNode::Join(n) => n,
        }
    }

    /// Creates a join node owning both subtrees
    pub fn join(left: PlanNode, right: PlanNode) -> Self {
        PlanNode::Join(JoinNode::new(left, right))
    }

    pub fn is_join(&self) -> bool {
        matches!(self, PlanNode::Join(_))
    }

    /// Layout a leaf is answered from; `None` for joins
    pub fn layout(&self) -> Option<Layout> {
        match self {
            PlanNode::TripleTable(_) => Some(Layout::TripleTable),
            PlanNode::VerticalPartition(_) => Some(Layout::VerticalPartitioning),
            PlanNode::WidePropertyTable(_) => Some(Layout::WidePropertyTable),
            PlanNode::InverseWidePropertyTable(_) => Some(Layout::InverseWidePropertyTable),
            PlanNode::JoinedWidePropertyTable(n) => Some(n.layout),
            PlanNode::Join(_) => None,
        }
    }

    /// Physical table scanned by a leaf
    pub fn table_name(&self) -> Option<String> {
        match self {
            PlanNode::TripleTable(_) => Some(TRIPLE_TABLE_NAME.to_string()),
            PlanNode::VerticalPartition(n) => n.table_name.clone(),
            PlanNode::WidePropertyTable(_) => Some(WPT_TABLE_NAME.to_string()),
            PlanNode::InverseWidePropertyTable(_) => Some(IWPT_TABLE_NAME.to_string()),
            PlanNode::JoinedWidePropertyTable(n) => Some(n.table_name().to_string()),
            PlanNode::Join(_) => None,
        }
    }

    /// Distinct variables of the node's triples, in order of appearance
    pub fn variables(&self) -> Vec<String> {
        let mut variables: Vec<String> = Vec::new();
        for triple in self.collect_triples() {
            for var in triple.variables() {
                if !variables.iter().any(|v| v == var) {
                    variables.push(var.to_string());
                }
            }
        }
        variables
    }

    /// Whether any triple of `self` shares a variable with any triple of `other`
    pub fn shares_variable_with(&self, other: &PlanNode) -> bool {
        let other_triples = other.collect_triples();
        self.collect_triples().iter().any(|a| {
            a.variables()
                .any(|var| other_triples.iter().any(|b| b.contains_variable(var)))
        })
    }

    /// Leaves of the tree, left to right
    pub fn leaves(&self) -> Vec<&PlanNode> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a PlanNode>) {
        match self {
            PlanNode::Join(join) => {
                join.left.collect_leaves(leaves);
                join.right.collect_leaves(leaves);
            }
            leaf => leaves.push(leaf),
        }
    }

    /// Number of join nodes in the tree
    pub fn join_count(&self) -> usize {
        match self {
            PlanNode::Join(join) => 1 + join.left.join_count() + join.right.join_count(),
            _ => 0,
        }
    }

    /// Indented rendering of the tree, one node per line
    pub fn explain(&self) -> String {
        let mut out = String::new();
        self.explain_into(&mut out, 0);
        out
    }

    fn explain_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        match self {
            PlanNode::Join(join) => {
                out.push_str(&format!(
                    "{}Join on [{}] (priority {:.1})\n",
                    indent,
                    join.join_variables.join(", "),
                    join.priority()
                ));
                join.left.explain_into(out, depth + 1);
                join.right.explain_into(out, depth + 1);
            }
            leaf => {
                out.push_str(&format!(
                    "{}{} (priority {:.1})\n",
                    indent,
                    leaf,
                    leaf.priority()
                ));
            }
        }
    }
}

impl TriplesNode for PlanNode {
    fn priority(&self) -> f64 {
        self.as_triples_node().priority()
    }

    fn collect_triples(&self) -> Vec<TriplePattern> {
        self.as_triples_node().collect_triples()
    }

    fn remove_triples(&mut self, to_remove: &[TriplePattern]) {
        self.as_triples_node_mut().remove_triples(to_remove)
    }
}

impl fmt::Display for PlanNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanNode::TripleTable(n) => write!(f, "{}", n),
            PlanNode::VerticalPartition(n) => write!(f, "{}", n),
            PlanNode::WidePropertyTable(n) => write!(f, "{}", n),
            PlanNode::InverseWidePropertyTable(n) => write!(f, "{}", n),
            PlanNode::JoinedWidePropertyTable(n) => write!(f, "{}", n),
            PlanNode::Join(n) => write!(f, "Join({}, {})", n.left, n.right),
        }
    }
}

impl From<TripleTableNode> for PlanNode {
    fn from(node: TripleTableNode) -> Self {
        PlanNode::TripleTable(node)
    }
}

impl From<VerticalPartitionNode> for PlanNode {
    fn from(node: VerticalPartitionNode) -> Self {
        PlanNode::VerticalPartition(node)
    }
}

impl From<WidePropertyTableNode> for PlanNode {
    fn from(node: WidePropertyTableNode) -> Self {
        PlanNode::WidePropertyTable(node)
    }
}

impl From<InverseWidePropertyTableNode> for PlanNode {
    fn from(node: InverseWidePropertyTableNode) -> Self {
        PlanNode::InverseWidePropertyTable(node)
    }
}

impl From<JoinedWidePropertyTableNode> for PlanNode {
    fn from(node: JoinedWidePropertyTableNode) -> Self {
        PlanNode::JoinedWidePropertyTable(node)
    }
}
