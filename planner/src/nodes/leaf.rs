/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::TriplesNode;
use crate::cost::CostEstimator;
use crate::error::PlanningResult;
use crate::settings::Layout;
use crate::stats::{StatisticsExt, StatisticsProvider};
use shared::terms::TriplePattern;
use std::fmt;

pub const TRIPLE_TABLE_NAME: &str = "tripletable";
pub const WPT_TABLE_NAME: &str = "wide_property_table";
pub const IWPT_TABLE_NAME: &str = "inverse_wide_property_table";
pub const JWPT_OUTER_TABLE_NAME: &str = "joined_wide_property_table_outer";
pub const JWPT_LEFTOUTER_TABLE_NAME: &str = "joined_wide_property_table_leftouter";
pub const JWPT_INNER_TABLE_NAME: &str = "joined_wide_property_table_inner";

/// Column prefixes of the joined table's forward and inverse halves
pub const JWPT_FORWARD_PREFIX: &str = "o_";
pub const JWPT_INVERSE_PREFIX: &str = "s_";

/// A triple answered by one column of a property table
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyColumn {
    pub pattern: TriplePattern,
    /// `None` for variable predicates, which read every column
    pub column: Option<String>,
    /// Multi-valued column that has to be exploded
    pub is_complex: bool,
}

impl PropertyColumn {
    fn forward(
        pattern: TriplePattern,
        stats: &dyn StatisticsProvider,
        prefix: &str,
    ) -> PlanningResult<Self> {
        if pattern.is_predicate_var() {
            return Ok(Self {
                pattern,
                column: None,
                is_complex: true,
            });
        }
        let column = format!("{}{}", prefix, stats.require_table_name(&pattern.predicate)?);
        let is_complex = stats.require_complex(&pattern.predicate)?;
        Ok(Self {
            pattern,
            column: Some(column),
            is_complex,
        })
    }

    fn inverse(
        pattern: TriplePattern,
        stats: &dyn StatisticsProvider,
        prefix: &str,
    ) -> PlanningResult<Self> {
        if pattern.is_predicate_var() {
            return Ok(Self {
                pattern,
                column: None,
                is_complex: true,
            });
        }
        let column = format!("{}{}", prefix, stats.require_table_name(&pattern.predicate)?);
        let is_complex = stats.require_inverse_complex(&pattern.predicate)?;
        Ok(Self {
            pattern,
            column: Some(column),
            is_complex,
        })
    }
}

fn retain_columns(columns: &mut Vec<PropertyColumn>, to_remove: &[TriplePattern]) {
    columns.retain(|c| !to_remove.iter().any(|r| r.same_triple(&c.pattern)));
}

fn patterns_of(columns: &[PropertyColumn]) -> Vec<TriplePattern> {
    columns.iter().map(|c| c.pattern.clone()).collect()
}

fn write_group(f: &mut fmt::Formatter<'_>, label: &str, triples: &[TriplePattern]) -> fmt::Result {
    write!(f, "{{{} node: ", label)?;
    for triple in triples {
        write!(f, "{}, ", triple)?;
    }
    write!(f, "}}")
}

/// Scan of the triple table
#[derive(Debug, Clone, PartialEq)]
pub struct TripleTableNode {
    pub pattern: Option<TriplePattern>,
    priority: f64,
}

impl TripleTableNode {
    pub fn new(pattern: TriplePattern, stats: &dyn StatisticsProvider) -> PlanningResult<Self> {
        let priority = CostEstimator::new(stats).estimate_triple_table(&pattern)?;
        Ok(Self {
            pattern: Some(pattern),
            priority,
        })
    }
}

impl TriplesNode for TripleTableNode {
    fn priority(&self) -> f64 {
        self.priority
    }

    fn collect_triples(&self) -> Vec<TriplePattern> {
        self.pattern.iter().cloned().collect()
    }

    fn remove_triples(&mut self, to_remove: &[TriplePattern]) {
        if let Some(pattern) = &self.pattern {
            if to_remove.iter().any(|r| r.same_triple(pattern)) {
                self.pattern = None;
            }
        }
    }
}

/// Scan of one vertical partition (a two-column table per predicate)
#[derive(Debug, Clone, PartialEq)]
pub struct VerticalPartitionNode {
    pub pattern: Option<TriplePattern>,
    /// `None` when the predicate is a variable and every partition is read
    pub table_name: Option<String>,
    pub is_complex: bool,
    priority: f64,
}

impl VerticalPartitionNode {
    pub fn new(pattern: TriplePattern, stats: &dyn StatisticsProvider) -> PlanningResult<Self> {
        let priority = CostEstimator::new(stats).estimate_vertical_partition(&pattern)?;
        let (table_name, is_complex) = if pattern.is_predicate_var() {
            (None, true)
        } else {
            (
                Some(stats.require_table_name(&pattern.predicate)?),
                stats.require_complex(&pattern.predicate)?,
            )
        };
        Ok(Self {
            pattern: Some(pattern),
            table_name,
            is_complex,
            priority,
        })
    }
}

impl TriplesNode for VerticalPartitionNode {
    fn priority(&self) -> f64 {
        self.priority
    }

    fn collect_triples(&self) -> Vec<TriplePattern> {
        self.pattern.iter().cloned().collect()
    }

    fn remove_triples(&mut self, to_remove: &[TriplePattern]) {
        if let Some(pattern) = &self.pattern {
            if to_remove.iter().any(|r| r.same_triple(pattern)) {
                self.pattern = None;
            }
        }
    }
}

/// Triples sharing a subject, answered by one scan of the wide property table
#[derive(Debug, Clone, PartialEq)]
pub struct WidePropertyTableNode {
    pub columns: Vec<PropertyColumn>,
    priority: f64,
}

impl WidePropertyTableNode {
    pub fn new(triples: Vec<TriplePattern>, stats: &dyn StatisticsProvider) -> PlanningResult<Self> {
        let priority = CostEstimator::new(stats).estimate_forward_group(&triples)?;
        let columns = triples
            .into_iter()
            .map(|t| PropertyColumn::forward(t, stats, ""))
            .collect::<PlanningResult<Vec<_>>>()?;
        Ok(Self { columns, priority })
    }

    /// The shared subject
    pub fn subject(&self) -> Option<&str> {
        self.columns.first().map(|c| c.pattern.subject.as_str())
    }
}

impl TriplesNode for WidePropertyTableNode {
    fn priority(&self) -> f64 {
        self.priority
    }

    fn collect_triples(&self) -> Vec<TriplePattern> {
        patterns_of(&self.columns)
    }

    fn remove_triples(&mut self, to_remove: &[TriplePattern]) {
        retain_columns(&mut self.columns, to_remove);
    }
}

/// Triples sharing an object, answered by the inverse wide property table
#[derive(Debug, Clone, PartialEq)]
pub struct InverseWidePropertyTableNode {
    pub columns: Vec<PropertyColumn>,
    priority: f64,
}

impl InverseWidePropertyTableNode {
    pub fn new(triples: Vec<TriplePattern>, stats: &dyn StatisticsProvider) -> PlanningResult<Self> {
        let priority = CostEstimator::new(stats).estimate_inverse_group(&triples)?;
        let columns = triples
            .into_iter()
            .map(|t| PropertyColumn::inverse(t, stats, ""))
            .collect::<PlanningResult<Vec<_>>>()?;
        Ok(Self { columns, priority })
    }

    /// The shared object
    pub fn object(&self) -> Option<&str> {
        self.columns.first().map(|c| c.pattern.object.as_str())
    }
}

impl TriplesNode for InverseWidePropertyTableNode {
    fn priority(&self) -> f64 {
        self.priority
    }

    fn collect_triples(&self) -> Vec<TriplePattern> {
        patterns_of(&self.columns)
    }

    fn remove_triples(&mut self, to_remove: &[TriplePattern]) {
        retain_columns(&mut self.columns, to_remove);
    }
}

/// Triples touching one resource: as subject (forward part) or as object
/// (inverse part), answered by one scan of the joined wide property table
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedWidePropertyTableNode {
    pub resource: String,
    pub layout: Layout,
    pub forward: Vec<PropertyColumn>,
    pub inverse: Vec<PropertyColumn>,
    priority: f64,
}

impl JoinedWidePropertyTableNode {
    pub fn new(
        resource: &str,
        layout: Layout,
        forward: Vec<TriplePattern>,
        inverse: Vec<TriplePattern>,
        stats: &dyn StatisticsProvider,
    ) -> PlanningResult<Self> {
        let priority = CostEstimator::new(stats).estimate_joined_group(&forward, &inverse)?;
        let forward = forward
            .into_iter()
            .map(|t| PropertyColumn::forward(t, stats, JWPT_FORWARD_PREFIX))
            .collect::<PlanningResult<Vec<_>>>()?;
        let inverse = inverse
            .into_iter()
            .map(|t| PropertyColumn::inverse(t, stats, JWPT_INVERSE_PREFIX))
            .collect::<PlanningResult<Vec<_>>>()?;
        Ok(Self {
            resource: resource.to_string(),
            layout,
            forward,
            inverse,
            priority,
        })
    }

    pub fn table_name(&self) -> &'static str {
        match self.layout {
            Layout::JoinedLeftOuter => JWPT_LEFTOUTER_TABLE_NAME,
            Layout::JoinedInner => JWPT_INNER_TABLE_NAME,
            _ => JWPT_OUTER_TABLE_NAME,
        }
    }
}

impl TriplesNode for JoinedWidePropertyTableNode {
    fn priority(&self) -> f64 {
        self.priority
    }

    fn collect_triples(&self) -> Vec<TriplePattern> {
        let mut triples = patterns_of(&self.forward);
        triples.extend(patterns_of(&self.inverse));
        triples
    }

    fn remove_triples(&mut self, to_remove: &[TriplePattern]) {
        retain_columns(&mut self.forward, to_remove);
        retain_columns(&mut self.inverse, to_remove);
    }
}

impl fmt::Display for TripleTableNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_group(f, "TT", &self.collect_triples())
    }
}

impl fmt::Display for VerticalPartitionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_group(f, "VP", &self.collect_triples())
    }
}

impl fmt::Display for WidePropertyTableNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_group(f, "WPT", &self.collect_triples())
    }
}

impl fmt::Display for InverseWidePropertyTableNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_group(f, "IWPT", &self.collect_triples())
    }
}

impl fmt::Display for JoinedWidePropertyTableNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_group(f, "JWPT", &self.collect_triples())
    }
}
