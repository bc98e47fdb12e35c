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
use crate::stats::{StatisticsExt, StatisticsProvider};
use shared::terms::{ElementType, TriplePattern};

/// Constants used by the cardinality estimates
pub struct CostConstants;

impl CostConstants {
    /// Fraction of rows kept by a constant subject/object that cannot be
    /// resolved through the distinct-subject count
    pub const BOUND_TERM_SELECTIVITY: f64 = 0.01;
    /// Average number of subjects sharing an object for inverse-complex predicates
    pub const INVERSE_COMPLEX_FANOUT: f64 = 2.0;
    /// Lower bound of every leaf estimate
    pub const MIN_CARDINALITY: f64 = 1.0;
}

/// Cardinality estimator backing the priority of every plan node
pub struct CostEstimator<'a> {
    stats: &'a dyn StatisticsProvider,
}

impl<'a> CostEstimator<'a> {
    pub fn new(stats: &'a dyn StatisticsProvider) -> Self {
        Self { stats }
    }

    /// Triple table scan: the whole table (or the predicate's share of it)
    /// reduced by every bound subject/object
    pub fn estimate_triple_table(&self, pattern: &TriplePattern) -> PlanningResult<f64> {
        let base = self.predicate_rows(pattern)?;
        let bound = Self::count_bound_endpoints(pattern) as i32;
        Ok(Self::clamp(base * CostConstants::BOUND_TERM_SELECTIVITY.powi(bound)))
    }

    /// Vertical partition scan of a single predicate table
    pub fn estimate_vertical_partition(&self, pattern: &TriplePattern) -> PlanningResult<f64> {
        let mut rows = self.predicate_rows(pattern)?;
        if pattern.subject_type == ElementType::Constant {
            if pattern.is_predicate_var() {
                rows *= CostConstants::BOUND_TERM_SELECTIVITY;
            } else {
                let distinct = self.stats.require_distinct_subjects(&pattern.predicate)?;
                rows /= distinct.max(1) as f64;
            }
        }
        if pattern.object_type == ElementType::Constant {
            rows *= CostConstants::BOUND_TERM_SELECTIVITY;
        }
        Ok(Self::clamp(rows))
    }

    /// Wide property table: one row per subject, multiplied back by the
    /// fan-out of every complex (exploded) column
    pub fn estimate_forward_group(&self, triples: &[TriplePattern]) -> PlanningResult<f64> {
        let Some(first) = triples.first() else {
            return Ok(CostConstants::MIN_CARDINALITY);
        };
        let mut rows = f64::MAX;
        let mut multiplier = 1.0;
        for triple in triples {
            if triple.is_predicate_var() {
                rows = rows.min(self.stats.triples_count() as f64);
            } else {
                let size = self.stats.require_table_size(&triple.predicate)? as f64;
                let distinct = self.stats.require_distinct_subjects(&triple.predicate)? as f64;
                rows = rows.min(distinct);
                if self.stats.require_complex(&triple.predicate)? {
                    multiplier *= (size / distinct.max(1.0)).max(1.0);
                }
            }
            if triple.object_type == ElementType::Constant {
                multiplier *= CostConstants::BOUND_TERM_SELECTIVITY;
            }
        }
        if first.subject_type == ElementType::Constant {
            rows = 1.0;
        }
        Ok(Self::clamp(rows * multiplier))
    }

    /// Inverse wide property table: one row per object
    pub fn estimate_inverse_group(&self, triples: &[TriplePattern]) -> PlanningResult<f64> {
        let Some(first) = triples.first() else {
            return Ok(CostConstants::MIN_CARDINALITY);
        };
        let mut rows = f64::MAX;
        let mut multiplier = 1.0;
        for triple in triples {
            if triple.is_predicate_var() {
                rows = rows.min(self.stats.triples_count() as f64);
            } else {
                let size = self.stats.require_table_size(&triple.predicate)? as f64;
                if self.stats.require_inverse_complex(&triple.predicate)? {
                    rows = rows.min(size / CostConstants::INVERSE_COMPLEX_FANOUT);
                    multiplier *= CostConstants::INVERSE_COMPLEX_FANOUT;
                } else {
                    rows = rows.min(size);
                }
            }
            if triple.subject_type == ElementType::Constant {
                multiplier *= CostConstants::BOUND_TERM_SELECTIVITY;
            }
        }
        if first.object_type == ElementType::Constant {
            rows = 1.0;
        }
        Ok(Self::clamp(rows * multiplier))
    }

    /// Joined wide property table: a row exists per resource, so the result
    /// is bounded by the more selective side
    pub fn estimate_joined_group(
        &self,
        forward: &[TriplePattern],
        inverse: &[TriplePattern],
    ) -> PlanningResult<f64> {
        let forward_rows = if forward.is_empty() {
            None
        } else {
            Some(self.estimate_forward_group(forward)?)
        };
        let inverse_rows = if inverse.is_empty() {
            None
        } else {
            Some(self.estimate_inverse_group(inverse)?)
        };
        let rows = match (forward_rows, inverse_rows) {
            (Some(f), Some(i)) => f.min(i),
            (Some(f), None) => f,
            (None, Some(i)) => i,
            (None, None) => CostConstants::MIN_CARDINALITY,
        };
        Ok(Self::clamp(rows))
    }

    /// Priority of a join of two subtrees. Both inputs are at least 1, so the
    /// result never drops below either child.
    pub fn estimate_join(left: f64, right: f64) -> f64 {
        left * right
    }

    fn predicate_rows(&self, pattern: &TriplePattern) -> PlanningResult<f64> {
        if pattern.is_predicate_var() {
            Ok(self.stats.triples_count() as f64)
        } else {
            Ok(self.stats.require_table_size(&pattern.predicate)? as f64)
        }
    }

    fn count_bound_endpoints(pattern: &TriplePattern) -> usize {
        let mut count = 0;
        if pattern.subject_type == ElementType::Constant {
            count += 1;
        }
        if pattern.object_type == ElementType::Constant {
            count += 1;
        }
        count
    }

    fn clamp(rows: f64) -> f64 {
        rows.max(CostConstants::MIN_CARDINALITY)
    }
}
