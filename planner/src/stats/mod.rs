/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Statistics consumed by the planner for cardinality estimation and
//! column resolution. Statistics are computed elsewhere (by the loader);
//! the planner only reads a snapshot through [`StatisticsProvider`].

pub mod database_stats;

pub use database_stats::{DatabaseStatistics, PredicateStatistics, StatsError};

use crate::error::{PlanningError, PlanningResult};

/// Read-only view over per-predicate statistics.
///
/// Every lookup returns `None` when the predicate is unknown; the planner
/// turns that into [`PlanningError::MissingStatistic`].
pub trait StatisticsProvider {
    /// Number of rows of the predicate's vertical partition
    fn table_size(&self, predicate: &str) -> Option<u64>;

    fn distinct_subject_count(&self, predicate: &str) -> Option<u64>;

    /// Whether some subject has more than one value for the predicate
    fn is_complex(&self, predicate: &str) -> Option<bool>;

    /// Whether some object has more than one subject for the predicate
    fn is_inverse_complex(&self, predicate: &str) -> Option<bool>;

    /// Internal table / column name of the predicate
    fn table_name(&self, predicate: &str) -> Option<String>;

    /// Size of the triple table
    fn triples_count(&self) -> u64;
}

/// Fallible lookups used by the cost estimator and the node constructors
pub(crate) trait StatisticsExt: StatisticsProvider {
    fn require_table_size(&self, predicate: &str) -> PlanningResult<u64> {
        self.table_size(predicate)
            .ok_or_else(|| PlanningError::missing(predicate))
    }

    fn require_distinct_subjects(&self, predicate: &str) -> PlanningResult<u64> {
        self.distinct_subject_count(predicate)
            .ok_or_else(|| PlanningError::missing(predicate))
    }

    fn require_complex(&self, predicate: &str) -> PlanningResult<bool> {
        self.is_complex(predicate)
            .ok_or_else(|| PlanningError::missing(predicate))
    }

    fn require_inverse_complex(&self, predicate: &str) -> PlanningResult<bool> {
        self.is_inverse_complex(predicate)
            .ok_or_else(|| PlanningError::missing(predicate))
    }

    fn require_table_name(&self, predicate: &str) -> PlanningResult<String> {
        self.table_name(predicate)
            .ok_or_else(|| PlanningError::missing(predicate))
    }
}

impl<T: StatisticsProvider + ?Sized> StatisticsExt for T {}
