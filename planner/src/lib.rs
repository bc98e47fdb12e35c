/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Join-tree planning for SPARQL basic graph patterns over a relational
//! store that keeps RDF in several physical layouts (triple table, vertical
//! partitions, wide and inverse wide property tables, joined wide property
//! tables).

pub mod cost;
pub mod error;
pub mod grouping;
pub mod join_tree;
pub mod nodes;
pub mod overlap;
pub mod planner;
pub mod settings;
pub mod stats;
pub mod vertex_cover;

pub use error::{PlanningError, PlanningResult};
pub use nodes::{PlanNode, TriplesNode};
pub use planner::BgpPlanner;
pub use settings::{Layout, Settings, SettingsError};
pub use stats::{DatabaseStatistics, PredicateStatistics, StatisticsProvider, StatsError};
