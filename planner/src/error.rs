/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use shared::prefixes::PrefixError;
use thiserror::Error;

/// Errors that abort a single planning call. No partial plan is ever returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanningError {
    /// No enabled layout can host the triple pattern
    #[error("Cannot assign triple pattern {0} to any enabled layout")]
    UnassignableTriple(String),

    /// The BGP is not connected through shared variables
    #[error("BGP is not a connected graph: {components} components remain without a common variable")]
    DisconnectedGraph { components: usize },

    /// The statistics have no entry for a predicate that must be looked up
    #[error("Missing statistics for predicate {predicate}")]
    MissingStatistic { predicate: String },

    #[error("BGP contains no triple patterns")]
    EmptyBgp,

    /// The leaves of the produced tree do not partition the input BGP
    #[error("Plan leaves do not cover the BGP exactly: {0}")]
    IncompleteAssignment(String),

    #[error(transparent)]
    Prefix(#[from] PrefixError),
}

pub type PlanningResult<T> = Result<T, PlanningError>;

impl PlanningError {
    pub fn missing(predicate: &str) -> Self {
        PlanningError::MissingStatistic {
            predicate: predicate.to_string(),
        }
    }
}
