/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::StatisticsProvider;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Cannot read statistics file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed statistics: {0}")]
    Json(#[from] serde_json::Error),
}

/// Statistics of one predicate, as computed by the loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateStatistics {
    pub table_size: u64,
    pub distinct_subjects: u64,
    pub is_complex: bool,
    #[serde(default)]
    pub is_inverse_complex: bool,
    pub table_name: String,
}

impl PredicateStatistics {
    pub fn new(table_name: &str, table_size: u64, distinct_subjects: u64) -> Self {
        Self {
            table_size,
            distinct_subjects,
            is_complex: table_size != distinct_subjects,
            is_inverse_complex: false,
            table_name: table_name.to_string(),
        }
    }

    pub fn inverse_complex(mut self, is_inverse_complex: bool) -> Self {
        self.is_inverse_complex = is_inverse_complex;
        self
    }
}

/// In-memory statistics snapshot keyed by canonical predicate (`<iri>`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseStatistics {
    /// Size of the triple table; derived from the predicate tables when absent
    #[serde(default)]
    pub total_triples: Option<u64>,
    pub predicates: FxHashMap<String, PredicateStatistics>,
}

/// Statistics files may list predicates with or without angle brackets
fn canonical_predicate(predicate: &str) -> String {
    if predicate.starts_with('<') {
        predicate.to_string()
    } else {
        format!("<{}>", predicate)
    }
}

impl DatabaseStatistics {
    pub fn new() -> Self {
        Self {
            total_triples: None,
            predicates: FxHashMap::default(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, StatsError> {
        let parsed: DatabaseStatistics = serde_json::from_str(json)?;
        let predicates = parsed
            .predicates
            .into_iter()
            .map(|(predicate, stats)| (canonical_predicate(&predicate), stats))
            .collect();
        Ok(Self {
            total_triples: parsed.total_triples,
            predicates,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StatsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Registers (or replaces) the statistics of a predicate
    pub fn add_predicate(&mut self, predicate: &str, stats: PredicateStatistics) {
        self.predicates.insert(canonical_predicate(predicate), stats);
    }

    pub fn with_predicate(mut self, predicate: &str, stats: PredicateStatistics) -> Self {
        self.add_predicate(predicate, stats);
        self
    }

    pub fn remove_predicate(&mut self, predicate: &str) -> Option<PredicateStatistics> {
        self.predicates.remove(&canonical_predicate(predicate))
    }

    pub fn get(&self, predicate: &str) -> Option<&PredicateStatistics> {
        self.predicates.get(predicate)
    }
}

impl StatisticsProvider for DatabaseStatistics {
    fn table_size(&self, predicate: &str) -> Option<u64> {
        self.get(predicate).map(|s| s.table_size)
    }

    fn distinct_subject_count(&self, predicate: &str) -> Option<u64> {
        self.get(predicate).map(|s| s.distinct_subjects)
    }

    fn is_complex(&self, predicate: &str) -> Option<bool> {
        self.get(predicate).map(|s| s.is_complex)
    }

    fn is_inverse_complex(&self, predicate: &str) -> Option<bool> {
        self.get(predicate).map(|s| s.is_inverse_complex)
    }

    fn table_name(&self, predicate: &str) -> Option<String> {
        self.get(predicate).map(|s| s.table_name.clone())
    }

    fn triples_count(&self) -> u64 {
        self.total_triples
            .unwrap_or_else(|| self.predicates.values().map(|s| s.table_size).sum())
    }
}
