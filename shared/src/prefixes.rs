/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrefixError {
    #[error("Unknown prefix: {0}")]
    UnknownPrefix(String),
}

pub type PrefixResult<T> = Result<T, PrefixError>;

// Prefix -> namespace IRI, as declared by the query's PREFIX clauses
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PrefixMapping {
    prefixes: HashMap<String, String>,
}

impl PrefixMapping {
    pub fn new() -> Self {
        PrefixMapping {
            prefixes: HashMap::new(),
        }
    }

    pub fn with_common_prefixes() -> Self {
        let mut mapping = Self::new();
        mapping.add_prefix("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#");
        mapping.add_prefix("rdfs", "http://www.w3.org/2000/01/rdf-schema#");
        mapping.add_prefix("xsd", "http://www.w3.org/2001/XMLSchema#");
        mapping.add_prefix("owl", "http://www.w3.org/2002/07/owl#");
        mapping.add_prefix("foaf", "http://xmlns.com/foaf/0.1/");
        mapping
    }

    pub fn add_prefix(&mut self, prefix: &str, namespace: &str) {
        let namespace = namespace.trim_start_matches('<').trim_end_matches('>');
        self.prefixes
            .insert(prefix.trim_end_matches(':').to_string(), namespace.to_string());
    }

    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    pub fn expand(&self, prefix: &str, local: &str) -> PrefixResult<String> {
        self.namespace(prefix)
            .map(|ns| format!("{}{}", ns, local))
            .ok_or_else(|| PrefixError::UnknownPrefix(prefix.to_string()))
    }
}
