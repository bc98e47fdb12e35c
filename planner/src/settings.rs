/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Physical storage layouts a plan leaf can be answered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layout {
    #[serde(rename = "TT")]
    TripleTable,
    #[serde(rename = "VP")]
    VerticalPartitioning,
    #[serde(rename = "WPT")]
    WidePropertyTable,
    #[serde(rename = "IWPT")]
    InverseWidePropertyTable,
    #[serde(rename = "JWPT_OUTER")]
    JoinedOuter,
    #[serde(rename = "JWPT_LEFTOUTER")]
    JoinedLeftOuter,
    #[serde(rename = "JWPT_INNER")]
    JoinedInner,
}

impl Layout {
    pub fn short_name(&self) -> &'static str {
        match self {
            Layout::TripleTable => "TT",
            Layout::VerticalPartitioning => "VP",
            Layout::WidePropertyTable => "WPT",
            Layout::InverseWidePropertyTable => "IWPT",
            Layout::JoinedOuter => "JWPT_OUTER",
            Layout::JoinedLeftOuter => "JWPT_LEFTOUTER",
            Layout::JoinedInner => "JWPT_INNER",
        }
    }

    pub fn is_joined(&self) -> bool {
        matches!(
            self,
            Layout::JoinedOuter | Layout::JoinedLeftOuter | Layout::JoinedInner
        )
    }

    /// Layouts that fold several triples into one row
    pub fn is_grouped(&self) -> bool {
        !matches!(self, Layout::TripleTable | Layout::VerticalPartitioning)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for Layout {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TT" => Ok(Layout::TripleTable),
            "VP" => Ok(Layout::VerticalPartitioning),
            "WPT" => Ok(Layout::WidePropertyTable),
            "IWPT" => Ok(Layout::InverseWidePropertyTable),
            "JWPT_OUTER" => Ok(Layout::JoinedOuter),
            "JWPT_LEFTOUTER" => Ok(Layout::JoinedLeftOuter),
            "JWPT_INNER" => Ok(Layout::JoinedInner),
            _ => Err(SettingsError::UnknownLayout(s.to_string())),
        }
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Unknown layout: {0}")]
    UnknownLayout(String),

    #[error("Cannot read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Planner configuration. The planner assumes a consistent configuration;
/// callers combining joined layouts with WPT/IWPT should apply
/// [`Settings::normalized`] first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub layouts: BTreeSet<Layout>,
    pub use_vertex_cover: bool,
    pub use_linear_plan: bool,
    /// Groups with fewer triples are rejected and left ungrouped
    pub min_group_size: usize,
    pub grouping_enabled: bool,
    /// BGPs with more triples skip vertex cover enumeration
    pub vertex_cover_triple_limit: usize,
    /// Enumeration is abandoned once more candidate covers survive pruning
    pub vertex_cover_candidate_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            layouts: BTreeSet::from([Layout::VerticalPartitioning]),
            use_vertex_cover: false,
            use_linear_plan: false,
            min_group_size: 2,
            grouping_enabled: true,
            vertex_cover_triple_limit: 32,
            vertex_cover_candidate_limit: 128,
        }
    }
}

impl Settings {
    /// Settings with no layout enabled
    pub fn empty() -> Self {
        Self {
            layouts: BTreeSet::new(),
            ..Self::default()
        }
    }

    pub fn with_layouts(layouts: &[Layout]) -> Self {
        Self {
            layouts: layouts.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layouts.insert(layout);
        self
    }

    pub fn with_min_group_size(mut self, size: usize) -> Self {
        self.min_group_size = size;
        self
    }

    pub fn with_vertex_cover(mut self, enabled: bool) -> Self {
        self.use_vertex_cover = enabled;
        self
    }

    pub fn with_linear_plan(mut self, enabled: bool) -> Self {
        self.use_linear_plan = enabled;
        self
    }

    pub fn with_grouping(mut self, enabled: bool) -> Self {
        self.grouping_enabled = enabled;
        self
    }

    pub fn with_vertex_cover_triple_limit(mut self, limit: usize) -> Self {
        self.vertex_cover_triple_limit = limit;
        self
    }

    pub fn with_vertex_cover_candidate_limit(mut self, limit: usize) -> Self {
        self.vertex_cover_candidate_limit = limit;
        self
    }

    pub fn is_using(&self, layout: Layout) -> bool {
        self.layouts.contains(&layout)
    }

    pub fn is_using_any_grouped_layout(&self) -> bool {
        self.layouts.iter().any(|l| l.is_grouped())
    }

    /// The enabled joined layout, outer first, then left outer, then inner
    pub fn joined_layout(&self) -> Option<Layout> {
        [Layout::JoinedOuter, Layout::JoinedLeftOuter, Layout::JoinedInner]
            .into_iter()
            .find(|l| self.is_using(*l))
    }

    /// Whether the minimum-join strategy applies
    pub fn is_minimum_join_plan(&self) -> bool {
        self.use_vertex_cover
            && (self.is_using(Layout::JoinedOuter) || self.is_using(Layout::JoinedInner))
    }

    /// Resolves inconsistent layout combinations: a joined layout replaces
    /// WPT and IWPT, and only one joined variant is kept.
    pub fn normalized(&self) -> Self {
        let mut settings = self.clone();
        if let Some(joined) = self.joined_layout() {
            settings.layouts.retain(|l| {
                !matches!(
                    l,
                    Layout::WidePropertyTable | Layout::InverseWidePropertyTable
                ) && (!l.is_joined() || *l == joined)
            });
        }
        if settings.min_group_size == 0 {
            settings.min_group_size = 1;
        }
        settings
    }
}
