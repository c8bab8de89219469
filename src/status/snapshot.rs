// src/status/snapshot.rs

use crate::work::WorkInfo;

/// Full point-in-time view of every unit known to the registry, ordered by
/// chain name then unit index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusSnapshot {
    units: Vec<WorkInfo>,
}

impl StatusSnapshot {
    pub fn new(units: Vec<WorkInfo>) -> Self {
        Self { units }
    }

    pub fn units(&self) -> &[WorkInfo] {
        &self.units
    }

    pub fn filtered(&self, filter: &StatusFilter) -> Vec<WorkInfo> {
        self.units
            .iter()
            .filter(|info| filter.matches(info))
            .cloned()
            .collect()
    }
}

/// Which units an observer is interested in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Chain(String),
    Tag(String),
}

impl StatusFilter {
    pub fn matches(&self, info: &WorkInfo) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Chain(name) => info.chain == *name,
            StatusFilter::Tag(tag) => info.has_tag(tag),
        }
    }
}
