// src/work/info.rs

//! Unit states and the read-only status view published to observers.

use std::collections::BTreeSet;
use std::fmt;

use crate::work::data::WorkData;
use crate::work::unit::{RunId, UnitId, WorkKind};

/// Lifecycle state of a single work unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkState {
    /// Part of a chain, waiting for its predecessor.
    Enqueued,
    /// Dispatched to a worker.
    Running,
    /// Its turn has come but at least one constraint is unmet; re-checked on
    /// every tick.
    RequiresConstraints,
    Succeeded,
    Failed,
    Cancelled,
}

impl WorkState {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            WorkState::Succeeded | WorkState::Failed | WorkState::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkState::Enqueued => "ENQUEUED",
            WorkState::Running => "RUNNING",
            WorkState::RequiresConstraints => "REQUIRES_CONSTRAINTS",
            WorkState::Succeeded => "SUCCEEDED",
            WorkState::Failed => "FAILED",
            WorkState::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for WorkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of one unit, as seen by observers.
///
/// `output` is `Some` exactly when `state == Succeeded`.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkInfo {
    pub chain: String,
    /// Position of the unit within its chain.
    pub index: usize,
    pub id: UnitId,
    /// Identity of this particular execution of the unit.
    pub run_id: RunId,
    pub kind: WorkKind,
    pub state: WorkState,
    pub tags: BTreeSet<String>,
    pub output: Option<WorkData>,
}

impl WorkInfo {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}
