// src/scheduler/scheduler_step.rs

//! Step-by-step execution result types for the scheduler.

use crate::chain::ScheduledUnit;
use crate::work::{RunId, UnitId};

/// Structured result of a single scheduler "step".
///
/// This is useful for tests that want to manually step chains and make
/// assertions about what changed.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStep {
    /// Units that were marked `Running` and must be dispatched.
    pub newly_scheduled: Vec<ScheduledUnit>,
    /// Units that moved to `Cancelled` in this step (explicit cancel,
    /// replacement, or upstream failure).
    pub newly_cancelled: Vec<UnitId>,
    /// Runs whose workers should be asked to stop.
    pub to_stop: Vec<RunId>,
    /// Chains that reached a terminal state in this step.
    pub chains_finished: Vec<String>,
    /// Whether any observable state changed (i.e. a new snapshot is due).
    pub changed: bool,
}

impl SchedulerStep {
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn changed() -> Self {
        Self {
            changed: true,
            ..Self::default()
        }
    }
}
