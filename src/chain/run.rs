// src/chain/run.rs

//! Per-chain execution state.
//!
//! A [`ChainRun`] is what a submitted [`Chain`] is frozen into: a vector of
//! unit records plus a cursor pointing at the unit whose turn it is. All
//! state transitions for a chain go through the methods here, which keeps
//! the chain invariants in one place:
//!
//! - units before the cursor are `Succeeded`;
//! - only the unit at the cursor can be `Running` or `RequiresConstraints`;
//! - once a unit fails or the chain is cancelled, nothing after it runs.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::chain::Chain;
use crate::engine::UnitOutcome;
use crate::exec::ConstraintChecker;
use crate::types::{Constraint, ExistingChainPolicy};
use crate::work::{RunId, UnitId, WorkData, WorkInfo, WorkKind, WorkState, WorkUnit};

/// Overall state of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    /// At least one unit still has to run.
    Active,
    AllSucceeded,
    Failed,
    Cancelled,
}

impl ChainState {
    pub fn is_finished(&self) -> bool {
        !matches!(self, ChainState::Active)
    }
}

/// Runtime record of a single unit inside a chain.
#[derive(Debug, Clone)]
struct UnitRecord {
    unit: Arc<WorkUnit>,
    run_id: RunId,
    state: WorkState,
    /// Set only together with `WorkState::Succeeded`.
    output: Option<WorkData>,
}

impl UnitRecord {
    fn new(unit: Arc<WorkUnit>) -> Self {
        Self {
            unit,
            run_id: RunId::new(),
            state: WorkState::Enqueued,
            output: None,
        }
    }
}

/// Description of a unit the scheduler wants a worker to run now.
#[derive(Debug, Clone)]
pub struct ScheduledUnit {
    pub chain: String,
    pub index: usize,
    pub unit_id: UnitId,
    /// Completions and stop requests refer to this id.
    pub run_id: RunId,
    pub kind: WorkKind,
    /// Unit input overlaid with the predecessor's output.
    pub input: WorkData,
}

/// Result of a single advance attempt on a chain.
#[derive(Debug, Clone)]
pub enum Advance {
    /// Nothing to do (unit already running, or chain finished).
    Idle,
    /// The unit at the cursor is waiting for constraints.
    ///
    /// `newly_held` is true only on the tick where it entered the state.
    Held {
        unit_id: UnitId,
        unmet: Vec<Constraint>,
        newly_held: bool,
    },
    /// The unit at the cursor was marked `Running` and must be dispatched.
    Dispatch(ScheduledUnit),
}

/// What a completion did to the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The completion did not match the running unit (late result of a
    /// cancelled or replaced run, or an unknown id).
    Ignored,
    Succeeded { chain_finished: bool },
    /// The unit failed; `cancelled` lists the downstream units that were
    /// cancelled as a consequence.
    Failed { cancelled: Vec<UnitId> },
}

/// Units touched by a cancellation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CancelOutcome {
    /// Every unit that moved to `Cancelled`.
    pub cancelled: Vec<UnitId>,
    /// The unit that was `Running` when the cancel landed, if any. Its
    /// worker should be asked to stop; its result will be discarded.
    pub interrupted: Option<RunId>,
}

impl CancelOutcome {
    pub fn is_empty(&self) -> bool {
        self.cancelled.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ChainRun {
    name: String,
    policy: ExistingChainPolicy,
    units: Vec<UnitRecord>,
    /// Index of the unit whose turn it is.
    cursor: usize,
    state: ChainState,
    /// Finished and already seen by one housekeeping pass; dropped on the
    /// next one when finished chains are not retained.
    expiring: bool,
}

impl ChainRun {
    pub fn new(name: impl Into<String>, policy: ExistingChainPolicy, chain: &Chain) -> Self {
        Self {
            name: name.into(),
            policy,
            units: chain.units().into_iter().map(UnitRecord::new).collect(),
            cursor: 0,
            state: ChainState::Active,
            expiring: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Policy that was used when this chain was (last) submitted.
    pub fn policy(&self) -> ExistingChainPolicy {
        self.policy
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub(crate) fn is_expiring(&self) -> bool {
        self.expiring
    }

    pub(crate) fn mark_expiring(&mut self) {
        self.expiring = true;
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn unit_state(&self, index: usize) -> Option<WorkState> {
        self.units.get(index).map(|r| r.state)
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        self.units.iter().any(|r| r.unit.has_tag(tag))
    }

    /// Read-only snapshot of every unit, in chain order.
    pub fn infos(&self) -> Vec<WorkInfo> {
        self.units
            .iter()
            .enumerate()
            .map(|(index, r)| WorkInfo {
                chain: self.name.clone(),
                index,
                id: r.unit.id(),
                run_id: r.run_id,
                kind: r.unit.kind().clone(),
                state: r.state,
                tags: r.unit.tags().clone(),
                output: r.output.clone(),
            })
            .collect()
    }

    /// Attach the units of `chain` to the tail of this (active) chain.
    pub fn append(&mut self, chain: &Chain, policy: ExistingChainPolicy) {
        let before = self.units.len();
        self.units
            .extend(chain.units().into_iter().map(UnitRecord::new));
        self.policy = policy;
        debug!(
            chain = %self.name,
            appended = self.units.len() - before,
            total = self.units.len(),
            "appended units to active chain"
        );
    }

    /// Effective input for the unit at `index`.
    fn effective_input(&self, index: usize) -> WorkData {
        let own = self.units[index].unit.input();
        let upstream = index
            .checked_sub(1)
            .and_then(|prev| self.units[prev].output.as_ref());
        match upstream {
            Some(output) => own.overlaid_with(output),
            None => own.clone(),
        }
    }

    /// Perform one advance step: check the constraints of the unit at the
    /// cursor and either hold it or mark it `Running`.
    pub fn advance(&mut self, checker: &dyn ConstraintChecker) -> Advance {
        if self.state.is_finished() {
            return Advance::Idle;
        }

        let cursor = self.cursor;
        let Some(record) = self.units.get(cursor) else {
            return Advance::Idle;
        };

        if !matches!(
            record.state,
            WorkState::Enqueued | WorkState::RequiresConstraints
        ) {
            return Advance::Idle;
        }

        let unit_id = record.unit.id();
        let run_id = record.run_id;
        let unmet: Vec<Constraint> = record
            .unit
            .constraints()
            .iter()
            .copied()
            .filter(|c| !checker.is_satisfied(*c))
            .collect();

        if !unmet.is_empty() {
            let record = &mut self.units[cursor];
            let newly_held = record.state != WorkState::RequiresConstraints;
            if newly_held {
                record.state = WorkState::RequiresConstraints;
                info!(
                    chain = %self.name,
                    unit = %unit_id,
                    kind = %record.unit.kind(),
                    ?unmet,
                    "constraints unmet; holding unit"
                );
            }
            return Advance::Held {
                unit_id,
                unmet,
                newly_held,
            };
        }

        let input = self.effective_input(cursor);
        let record = &mut self.units[cursor];
        record.state = WorkState::Running;

        info!(
            chain = %self.name,
            unit = %unit_id,
            index = cursor,
            run = %run_id,
            kind = %record.unit.kind(),
            "starting unit"
        );

        Advance::Dispatch(ScheduledUnit {
            chain: self.name.clone(),
            index: cursor,
            unit_id,
            run_id,
            kind: record.unit.kind().clone(),
            input,
        })
    }

    /// Record the outcome of the run identified by `run_id`.
    pub fn complete(&mut self, run_id: RunId, outcome: UnitOutcome) -> Completion {
        let cursor = self.cursor;
        let matches_running = self
            .units
            .get(cursor)
            .map(|r| r.run_id == run_id && r.state == WorkState::Running)
            .unwrap_or(false);

        if self.state.is_finished() || !matches_running {
            debug!(
                chain = %self.name,
                run = %run_id,
                "completion does not match the running unit; discarding result"
            );
            return Completion::Ignored;
        }
        let unit_id = self.units[cursor].unit.id();

        match outcome {
            UnitOutcome::Success(output) => {
                let record = &mut self.units[cursor];
                record.state = WorkState::Succeeded;
                record.output = Some(output);
                self.cursor += 1;

                let chain_finished = self.cursor >= self.units.len();
                if chain_finished {
                    self.state = ChainState::AllSucceeded;
                    info!(chain = %self.name, "all units succeeded");
                } else {
                    debug!(chain = %self.name, unit = %unit_id, "unit succeeded");
                }
                Completion::Succeeded { chain_finished }
            }
            UnitOutcome::Failed(reason) => {
                self.units[cursor].state = WorkState::Failed;
                self.units[cursor].output = None;
                warn!(
                    chain = %self.name,
                    unit = %unit_id,
                    %reason,
                    "unit failed; cancelling the rest of the chain"
                );
                let cancelled = self.cancel_from(cursor + 1);
                self.state = ChainState::Failed;
                Completion::Failed { cancelled }
            }
        }
    }

    /// Cancel every unfinished unit. Calling this on a finished chain is a
    /// no-op.
    pub fn cancel(&mut self) -> CancelOutcome {
        if self.state.is_finished() {
            return CancelOutcome::default();
        }

        let interrupted = self
            .units
            .get(self.cursor)
            .filter(|r| r.state == WorkState::Running)
            .map(|r| r.run_id);

        let cancelled = self.cancel_from(self.cursor);
        self.state = ChainState::Cancelled;

        info!(
            chain = %self.name,
            cancelled = cancelled.len(),
            interrupted = interrupted.is_some(),
            "chain cancelled"
        );

        CancelOutcome {
            cancelled,
            interrupted,
        }
    }

    fn cancel_from(&mut self, start: usize) -> Vec<UnitId> {
        let mut cancelled = Vec::new();
        for record in self.units.iter_mut().skip(start) {
            if !record.state.is_finished() {
                record.state = WorkState::Cancelled;
                record.output = None;
                cancelled.push(record.unit.id());
            }
        }
        cancelled
    }
}
