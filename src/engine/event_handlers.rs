// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use crate::chain::{Chain, ScheduledUnit};
use crate::engine::UnitOutcome;
use crate::scheduler::{Scheduler, SchedulerStep};
use crate::status::StatusSnapshot;
use crate::types::ExistingChainPolicy;
use crate::work::RunId;

/// Command produced by the pure core, to be executed by the outer IO shell.
///
/// Commands are emitted in execution order: a `Publish` always precedes the
/// `DispatchUnits` of the same step, so observers see a unit as `Running`
/// before its worker starts.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Publish this snapshot on the status bus.
    Publish(StatusSnapshot),
    /// Ask these running units to stop.
    StopUnits(Vec<RunId>),
    /// Send these units to the executor.
    DispatchUnits(Vec<ScheduledUnit>),
    /// Request that the runtime exits (used for `--once` when idle).
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    /// Units dispatched by this step, across all `DispatchUnits` commands.
    pub fn dispatched(&self) -> Vec<&ScheduledUnit> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                CoreCommand::DispatchUnits(units) => Some(units.iter()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Units this step asked to stop.
    pub fn stopped(&self) -> Vec<RunId> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                CoreCommand::StopUnits(ids) => Some(ids.iter().copied()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn published(&self) -> bool {
        self.commands
            .iter()
            .any(|c| matches!(c, CoreCommand::Publish(_)))
    }
}

/// Turn a scheduler step into shell commands.
fn commands_for(scheduler: &Scheduler, step: SchedulerStep) -> CoreStep {
    let mut commands = Vec::new();

    if step.changed {
        commands.push(CoreCommand::Publish(StatusSnapshot::new(
            scheduler.snapshot_units(),
        )));
    }
    if !step.to_stop.is_empty() {
        commands.push(CoreCommand::StopUnits(step.to_stop));
    }
    if !step.newly_scheduled.is_empty() {
        commands.push(CoreCommand::DispatchUnits(step.newly_scheduled));
    }

    CoreStep {
        commands,
        keep_running: true,
    }
}

/// Handle a chain submission.
///
/// Nothing is dispatched here; the new head starts on the following tick.
pub fn handle_submit(
    scheduler: &mut Scheduler,
    name: &str,
    policy: ExistingChainPolicy,
    chain: &Chain,
) -> CoreStep {
    let step = scheduler.submit(name, policy, chain);
    commands_for(scheduler, step)
}

/// Handle a cancel request.
pub fn handle_cancel(scheduler: &mut Scheduler, name: &str) -> CoreStep {
    let step = scheduler.cancel(name);
    commands_for(scheduler, step)
}

/// Handle a unit completion reported by the executor.
pub fn handle_completion(
    scheduler: &mut Scheduler,
    chain: &str,
    run_id: RunId,
    outcome: UnitOutcome,
) -> CoreStep {
    let step = scheduler.complete(chain, run_id, outcome);
    commands_for(scheduler, step)
}

/// Handle a scheduling tick.
pub fn handle_tick(scheduler: &mut Scheduler) -> CoreStep {
    let step = scheduler.tick();
    commands_for(scheduler, step)
}

/// Handle an advance-only pass (no housekeeping).
pub fn handle_advance(scheduler: &mut Scheduler) -> CoreStep {
    let step = scheduler.advance();
    commands_for(scheduler, step)
}

/// Handle a prune request.
pub fn handle_prune(scheduler: &mut Scheduler) -> CoreStep {
    let step = scheduler.prune_finished();
    commands_for(scheduler, step)
}
