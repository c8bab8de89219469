// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels and the tick timer
//! - publishing snapshots to the status bus
//! - sending `ScheduledUnit`s to the executor
//!
//! The core is intended to be extensively tested without any Tokio,
//! channels or workers.

use tracing::info;

use crate::engine::event_handlers::{
    handle_advance, handle_cancel, handle_completion, handle_prune, handle_submit, handle_tick,
    CoreCommand, CoreStep,
};
use crate::engine::{RuntimeEvent, RuntimeOptions};
use crate::scheduler::Scheduler;

/// Pure core runtime state.
///
/// This owns:
/// - the chain scheduler (and through it the chain registry)
/// - runtime options (e.g. `exit_when_idle`)
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct CoreRuntime {
    scheduler: Scheduler,
    options: RuntimeOptions,
    /// Set once the first chain is submitted; `exit_when_idle` only applies
    /// after that.
    has_submissions: bool,
}

impl CoreRuntime {
    pub fn new(scheduler: Scheduler, options: RuntimeOptions) -> Self {
        Self {
            scheduler,
            options,
            has_submissions: false,
        }
    }

    /// Expose whether every chain is finished (for tests).
    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        let mut step = match event {
            RuntimeEvent::SubmitChain {
                name,
                policy,
                chain,
            } => {
                self.has_submissions = true;
                handle_submit(&mut self.scheduler, &name, policy, &chain)
            }
            RuntimeEvent::CancelChain { name } => handle_cancel(&mut self.scheduler, &name),
            RuntimeEvent::PruneFinished => handle_prune(&mut self.scheduler),
            RuntimeEvent::UnitCompleted {
                chain,
                run_id,
                outcome,
            } => handle_completion(&mut self.scheduler, &chain, run_id, outcome),
            RuntimeEvent::Tick => handle_tick(&mut self.scheduler),
            RuntimeEvent::Advance => handle_advance(&mut self.scheduler),
            RuntimeEvent::ShutdownRequested => {
                return CoreStep {
                    commands: Vec::new(),
                    keep_running: false,
                };
            }
        };

        // In `--once` mode, we can exit when every submitted chain is done.
        if self.options.exit_when_idle && self.has_submissions && self.scheduler.is_idle() {
            info!("all chains finished; requesting exit");
            step.commands.push(CoreCommand::RequestExit);
            step.keep_running = false;
        }

        step
    }
}
