// src/engine/mod.rs

//! Orchestration engine for workchain.
//!
//! This module ties together:
//! - the chain scheduler
//! - the main runtime event loop that reacts to:
//!   - chain submissions, cancellations and prune requests
//!   - unit completion events from the executor
//!   - periodic ticks (constraint re-checks)
//!   - shutdown requests
//! - the [`WorkManager`] handle callers use to talk to the loop.
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::chain::Chain;
use crate::types::ExistingChainPolicy;
use crate::work::{RunId, WorkData};

/// Outcome of a unit's execution as reported to the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitOutcome {
    Success(WorkData),
    /// Failure reason, for logs only.
    Failed(String),
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// If true, exit the runtime once at least one chain was submitted and
    /// every registered chain is finished (used for `--once`).
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from callers, the executor and timers.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    SubmitChain {
        name: String,
        policy: ExistingChainPolicy,
        chain: Chain,
    },
    CancelChain {
        name: String,
    },
    /// Drop finished chains from the registry.
    PruneFinished,
    /// A unit's worker finished (successfully or not).
    UnitCompleted {
        chain: String,
        run_id: RunId,
        outcome: UnitOutcome,
    },
    /// Periodic scheduling tick: expire finished chains when they are not
    /// retained, then advance every active chain once.
    Tick,
    /// Advance every active chain once, without housekeeping. The shell
    /// sends this right after every other event.
    Advance,
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

impl RuntimeEvent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            RuntimeEvent::SubmitChain { .. } => "submit_chain",
            RuntimeEvent::CancelChain { .. } => "cancel_chain",
            RuntimeEvent::PruneFinished => "prune_finished",
            RuntimeEvent::UnitCompleted { .. } => "unit_completed",
            RuntimeEvent::Tick => "tick",
            RuntimeEvent::Advance => "advance",
            RuntimeEvent::ShutdownRequested => "shutdown_requested",
        }
    }
}

pub mod core;
pub mod event_handlers;
pub mod manager;
pub mod runtime;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use manager::{ManagerSettings, WorkManager};
pub use runtime::Runtime;
