use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::chain::{Advance, Chain, ChainState, Completion};
use crate::engine::UnitOutcome;
use crate::exec::ConstraintChecker;
use crate::scheduler::registry::{ChainRegistry, SubmitOutcome};
use crate::scheduler::scheduler_step::SchedulerStep;
use crate::types::ExistingChainPolicy;
use crate::work::{RunId, WorkInfo, WorkState};

/// Scheduler holds the chain registry plus the constraint source.
///
/// It is responsible for:
/// - applying submissions and cancellations to the registry
/// - advancing every active chain by at most one unit per tick
/// - holding units whose constraints are unmet
/// - recording unit outcomes and cancelling downstream units on failure
pub struct Scheduler {
    registry: ChainRegistry,
    constraints: Arc<dyn ConstraintChecker>,
    /// Keep finished chains around for queries until explicitly pruned.
    retain_finished: bool,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("registry", &self.registry)
            .field("retain_finished", &self.retain_finished)
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    pub fn new(constraints: Arc<dyn ConstraintChecker>, retain_finished: bool) -> Self {
        Self {
            registry: ChainRegistry::new(),
            constraints,
            retain_finished,
        }
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    /// `true` when no chain has work left.
    pub fn is_idle(&self) -> bool {
        self.registry.all_finished()
    }

    pub fn chain_state(&self, name: &str) -> Option<ChainState> {
        self.registry.get(name).map(|run| run.state())
    }

    pub fn unit_state(&self, name: &str, index: usize) -> Option<WorkState> {
        self.registry.get(name)?.unit_state(index)
    }

    pub fn query(&self, name: &str) -> Vec<WorkInfo> {
        self.registry.query(name)
    }

    pub fn query_by_tag(&self, tag: &str) -> Vec<WorkInfo> {
        self.registry.query_by_tag(tag)
    }

    /// Every unit in the registry, for publishing.
    pub fn snapshot_units(&self) -> Vec<WorkInfo> {
        self.registry.all_units()
    }

    /// Apply a submission according to `policy`.
    pub fn submit(
        &mut self,
        name: &str,
        policy: ExistingChainPolicy,
        chain: &Chain,
    ) -> SchedulerStep {
        match self.registry.submit(name, policy, chain) {
            SubmitOutcome::Started | SubmitOutcome::Appended => SchedulerStep::changed(),
            SubmitOutcome::Kept => SchedulerStep::unchanged(),
            SubmitOutcome::Replaced(cancelled) => SchedulerStep {
                newly_cancelled: cancelled.cancelled,
                to_stop: cancelled.interrupted.into_iter().collect(),
                changed: true,
                ..SchedulerStep::default()
            },
        }
    }

    /// Cancel the chain registered under `name`.
    pub fn cancel(&mut self, name: &str) -> SchedulerStep {
        let outcome = self.registry.cancel(name);
        if outcome.is_empty() {
            debug!(chain = %name, "cancel had no effect");
            return SchedulerStep::unchanged();
        }

        SchedulerStep {
            newly_cancelled: outcome.cancelled,
            to_stop: outcome.interrupted.into_iter().collect(),
            chains_finished: vec![name.to_string()],
            changed: true,
            ..SchedulerStep::default()
        }
    }

    /// Periodic tick: expire finished chains when they are not retained,
    /// then advance every active chain once.
    pub fn tick(&mut self) -> SchedulerStep {
        let expired = !self.retain_finished && !self.registry.expire_finished().is_empty();
        let mut step = self.advance();
        step.changed |= expired;
        step
    }

    /// Each active chain advances at most once.
    pub fn advance(&mut self) -> SchedulerStep {
        let mut step = SchedulerStep::unchanged();

        let checker = self.constraints.as_ref();
        for run in self.registry.active_chains_mut() {
            match run.advance(checker) {
                Advance::Idle => {}
                Advance::Held { newly_held, .. } => {
                    step.changed |= newly_held;
                }
                Advance::Dispatch(unit) => {
                    step.changed = true;
                    step.newly_scheduled.push(unit);
                }
            }
        }

        step
    }

    /// Record the outcome of a unit reported by the executor.
    pub fn complete(&mut self, chain: &str, run_id: RunId, outcome: UnitOutcome) -> SchedulerStep {
        let Some(run) = self.registry.get_mut(chain) else {
            warn!(chain = %chain, run = %run_id, "completion for unknown chain; ignoring");
            return SchedulerStep::unchanged();
        };

        match run.complete(run_id, outcome) {
            Completion::Ignored => SchedulerStep::unchanged(),
            Completion::Succeeded { chain_finished } => {
                let mut step = SchedulerStep::changed();
                if chain_finished {
                    step.chains_finished.push(chain.to_string());
                }
                step
            }
            Completion::Failed { cancelled } => {
                info!(
                    chain = %chain,
                    cancelled = cancelled.len(),
                    "chain failed"
                );
                SchedulerStep {
                    newly_cancelled: cancelled,
                    chains_finished: vec![chain.to_string()],
                    changed: true,
                    ..SchedulerStep::default()
                }
            }
        }
    }

    /// Drop finished chains from the registry.
    pub fn prune_finished(&mut self) -> SchedulerStep {
        let pruned = self.registry.prune_finished();
        if pruned.is_empty() {
            SchedulerStep::unchanged()
        } else {
            info!(?pruned, "pruned finished chains");
            SchedulerStep::changed()
        }
    }
}
