// src/scheduler/registry.rs

//! Name → chain table with per-name uniqueness policy.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::chain::{CancelOutcome, Chain, ChainRun};
use crate::types::ExistingChainPolicy;
use crate::work::WorkInfo;

/// What a submission did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No active chain under the name; the new chain was stored.
    Started,
    /// An active chain was cancelled and replaced by the new one.
    Replaced(CancelOutcome),
    /// An active chain exists and the policy was `Keep`; nothing changed.
    Kept,
    /// The new units were attached to the tail of the active chain.
    Appended,
}

/// Maps each chain name to its current [`ChainRun`].
///
/// A chain stays in the table after it finishes so it can still be queried;
/// it is dropped by [`prune_finished`](Self::prune_finished) or overwritten by
/// the next submission under the same name.
#[derive(Debug, Default)]
pub struct ChainRegistry {
    chains: BTreeMap<String, ChainRun>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a non-finished chain is registered under `name`.
    pub fn is_active(&self, name: &str) -> bool {
        matches!(self.chains.get(name), Some(run) if !run.is_finished())
    }

    pub fn submit(
        &mut self,
        name: &str,
        policy: ExistingChainPolicy,
        chain: &Chain,
    ) -> SubmitOutcome {
        if !self.is_active(name) {
            let replaced_finished = self
                .chains
                .insert(name.to_string(), ChainRun::new(name, policy, chain))
                .is_some();
            info!(
                chain = %name,
                ?policy,
                units = chain.len(),
                replaced_finished,
                "chain submitted"
            );
            return SubmitOutcome::Started;
        }

        match policy {
            ExistingChainPolicy::Replace => {
                let cancelled = self
                    .chains
                    .get_mut(name)
                    .map(ChainRun::cancel)
                    .unwrap_or_default();
                self.chains
                    .insert(name.to_string(), ChainRun::new(name, policy, chain));
                info!(
                    chain = %name,
                    cancelled = cancelled.cancelled.len(),
                    units = chain.len(),
                    "active chain replaced"
                );
                SubmitOutcome::Replaced(cancelled)
            }
            ExistingChainPolicy::Keep => {
                debug!(chain = %name, "chain already active and policy is keep; ignoring submission");
                SubmitOutcome::Kept
            }
            ExistingChainPolicy::Append => {
                if let Some(run) = self.chains.get_mut(name) {
                    run.append(chain, policy);
                }
                SubmitOutcome::Appended
            }
        }
    }

    /// Cancel the active chain under `name`. No-op for unknown or finished
    /// chains.
    pub fn cancel(&mut self, name: &str) -> CancelOutcome {
        match self.chains.get_mut(name) {
            Some(run) => run.cancel(),
            None => {
                debug!(chain = %name, "cancel for unknown chain; ignoring");
                CancelOutcome::default()
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ChainRun> {
        self.chains.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ChainRun> {
        self.chains.get_mut(name)
    }

    /// Chains that still have units to run, in name order.
    pub fn active_chains_mut(&mut self) -> impl Iterator<Item = &mut ChainRun> {
        self.chains.values_mut().filter(|run| !run.is_finished())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.chains.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// `true` when no registered chain has work left.
    pub fn all_finished(&self) -> bool {
        self.chains.values().all(ChainRun::is_finished)
    }

    /// Drop every finished chain; returns the names that were removed.
    pub fn prune_finished(&mut self) -> Vec<String> {
        let finished: Vec<String> = self
            .chains
            .iter()
            .filter(|(_, run)| run.is_finished())
            .map(|(name, _)| name.clone())
            .collect();

        for name in &finished {
            self.chains.remove(name);
            debug!(chain = %name, "pruned finished chain");
        }

        finished
    }

    /// Two-phase expiry of finished chains.
    ///
    /// Drops the chains marked by the previous call, then marks the chains
    /// that are finished now. A chain therefore survives at least one full
    /// call interval after it finished, so its terminal snapshot stays on
    /// the bus long enough for observers to read it.
    pub fn expire_finished(&mut self) -> Vec<String> {
        let expired: Vec<String> = self
            .chains
            .iter()
            .filter(|(_, run)| run.is_expiring())
            .map(|(name, _)| name.clone())
            .collect();

        for name in &expired {
            self.chains.remove(name);
            debug!(chain = %name, "expired finished chain");
        }

        for run in self.chains.values_mut().filter(|run| run.is_finished()) {
            run.mark_expiring();
        }

        expired
    }

    /// Units of the chain registered under `name`, in chain order.
    pub fn query(&self, name: &str) -> Vec<WorkInfo> {
        self.chains.get(name).map(ChainRun::infos).unwrap_or_default()
    }

    /// Units carrying `tag`, across all chains.
    pub fn query_by_tag(&self, tag: &str) -> Vec<WorkInfo> {
        self.chains
            .values()
            .filter(|run| run.contains_tag(tag))
            .flat_map(ChainRun::infos)
            .filter(|info| info.has_tag(tag))
            .collect()
    }

    /// Every unit of every chain, ordered by chain name then index.
    pub fn all_units(&self) -> Vec<WorkInfo> {
        self.chains.values().flat_map(ChainRun::infos).collect()
    }
}
