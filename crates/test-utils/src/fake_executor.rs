use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use workchain::chain::ScheduledUnit;
use workchain::engine::{RuntimeEvent, UnitOutcome};
use workchain::exec::{BackendFuture, ExecutorBackend};
use workchain::work::{RunId, WorkData};

/// What the fake executor has seen so far. Cloned into tests so they can
/// inspect it while the runtime owns the executor.
#[derive(Debug, Clone, Default)]
pub struct ExecutorLog {
    dispatched: Arc<Mutex<Vec<ScheduledUnit>>>,
    stopped: Arc<Mutex<Vec<RunId>>>,
}

impl ExecutorLog {
    pub fn dispatched(&self) -> Vec<ScheduledUnit> {
        self.dispatched.lock().unwrap().clone()
    }

    /// `chain#index/kind` labels of dispatched units, in dispatch order.
    pub fn dispatched_labels(&self) -> Vec<String> {
        self.dispatched
            .lock()
            .unwrap()
            .iter()
            .map(|u| format!("{}#{}/{}", u.chain, u.index, u.kind))
            .collect()
    }

    pub fn stopped(&self) -> Vec<RunId> {
        self.stopped.lock().unwrap().clone()
    }
}

/// A fake executor that:
/// - records which units were dispatched and stopped
/// - immediately reports `UnitCompleted` for each dispatched unit, failing
///   the kinds listed in `fail_kinds` and succeeding the rest with the
///   unit's effective input as output.
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    log: ExecutorLog,
    fail_kinds: BTreeSet<String>,
}

impl FakeExecutor {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, log: ExecutorLog) -> Self {
        Self {
            runtime_tx,
            log,
            fail_kinds: BTreeSet::new(),
        }
    }

    pub fn failing(mut self, kind: &str) -> Self {
        self.fail_kinds.insert(kind.to_string());
        self
    }
}

impl ExecutorBackend for FakeExecutor {
    fn dispatch_units(&mut self, units: Vec<ScheduledUnit>) -> BackendFuture<'_> {
        let tx = self.runtime_tx.clone();
        let log = self.log.clone();
        let fail_kinds = self.fail_kinds.clone();

        Box::pin(async move {
            for u in units {
                {
                    let mut guard = log.dispatched.lock().unwrap();
                    guard.push(u.clone());
                }

                let outcome = if fail_kinds.contains(u.kind.as_str()) {
                    UnitOutcome::Failed(format!("{} is scripted to fail", u.kind))
                } else {
                    UnitOutcome::Success(
                        u.input
                            .overlaid_with(&WorkData::new().with("ran", u.kind.as_str())),
                    )
                };

                tx.send(RuntimeEvent::UnitCompleted {
                    chain: u.chain.clone(),
                    run_id: u.run_id,
                    outcome,
                })
                .await?;
            }
            Ok(())
        })
    }

    fn stop_units(&mut self, units: Vec<RunId>) -> BackendFuture<'_> {
        self.log.stopped.lock().unwrap().extend(units);
        Box::pin(async { Ok(()) })
    }
}
