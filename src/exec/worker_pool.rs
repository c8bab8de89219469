// src/exec/worker_pool.rs

//! Production executor: runs units on a bounded pool of Tokio tasks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::chain::ScheduledUnit;
use crate::engine::{RuntimeEvent, UnitOutcome};
use crate::errors::WorkError;
use crate::exec::backend::{BackendFuture, ExecutorBackend};
use crate::exec::worker::{WorkContext, WorkerRegistry};
use crate::work::RunId;

type ActiveUnits = Arc<Mutex<HashMap<RunId, CancellationToken>>>;

/// Executor backend that resolves each unit's kind in a [`WorkerRegistry`]
/// and runs it in its own Tokio task.
///
/// - At most `max_workers` units execute at the same time; extra units wait
///   for a permit without blocking the runtime loop.
/// - Every dispatched unit gets a `CancellationToken`; `stop_units` cancels
///   it so cooperative workers can bail out early.
/// - Exactly one `UnitCompleted` event is sent per dispatched unit, even when
///   the unit was stopped. The scheduler discards results it no longer
///   expects.
pub struct WorkerPoolBackend {
    workers: WorkerRegistry,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    permits: Arc<Semaphore>,
    active: ActiveUnits,
}

impl WorkerPoolBackend {
    pub fn new(
        workers: WorkerRegistry,
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        max_workers: usize,
    ) -> Self {
        Self {
            workers,
            runtime_tx,
            permits: Arc::new(Semaphore::new(max_workers.max(1))),
            active: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn spawn_unit(&self, unit: ScheduledUnit) {
        let token = CancellationToken::new();
        if let Ok(mut active) = self.active.lock() {
            active.insert(unit.run_id, token.clone());
        }

        let workers = self.workers.clone();
        let runtime_tx = self.runtime_tx.clone();
        let permits = Arc::clone(&self.permits);
        let active = Arc::clone(&self.active);

        tokio::spawn(async move {
            let chain = unit.chain.clone();
            let run_id = unit.run_id;

            let outcome = run_unit(unit, &workers, permits, token).await;

            if let Ok(mut active) = active.lock() {
                active.remove(&run_id);
            }

            if runtime_tx
                .send(RuntimeEvent::UnitCompleted {
                    chain,
                    run_id,
                    outcome,
                })
                .await
                .is_err()
            {
                debug!(run = %run_id, "runtime gone; dropping unit completion");
            }
        });
    }
}

impl ExecutorBackend for WorkerPoolBackend {
    fn dispatch_units(&mut self, units: Vec<ScheduledUnit>) -> BackendFuture<'_> {
        for unit in units {
            self.spawn_unit(unit);
        }
        Box::pin(async { Ok(()) })
    }

    fn stop_units(&mut self, units: Vec<RunId>) -> BackendFuture<'_> {
        if let Ok(active) = self.active.lock() {
            for id in units {
                match active.get(&id) {
                    Some(token) => {
                        info!(run = %id, "stop requested for running unit");
                        token.cancel();
                    }
                    None => {
                        debug!(run = %id, "stop requested for unit that is not running");
                    }
                }
            }
        }
        Box::pin(async { Ok(()) })
    }
}

/// Run a single unit to completion and translate the result into a
/// [`UnitOutcome`].
async fn run_unit(
    unit: ScheduledUnit,
    workers: &WorkerRegistry,
    permits: Arc<Semaphore>,
    token: CancellationToken,
) -> UnitOutcome {
    // Wait for a free slot, unless the unit is stopped while queued.
    let _permit = tokio::select! {
        permit = permits.acquire_owned() => match permit {
            Ok(p) => p,
            Err(_) => return UnitOutcome::Failed("worker pool closed".to_string()),
        },
        _ = token.cancelled() => {
            debug!(unit = %unit.unit_id, "unit stopped before it acquired a worker");
            return UnitOutcome::Failed("stopped before start".to_string());
        }
    };

    let Some(worker) = workers.get(&unit.kind) else {
        error!(
            chain = %unit.chain,
            unit = %unit.unit_id,
            kind = %unit.kind,
            "no worker registered for kind"
        );
        return UnitOutcome::Failed(format!("no worker registered for kind '{}'", unit.kind));
    };

    debug!(
        chain = %unit.chain,
        unit = %unit.unit_id,
        kind = %unit.kind,
        input = %unit.input,
        "executing unit"
    );

    let ctx = WorkContext::new(unit.chain.clone(), unit.unit_id, unit.input, token);

    // Run the worker in its own task so a panic surfaces as a JoinError
    // instead of tearing down the pool.
    let handle = tokio::spawn(async move { worker.execute(ctx).await });

    match handle.await {
        Ok(Ok(output)) => {
            debug!(unit = %unit.unit_id, %output, "unit produced output");
            UnitOutcome::Success(output)
        }
        Ok(Err(err)) => {
            match &err {
                WorkError::InvalidInput(_) => {
                    warn!(unit = %unit.unit_id, kind = %unit.kind, error = %err, "unit rejected its input")
                }
                _ => warn!(unit = %unit.unit_id, kind = %unit.kind, error = %err, "unit execution failed"),
            }
            UnitOutcome::Failed(err.to_string())
        }
        Err(join_err) => {
            error!(unit = %unit.unit_id, kind = %unit.kind, error = %join_err, "worker task panicked");
            UnitOutcome::Failed(format!("worker panicked: {join_err}"))
        }
    }
}
