// src/engine/manager.rs

//! Caller-facing handle to a running workchain runtime.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::Stream;
use tracing::debug;

use crate::chain::Chain;
use crate::config::ConfigSection;
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions};
use crate::errors::Result;
use crate::exec::{ConstraintChecker, ExecutorBackend, WorkerPoolBackend, WorkerRegistry};
use crate::scheduler::Scheduler;
use crate::status::{StatusBus, StatusFilter};
use crate::types::ExistingChainPolicy;
use crate::work::{WorkInfo, WorkUnitSpec};

/// Tunables for [`WorkManager::start`].
#[derive(Debug, Clone, Copy)]
pub struct ManagerSettings {
    /// Maximum number of units executing at the same time.
    pub max_workers: usize,
    /// Interval between scheduling ticks (constraint re-checks).
    pub tick_interval: Duration,
    /// Keep finished chains queryable until pruned.
    pub retain_finished: bool,
    /// Stop the runtime once every submitted chain is finished.
    pub exit_when_idle: bool,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            max_workers: 4,
            tick_interval: Duration::from_millis(250),
            retain_finished: true,
            exit_when_idle: false,
        }
    }
}

impl From<&ConfigSection> for ManagerSettings {
    fn from(cfg: &ConfigSection) -> Self {
        Self {
            max_workers: cfg.max_workers,
            tick_interval: Duration::from_millis(cfg.tick_interval_ms),
            retain_finished: cfg.retain_finished,
            exit_when_idle: false,
        }
    }
}

/// Cloneable handle used to submit, cancel and observe chains.
///
/// Mutations are sent to the runtime loop as events and applied in order;
/// queries read the last published snapshot and never block.
#[derive(Debug, Clone)]
pub struct WorkManager {
    tx: mpsc::Sender<RuntimeEvent>,
    status: StatusBus,
}

impl WorkManager {
    /// Build a manager around an existing event sender and status bus.
    pub fn new(tx: mpsc::Sender<RuntimeEvent>, status: StatusBus) -> Self {
        Self { tx, status }
    }

    /// Start a runtime backed by the production worker pool.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(
        workers: WorkerRegistry,
        constraints: Arc<dyn ConstraintChecker>,
        settings: ManagerSettings,
    ) -> (WorkManager, JoinHandle<Result<()>>) {
        let max_workers = settings.max_workers;
        Self::start_with_backend(
            move |tx| WorkerPoolBackend::new(workers, tx, max_workers),
            constraints,
            settings,
        )
    }

    /// Start a runtime with a custom executor backend.
    ///
    /// `make_backend` receives the sender the backend must use to report
    /// `UnitCompleted` events.
    pub fn start_with_backend<E, F>(
        make_backend: F,
        constraints: Arc<dyn ConstraintChecker>,
        settings: ManagerSettings,
    ) -> (WorkManager, JoinHandle<Result<()>>)
    where
        E: ExecutorBackend + 'static,
        F: FnOnce(mpsc::Sender<RuntimeEvent>) -> E,
    {
        let (tx, rx) = mpsc::channel::<RuntimeEvent>(64);
        let status = StatusBus::new();

        let executor = make_backend(tx.clone());
        let scheduler = Scheduler::new(constraints, settings.retain_finished);
        let core = CoreRuntime::new(
            scheduler,
            RuntimeOptions {
                exit_when_idle: settings.exit_when_idle,
            },
        );
        let runtime = Runtime::new(core, rx, executor, status.clone(), settings.tick_interval);

        let handle = tokio::spawn(runtime.run());
        (WorkManager::new(tx, status), handle)
    }

    /// Submit `chain` under `name`, applying `policy` if a chain with that
    /// name is already active.
    pub async fn submit_chain(
        &self,
        name: impl Into<String>,
        policy: ExistingChainPolicy,
        chain: Chain,
    ) -> Result<()> {
        let name = name.into();
        debug!(chain = %name, ?policy, units = chain.len(), "submitting chain");
        self.tx
            .send(RuntimeEvent::SubmitChain {
                name,
                policy,
                chain,
            })
            .await?;
        Ok(())
    }

    /// Submit an ordered list of unit specs as one chain.
    ///
    /// Fails with `EmptyChain` if `units` is empty.
    pub async fn submit_units(
        &self,
        name: impl Into<String>,
        policy: ExistingChainPolicy,
        units: Vec<WorkUnitSpec>,
    ) -> Result<()> {
        let chain = Chain::from_specs(units)?;
        self.submit_chain(name, policy, chain).await
    }

    /// Cancel the chain registered under `name`. Idempotent.
    pub async fn cancel_chain(&self, name: impl Into<String>) -> Result<()> {
        self.tx
            .send(RuntimeEvent::CancelChain { name: name.into() })
            .await?;
        Ok(())
    }

    /// Drop finished chains from the registry.
    pub async fn prune_finished(&self) -> Result<()> {
        self.tx.send(RuntimeEvent::PruneFinished).await?;
        Ok(())
    }

    /// Ask the runtime loop to stop.
    pub async fn shutdown(&self) -> Result<()> {
        self.tx.send(RuntimeEvent::ShutdownRequested).await?;
        Ok(())
    }

    /// Current state of every unit of the chain registered under `name`.
    pub fn query(&self, name: &str) -> Vec<WorkInfo> {
        self.status.current(&StatusFilter::Chain(name.to_string()))
    }

    /// Current state of every unit tagged `tag`.
    pub fn query_by_tag(&self, tag: &str) -> Vec<WorkInfo> {
        self.status.current(&StatusFilter::Tag(tag.to_string()))
    }

    pub fn observe_chain(
        &self,
        name: &str,
    ) -> impl Stream<Item = Vec<WorkInfo>> + Send + Unpin + 'static {
        self.status.subscribe(StatusFilter::Chain(name.to_string()))
    }

    pub fn observe_by_tag(
        &self,
        tag: &str,
    ) -> impl Stream<Item = Vec<WorkInfo>> + Send + Unpin + 'static {
        self.status.subscribe(StatusFilter::Tag(tag.to_string()))
    }

    pub fn observe_all(&self) -> impl Stream<Item = Vec<WorkInfo>> + Send + Unpin + 'static {
        self.status.subscribe(StatusFilter::All)
    }

    pub fn status(&self) -> &StatusBus {
        &self.status
    }
}
