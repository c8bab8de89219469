// src/exec/worker.rs

//! Worker abstraction and the kind → worker registry.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::errors::WorkError;
use crate::work::{UnitId, WorkData, WorkKind};

/// Boxed future returned by [`Worker::execute`].
pub type WorkFuture<'a> = Pin<Box<dyn Future<Output = Result<WorkData, WorkError>> + Send + 'a>>;

/// Everything a worker gets to see about the unit it runs.
#[derive(Debug, Clone)]
pub struct WorkContext {
    pub chain: String,
    pub unit_id: UnitId,
    pub input: WorkData,
    stop: CancellationToken,
}

impl WorkContext {
    pub fn new(
        chain: impl Into<String>,
        unit_id: UnitId,
        input: WorkData,
        stop: CancellationToken,
    ) -> Self {
        Self {
            chain: chain.into(),
            unit_id,
            input,
            stop,
        }
    }

    /// Whether the scheduler asked this unit to stop. Cooperative only: a
    /// worker that ignores this simply runs to completion and its output is
    /// discarded.
    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Resolves once a stop has been requested.
    pub async fn stopped(&self) {
        self.stop.cancelled().await
    }

    /// Fetch a required, non-empty string input.
    pub fn require_str(&self, key: &str) -> Result<&str, WorkError> {
        match self.input.get_str(key) {
            Some(s) if !s.is_empty() => Ok(s),
            Some(_) => Err(WorkError::InvalidInput(format!("input '{key}' is empty"))),
            None => Err(WorkError::InvalidInput(format!("missing input '{key}'"))),
        }
    }
}

/// The executable logic behind a [`WorkKind`].
///
/// Implementations may block on IO inside the returned future; each unit runs
/// in its own Tokio task, so a slow worker never stalls other chains.
pub trait Worker: Send + Sync {
    fn execute(&self, ctx: WorkContext) -> WorkFuture<'_>;
}

/// Maps kinds to the workers that implement them.
#[derive(Clone, Default)]
pub struct WorkerRegistry {
    workers: BTreeMap<WorkKind, Arc<dyn Worker>>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: impl Into<WorkKind>, worker: impl Worker + 'static) {
        self.workers.insert(kind.into(), Arc::new(worker));
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, kind: impl Into<WorkKind>, worker: impl Worker + 'static) -> Self {
        self.register(kind, worker);
        self
    }

    pub fn get(&self, kind: &WorkKind) -> Option<Arc<dyn Worker>> {
        self.workers.get(kind).cloned()
    }

    pub fn contains(&self, kind: &WorkKind) -> bool {
        self.workers.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &WorkKind> {
        self.workers.keys()
    }
}

impl fmt::Debug for WorkerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerRegistry")
            .field("kinds", &self.workers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Adapter turning an async closure into a [`Worker`].
pub struct FnWorker<F>(F);

impl<F, Fut> Worker for FnWorker<F>
where
    F: Fn(WorkContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<WorkData, WorkError>> + Send + 'static,
{
    fn execute(&self, ctx: WorkContext) -> WorkFuture<'_> {
        Box::pin((self.0)(ctx))
    }
}

/// Wrap an async closure as a worker.
///
/// ```
/// use workchain::exec::worker_fn;
/// use workchain::errors::WorkError;
/// use workchain::work::WorkData;
///
/// let _noop = worker_fn(|_ctx| async { Ok::<_, WorkError>(WorkData::new()) });
/// ```
pub fn worker_fn<F, Fut>(f: F) -> FnWorker<F>
where
    F: Fn(WorkContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<WorkData, WorkError>> + Send + 'static,
{
    FnWorker(f)
}
