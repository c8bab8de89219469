#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use workchain::errors::WorkError;
use workchain::exec::{WorkContext, WorkFuture, Worker};
use workchain::work::{UnitId, WorkData};

/// One recorded execution.
#[derive(Debug, Clone)]
pub struct Execution {
    pub chain: String,
    pub unit_id: UnitId,
    pub label: String,
    pub input: WorkData,
}

/// Shared, ordered record of worker executions.
#[derive(Debug, Clone, Default)]
pub struct ExecutionLog {
    entries: Arc<Mutex<Vec<Execution>>>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, ctx: &WorkContext, label: &str) {
        self.entries.lock().unwrap().push(Execution {
            chain: ctx.chain.clone(),
            unit_id: ctx.unit_id,
            label: label.to_string(),
            input: ctx.input.clone(),
        });
    }

    pub fn entries(&self) -> Vec<Execution> {
        self.entries.lock().unwrap().clone()
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.label).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Records every execution and returns a fixed output.
pub struct RecordingWorker {
    label: String,
    log: ExecutionLog,
    output: WorkData,
}

impl RecordingWorker {
    pub fn new(label: &str, log: ExecutionLog) -> Self {
        Self {
            label: label.to_string(),
            log,
            output: WorkData::new(),
        }
    }

    pub fn with_output(mut self, output: WorkData) -> Self {
        self.output = output;
        self
    }
}

impl Worker for RecordingWorker {
    fn execute(&self, ctx: WorkContext) -> WorkFuture<'_> {
        Box::pin(async move {
            self.log.push(&ctx, &self.label);
            Ok(self.output.clone())
        })
    }
}

/// Records the execution, then fails.
pub struct FailingWorker {
    label: String,
    log: ExecutionLog,
}

impl FailingWorker {
    pub fn new(label: &str, log: ExecutionLog) -> Self {
        Self {
            label: label.to_string(),
            log,
        }
    }
}

impl Worker for FailingWorker {
    fn execute(&self, ctx: WorkContext) -> WorkFuture<'_> {
        Box::pin(async move {
            self.log.push(&ctx, &self.label);
            Err(WorkError::Execution(format!("{} failed on purpose", self.label)))
        })
    }
}

/// Panics inside the worker task.
pub struct PanickingWorker;

impl Worker for PanickingWorker {
    fn execute(&self, ctx: WorkContext) -> WorkFuture<'_> {
        Box::pin(explode(ctx))
    }
}

async fn explode(ctx: WorkContext) -> Result<WorkData, WorkError> {
    panic!("worker blew up on unit {}", ctx.unit_id)
}

/// Handle that releases every [`GatedWorker`] created from it.
#[derive(Debug, Clone)]
pub struct Gate {
    tx: Arc<watch::Sender<bool>>,
}

impl Gate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn open(&self) {
        self.tx.send_replace(true);
    }

    pub fn worker(&self, label: &str, log: ExecutionLog) -> GatedWorker {
        GatedWorker {
            label: label.to_string(),
            log,
            rx: self.tx.subscribe(),
            started: Arc::new(AtomicUsize::new(0)),
            concurrent: Arc::new(AtomicUsize::new(0)),
            max_concurrent: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

/// Blocks until its [`Gate`] opens or the unit is stopped.
///
/// Tracks how many executions overlapped, for worker-limit tests.
#[derive(Clone)]
pub struct GatedWorker {
    label: String,
    log: ExecutionLog,
    rx: watch::Receiver<bool>,
    started: Arc<AtomicUsize>,
    concurrent: Arc<AtomicUsize>,
    max_concurrent: Arc<AtomicUsize>,
}

impl GatedWorker {
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent.load(Ordering::SeqCst)
    }
}

impl Worker for GatedWorker {
    fn execute(&self, ctx: WorkContext) -> WorkFuture<'_> {
        Box::pin(async move {
            self.log.push(&ctx, &self.label);
            self.started.fetch_add(1, Ordering::SeqCst);
            let now = self.concurrent.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_concurrent.fetch_max(now, Ordering::SeqCst);

            let mut rx = self.rx.clone();
            let opened = async move { rx.wait_for(|open| *open).await.is_ok() };
            let result = tokio::select! {
                true = opened => Ok(WorkData::new().with("gated", self.label.as_str())),
                _ = ctx.stopped() => Err(WorkError::Execution("stopped".to_string())),
            };

            self.concurrent.fetch_sub(1, Ordering::SeqCst);
            result
        })
    }
}
