// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to an `ExecutorBackend` instead of spawning workers
//! itself. This makes it easy to swap in a fake executor in tests while
//! keeping the production worker pool in [`worker_pool`](super::worker_pool).
//!
//! - [`WorkerPoolBackend`](super::WorkerPoolBackend) is the default
//!   implementation. It resolves each unit's kind in a `WorkerRegistry` and
//!   runs it on a bounded pool of Tokio tasks.
//! - Tests can provide their own `ExecutorBackend` that, for example, records
//!   which units were dispatched and directly emits `UnitCompleted` events.

use std::future::Future;
use std::pin::Pin;

use crate::chain::ScheduledUnit;
use crate::errors::Result;
use crate::work::RunId;

/// Boxed future returned by backend operations.
pub type BackendFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Trait abstracting how scheduled units are executed.
///
/// Implementations must not wait for units to finish: results are reported
/// asynchronously as `RuntimeEvent::UnitCompleted`.
pub trait ExecutorBackend: Send {
    /// Start executing the given units.
    fn dispatch_units(&mut self, units: Vec<ScheduledUnit>) -> BackendFuture<'_>;

    /// Ask the given running units to stop. Best effort; a unit that has
    /// already finished is simply ignored.
    fn stop_units(&mut self, units: Vec<RunId>) -> BackendFuture<'_>;
}
