// src/exec/mod.rs

//! Execution layer.
//!
//! This module is responsible for actually running work units and reporting
//! back to the runtime via `RuntimeEvent`s.
//!
//! - [`worker`] defines the `Worker` capability and the kind registry.
//! - [`constraints`] defines constraint checking and `DeviceState`.
//! - [`backend`] provides the `ExecutorBackend` trait the runtime talks to.
//! - [`worker_pool`] is the production backend.

pub mod backend;
pub mod constraints;
pub mod worker;
pub mod worker_pool;

pub use backend::{BackendFuture, ExecutorBackend};
pub use constraints::{ConstraintChecker, DeviceState, NoConstraints};
pub use worker::{worker_fn, FnWorker, WorkContext, WorkFuture, Worker, WorkerRegistry};
pub use worker_pool::WorkerPoolBackend;
