// src/scheduler/mod.rs

//! Chain registry and scheduling.
//!
//! - [`registry`] maps chain names to chain runs and applies the
//!   replace / keep / append policy.
//! - [`scheduler`] advances chains tick by tick and records outcomes.
//! - [`scheduler_step`] defines the result type for scheduler steps.

pub mod registry;
pub mod scheduler;
pub mod scheduler_step;

pub use registry::{ChainRegistry, SubmitOutcome};
pub use scheduler::Scheduler;
pub use scheduler_step::SchedulerStep;
