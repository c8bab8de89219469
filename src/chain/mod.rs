// src/chain/mod.rs

//! Work chains.
//!
//! - [`builder`] holds the persistent [`Chain`] type callers build with
//!   `begin` / `then`.
//! - [`run`] holds the per-chain state machine the scheduler drives once a
//!   chain has been submitted.

pub mod builder;
pub mod run;

pub use builder::Chain;
pub use run::{Advance, CancelOutcome, ChainRun, ChainState, Completion, ScheduledUnit};
