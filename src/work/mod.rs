// src/work/mod.rs

//! Work unit model.
//!
//! - [`data`] holds the key/value payload type used for input and output.
//! - [`unit`] defines the immutable unit descriptor and its builder.
//! - [`info`] defines unit states and the snapshot type observers see.

pub mod data;
pub mod info;
pub mod unit;

pub use data::{Value, WorkData};
pub use info::{WorkInfo, WorkState};
pub use unit::{RunId, UnitId, WorkKind, WorkUnit, WorkUnitSpec};
