// src/status/mod.rs

//! Live status publishing.
//!
//! - [`snapshot`] defines the snapshot and filter types.
//! - [`bus`] is the watch-channel backed bus observers subscribe to.

pub mod bus;
pub mod snapshot;

pub use bus::StatusBus;
pub use snapshot::{StatusFilter, StatusSnapshot};
