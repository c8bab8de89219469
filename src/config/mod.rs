// src/config/mod.rs

//! Configuration loading and validation for workchain.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like non-empty chains (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, parse_str};
pub use model::{
    ChainConfig, ConfigFile, ConfigSection, DeviceSection, RawConfigFile, UnitConfig,
    WorkersSection,
};
pub use validate::validate_kinds;
