// src/errors.rs

//! Crate-wide error types.
//!
//! - [`WorkchainError`] covers everything that can go wrong *around* a chain:
//!   loading config, building chains, talking to the runtime.
//! - [`WorkError`] is what a worker returns when a single unit fails. It never
//!   crosses the chain boundary as an error; the scheduler turns it into a
//!   `Failed` unit state.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkchainError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("a chain must contain at least one work unit")]
    EmptyChain,

    #[error("No worker registered for kind: {0}")]
    UnknownKind(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("work manager runtime is no longer running")]
    RuntimeClosed,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure of a single unit's execution.
#[derive(Error, Debug)]
pub enum WorkError {
    /// A required input key is missing or malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The worker ran and reported failure.
    #[error("execution failed: {0}")]
    Execution(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for WorkchainError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        WorkchainError::RuntimeClosed
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WorkchainError>;
