// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, WorkchainError};
use crate::exec::WorkerRegistry;
use crate::work::WorkKind;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::WorkchainError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_global_config(cfg)?;
    validate_chains(cfg)?;
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.max_workers == 0 {
        return Err(WorkchainError::ConfigError(
            "[config].max_workers must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.config.tick_interval_ms == 0 {
        return Err(WorkchainError::ConfigError(
            "[config].tick_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_chains(cfg: &RawConfigFile) -> Result<()> {
    for (name, chain) in cfg.chain.iter() {
        if name.trim().is_empty() {
            return Err(WorkchainError::ConfigError(
                "chain names must not be empty".to_string(),
            ));
        }

        if chain.unit.is_empty() {
            return Err(WorkchainError::ConfigError(format!(
                "chain '{}' must contain at least one [[chain.{}.unit]] entry",
                name, name
            )));
        }

        for (idx, unit) in chain.unit.iter().enumerate() {
            if unit.kind.trim().is_empty() {
                return Err(WorkchainError::ConfigError(format!(
                    "chain '{}' unit #{} has an empty `kind`",
                    name, idx
                )));
            }
        }
    }
    Ok(())
}

/// Check that every kind referenced by the config has a registered worker.
pub fn validate_kinds(cfg: &ConfigFile, workers: &WorkerRegistry) -> Result<()> {
    for (name, chain) in cfg.chain.iter() {
        for unit in chain.unit.iter() {
            let kind = WorkKind::new(unit.kind.as_str());
            if !workers.contains(&kind) {
                return Err(WorkchainError::UnknownKind(format!(
                    "'{}' (used by chain '{}')",
                    unit.kind, name
                )));
            }
        }
    }
    Ok(())
}
