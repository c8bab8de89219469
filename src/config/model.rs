// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::chain::Chain;
use crate::errors::Result;
use crate::exec::DeviceState;
use crate::types::{Constraint, ExistingChainPolicy};
use crate::work::{WorkData, WorkUnitSpec};

/// Configuration exactly as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// max_workers = 4
/// tick_interval_ms = 250
///
/// [device]
/// charging = false
///
/// [chain.image_manipulation]
/// policy = "replace"
///
/// [[chain.image_manipulation.unit]]
/// kind = "blur"
/// tags = ["progress"]
/// input = { uri = "img://1" }
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub device: DeviceSection,

    #[serde(default)]
    pub workers: WorkersSection,

    /// All chains from `[chain.<name>]`, keyed by chain name.
    #[serde(default)]
    pub chain: BTreeMap<String, ChainConfig>,
}

/// Validated configuration. Only obtainable through
/// `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub device: DeviceSection,
    pub workers: WorkersSection,
    pub chain: BTreeMap<String, ChainConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            config: raw.config,
            device: raw.device,
            workers: raw.workers,
            chain: raw.chain,
        }
    }
}

/// `[config]` section: runtime behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Maximum number of units executing concurrently.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// How often held units get their constraints re-checked.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Keep finished chains queryable until they are pruned or replaced.
    /// When `false`, a chain is dropped on the tick after it finishes.
    #[serde(default = "default_retain_finished")]
    pub retain_finished: bool,
}

fn default_max_workers() -> usize {
    4
}

fn default_tick_interval_ms() -> u64 {
    250
}

fn default_retain_finished() -> bool {
    true
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            tick_interval_ms: default_tick_interval_ms(),
            retain_finished: default_retain_finished(),
        }
    }
}

/// `[device]` section: initial values of the device flags constraints are
/// checked against.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceSection {
    #[serde(default)]
    pub charging: bool,
    #[serde(default = "default_true")]
    pub network_connected: bool,
    #[serde(default = "default_true")]
    pub battery_not_low: bool,
    #[serde(default = "default_true")]
    pub storage_not_low: bool,
    #[serde(default)]
    pub device_idle: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            charging: false,
            network_connected: true,
            battery_not_low: true,
            storage_not_low: true,
            device_idle: false,
        }
    }
}

impl DeviceSection {
    pub fn to_device_state(&self) -> DeviceState {
        DeviceState::new()
            .with(Constraint::Charging, self.charging)
            .with(Constraint::NetworkConnected, self.network_connected)
            .with(Constraint::BatteryNotLow, self.battery_not_low)
            .with(Constraint::StorageNotLow, self.storage_not_low)
            .with(Constraint::DeviceIdle, self.device_idle)
    }
}

/// `[workers]` section: settings for the bundled sample workers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkersSection {
    /// Artificial delay each sample worker spends "working".
    #[serde(default)]
    pub simulated_delay_ms: u64,
}

/// `[chain.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// What to do if a chain with this name is already active.
    #[serde(default)]
    pub policy: ExistingChainPolicy,

    /// Units in execution order (`[[chain.<name>.unit]]`).
    #[serde(default)]
    pub unit: Vec<UnitConfig>,
}

impl ChainConfig {
    /// Build a fresh [`Chain`] (with fresh unit ids) from this definition.
    pub fn to_chain(&self) -> Result<Chain> {
        Chain::from_specs(self.unit.iter().map(UnitConfig::to_spec))
    }
}

/// `[[chain.<name>.unit]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitConfig {
    pub kind: String,

    #[serde(default)]
    pub input: WorkData,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

impl UnitConfig {
    pub fn to_spec(&self) -> WorkUnitSpec {
        let spec = WorkUnitSpec::new(self.kind.as_str()).input_data(self.input.clone());
        let spec = self.tags.iter().fold(spec, |s, t| s.tag(t.as_str()));
        self.constraints
            .iter()
            .fold(spec, |s, c| s.constraint(*c))
    }
}
