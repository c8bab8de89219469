#![allow(dead_code)]

use workchain::config::{
    ChainConfig, ConfigFile, ConfigSection, DeviceSection, RawConfigFile, UnitConfig,
    WorkersSection,
};
use workchain::types::{Constraint, ExistingChainPolicy};
use workchain::work::{Value, WorkData};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                device: DeviceSection::default(),
                workers: WorkersSection::default(),
                chain: Default::default(),
            },
        }
    }

    pub fn with_chain(mut self, name: &str, chain: ChainConfig) -> Self {
        self.config.chain.insert(name.to_string(), chain);
        self
    }

    pub fn max_workers(mut self, n: usize) -> Self {
        self.config.config.max_workers = n;
        self
    }

    pub fn tick_interval_ms(mut self, ms: u64) -> Self {
        self.config.config.tick_interval_ms = ms;
        self
    }

    pub fn retain_finished(mut self, val: bool) -> Self {
        self.config.config.retain_finished = val;
        self
    }

    pub fn charging(mut self, val: bool) -> Self {
        self.config.device.charging = val;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ChainConfig`.
pub struct ChainConfigBuilder {
    chain: ChainConfig,
}

impl ChainConfigBuilder {
    pub fn new() -> Self {
        Self {
            chain: ChainConfig {
                policy: ExistingChainPolicy::default(),
                unit: vec![],
            },
        }
    }

    pub fn policy(mut self, policy: ExistingChainPolicy) -> Self {
        self.chain.policy = policy;
        self
    }

    pub fn unit(mut self, unit: UnitConfig) -> Self {
        self.chain.unit.push(unit);
        self
    }

    pub fn build(self) -> ChainConfig {
        self.chain
    }
}

impl Default for ChainConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `UnitConfig`.
pub struct UnitConfigBuilder {
    unit: UnitConfig,
}

impl UnitConfigBuilder {
    pub fn new(kind: &str) -> Self {
        Self {
            unit: UnitConfig {
                kind: kind.to_string(),
                input: WorkData::new(),
                tags: vec![],
                constraints: vec![],
            },
        }
    }

    pub fn input(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.unit.input.insert(key, value);
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.unit.tags.push(tag.to_string());
        self
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.unit.constraints.push(constraint);
        self
    }

    pub fn build(self) -> UnitConfig {
        self.unit
    }
}
