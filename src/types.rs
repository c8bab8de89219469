use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// What to do when a chain is submitted under a name that already has an
/// active chain.
///
/// - `Replace`: cancel the active chain and start the new one from its head.
/// - `Keep`: ignore the new submission; the active chain is untouched.
/// - `Append`: attach the new units to the tail of the active chain.
///
/// When no chain is active under the name, every policy simply starts the
/// new chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExistingChainPolicy {
    Replace,
    Keep,
    Append,
}

impl Default for ExistingChainPolicy {
    fn default() -> Self {
        ExistingChainPolicy::Replace
    }
}

impl FromStr for ExistingChainPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Ok(ExistingChainPolicy::Replace),
            "keep" => Ok(ExistingChainPolicy::Keep),
            "append" => Ok(ExistingChainPolicy::Append),
            other => Err(format!(
                "invalid chain policy: {other} (expected \"replace\", \"keep\" or \"append\")"
            )),
        }
    }
}

/// A precondition that must hold immediately before a unit starts.
///
/// Constraints are polled through a [`crate::exec::ConstraintChecker`]; an
/// unmet constraint holds the unit rather than failing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    Charging,
    NetworkConnected,
    BatteryNotLow,
    StorageNotLow,
    DeviceIdle,
}

impl Constraint {
    pub const COUNT: usize = 5;

    pub const ALL: [Constraint; Self::COUNT] = [
        Constraint::Charging,
        Constraint::NetworkConnected,
        Constraint::BatteryNotLow,
        Constraint::StorageNotLow,
        Constraint::DeviceIdle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Constraint::Charging => "charging",
            Constraint::NetworkConnected => "network_connected",
            Constraint::BatteryNotLow => "battery_not_low",
            Constraint::StorageNotLow => "storage_not_low",
            Constraint::DeviceIdle => "device_idle",
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Constraint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Constraint::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("invalid constraint: {wanted}"))
    }
}
