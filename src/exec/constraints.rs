// src/exec/constraints.rs

//! Constraint checking.
//!
//! The scheduler polls a [`ConstraintChecker`] right before a unit starts.
//! [`DeviceState`] is the stock implementation: a set of flags describing
//! the host that can be flipped at runtime (e.g. when a charger is plugged
//! in).

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::types::Constraint;

/// Externally supplied answer to "does this precondition hold right now?".
pub trait ConstraintChecker: Send + Sync {
    fn is_satisfied(&self, constraint: Constraint) -> bool;
}

impl<T: ConstraintChecker + ?Sized> ConstraintChecker for Arc<T> {
    fn is_satisfied(&self, constraint: Constraint) -> bool {
        (**self).is_satisfied(constraint)
    }
}

/// Checker that considers every constraint satisfied.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConstraints;

impl ConstraintChecker for NoConstraints {
    fn is_satisfied(&self, _constraint: Constraint) -> bool {
        true
    }
}

/// Live device flags, one per [`Constraint`].
pub struct DeviceState {
    flags: [AtomicBool; Constraint::COUNT],
}

impl DeviceState {
    /// All flags start unset.
    pub fn new() -> Self {
        Self {
            flags: std::array::from_fn(|_| AtomicBool::new(false)),
        }
    }

    /// Builder-style setter.
    pub fn with(self, constraint: Constraint, satisfied: bool) -> Self {
        self.set(constraint, satisfied);
        self
    }

    pub fn set(&self, constraint: Constraint, satisfied: bool) {
        let previous = self.flag(constraint).swap(satisfied, Ordering::SeqCst);
        if previous != satisfied {
            debug!(%constraint, satisfied, "device state changed");
        }
    }

    pub fn get(&self, constraint: Constraint) -> bool {
        self.flag(constraint).load(Ordering::SeqCst)
    }

    fn flag(&self, constraint: Constraint) -> &AtomicBool {
        let idx = Constraint::ALL
            .iter()
            .position(|c| *c == constraint)
            .unwrap_or(0);
        &self.flags[idx]
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("DeviceState");
        for c in Constraint::ALL {
            s.field(c.as_str(), &self.get(c));
        }
        s.finish()
    }
}

impl ConstraintChecker for DeviceState {
    fn is_satisfied(&self, constraint: Constraint) -> bool {
        self.get(constraint)
    }
}
