// src/work/unit.rs

//! Work unit descriptors.

use std::collections::BTreeSet;
use std::fmt;

use uuid::Uuid;

use crate::types::Constraint;
use crate::work::data::{Value, WorkData};

/// Opaque unique identifier of a work unit, assigned at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId(Uuid);

impl UnitId {
    pub fn new() -> Self {
        UnitId(Uuid::now_v7())
    }
}

impl Default for UnitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identity of one execution slot of a unit inside a submitted chain.
///
/// The same [`WorkUnit`] can appear in several chains (shared prefixes) or
/// be submitted again under the same name, so its [`UnitId`] does not say
/// which run a result belongs to. Every unit record gets a fresh `RunId`
/// when its chain is submitted or appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        RunId(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identity of the executable logic behind a unit (e.g. `"blur"`).
///
/// Resolved against the [`crate::exec::WorkerRegistry`] when the unit runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkKind(String);

impl WorkKind {
    pub fn new(kind: impl Into<String>) -> Self {
        WorkKind(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkKind {
    fn from(s: &str) -> Self {
        WorkKind::new(s)
    }
}

impl From<String> for WorkKind {
    fn from(s: String) -> Self {
        WorkKind(s)
    }
}

/// Caller-facing description of a unit, before it is given an id.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkUnitSpec {
    pub kind: WorkKind,
    pub input: WorkData,
    pub tags: BTreeSet<String>,
    pub constraints: BTreeSet<Constraint>,
}

impl WorkUnitSpec {
    pub fn new(kind: impl Into<WorkKind>) -> Self {
        Self {
            kind: kind.into(),
            input: WorkData::new(),
            tags: BTreeSet::new(),
            constraints: BTreeSet::new(),
        }
    }

    pub fn input(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.input.insert(key, value);
        self
    }

    pub fn input_data(mut self, data: WorkData) -> Self {
        self.input = data;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.insert(constraint);
        self
    }

    /// Freeze this spec into a [`WorkUnit`] with a fresh id.
    pub fn build(self) -> WorkUnit {
        WorkUnit::new(self)
    }
}

/// Immutable descriptor of one schedulable unit.
///
/// Runtime state (`WorkState`, output) is held by the scheduler, not here,
/// so a `WorkUnit` can be shared freely between chains under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkUnit {
    id: UnitId,
    spec: WorkUnitSpec,
}

impl WorkUnit {
    pub fn new(spec: WorkUnitSpec) -> Self {
        Self {
            id: UnitId::new(),
            spec,
        }
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn kind(&self) -> &WorkKind {
        &self.spec.kind
    }

    pub fn input(&self) -> &WorkData {
        &self.spec.input
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.spec.tags
    }

    pub fn constraints(&self) -> &BTreeSet<Constraint> {
        &self.spec.constraints
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.spec.tags.contains(tag)
    }
}

impl From<WorkUnitSpec> for WorkUnit {
    fn from(spec: WorkUnitSpec) -> Self {
        WorkUnit::new(spec)
    }
}
