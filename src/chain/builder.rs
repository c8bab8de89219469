// src/chain/builder.rs

//! Persistent chain builder.

use std::sync::Arc;

use crate::errors::{Result, WorkchainError};
use crate::work::{WorkUnit, WorkUnitSpec};

/// One link in the chain, pointing back at its predecessor.
///
/// Links are never mutated once created, so any number of chains can share
/// a common prefix.
#[derive(Debug)]
struct Link {
    unit: Arc<WorkUnit>,
    prev: Option<Arc<Link>>,
    len: usize,
}

/// An ordered, non-empty sequence of work units.
///
/// Building a chain never executes anything; hand it to
/// [`crate::engine::WorkManager::submit_chain`] to run it.
///
/// ```
/// use workchain::chain::Chain;
/// use workchain::work::WorkUnitSpec;
///
/// let base = Chain::begin(WorkUnitSpec::new("cleanup"));
/// let chain = base.then(WorkUnitSpec::new("blur")).then(WorkUnitSpec::new("save"));
/// assert_eq!(chain.len(), 3);
/// assert_eq!(base.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Chain {
    tail: Arc<Link>,
}

impl Chain {
    /// Start a one-element chain.
    pub fn begin(unit: impl Into<WorkUnit>) -> Self {
        Self {
            tail: Arc::new(Link {
                unit: Arc::new(unit.into()),
                prev: None,
                len: 1,
            }),
        }
    }

    /// Return a new chain with `unit` appended to the tail.
    ///
    /// All existing units are shared with `self`, not copied.
    pub fn then(&self, unit: impl Into<WorkUnit>) -> Chain {
        Chain {
            tail: Arc::new(Link {
                unit: Arc::new(unit.into()),
                prev: Some(Arc::clone(&self.tail)),
                len: self.tail.len + 1,
            }),
        }
    }

    /// Build a chain from an ordered list of specs.
    ///
    /// Fails with [`WorkchainError::EmptyChain`] if `specs` is empty.
    pub fn from_specs<I>(specs: I) -> Result<Chain>
    where
        I: IntoIterator<Item = WorkUnitSpec>,
    {
        let mut iter = specs.into_iter();
        let first = iter.next().ok_or(WorkchainError::EmptyChain)?;
        Ok(iter.fold(Chain::begin(first), |chain, spec| chain.then(spec)))
    }

    pub fn len(&self) -> usize {
        self.tail.len
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The entry point of the chain.
    pub fn head(&self) -> Arc<WorkUnit> {
        let mut link = &self.tail;
        while let Some(prev) = &link.prev {
            link = prev;
        }
        Arc::clone(&link.unit)
    }

    /// The most recently appended unit.
    pub fn last(&self) -> Arc<WorkUnit> {
        Arc::clone(&self.tail.unit)
    }

    /// Units in execution order (head first).
    pub fn units(&self) -> Vec<Arc<WorkUnit>> {
        let mut out = Vec::with_capacity(self.tail.len);
        let mut link = Some(&self.tail);
        while let Some(l) = link {
            out.push(Arc::clone(&l.unit));
            link = l.prev.as_ref();
        }
        out.reverse();
        out
    }
}
