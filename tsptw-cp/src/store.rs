//! Variable domains for one search node.
#![expect(
    clippy::indexing_slicing,
    reason = "variable ids are minted by the owning model and always index its store"
)]

use crate::{Contradiction, Domain};

/// Handle to a decision variable of a [`Model`](crate::Model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the variable in declaration order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// The domains of every variable at one node of the search tree.
///
/// Cloning a store is how the search branches. Mutators record which
/// variables changed so propagation can resume from them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Store {
    domains: Vec<Domain>,
    modified: Vec<VarId>,
}

impl Store {
    pub(crate) fn push(&mut self, domain: Domain) -> VarId {
        let var = VarId::new(self.domains.len());
        self.domains.push(domain);
        var
    }

    pub(crate) fn take_modified(&mut self) -> Vec<VarId> {
        std::mem::take(&mut self.modified)
    }

    pub(crate) const fn owns(&self, var: VarId) -> bool {
        var.0 < self.domains.len()
    }

    /// Number of variables.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.domains.len()
    }

    /// Whether the store holds no variables.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Current domain of `var`.
    #[must_use]
    pub fn domain(&self, var: VarId) -> &Domain {
        &self.domains[var.0]
    }

    /// Lower bound of `var`.
    #[must_use]
    pub fn min(&self, var: VarId) -> i64 {
        self.domain(var).min()
    }

    /// Upper bound of `var`.
    #[must_use]
    pub fn max(&self, var: VarId) -> i64 {
        self.domain(var).max()
    }

    /// Value of `var` once it is fixed.
    #[must_use]
    pub fn value(&self, var: VarId) -> Option<i64> {
        self.domain(var).value()
    }

    /// Whether every variable is fixed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.domains.iter().all(Domain::is_fixed)
    }

    /// Raise the lower bound of `var`.
    pub fn set_min(&mut self, var: VarId, value: i64) -> Result<bool, Contradiction> {
        let changed = self.domains[var.0].set_min(value)?;
        Ok(self.note(var, changed))
    }

    /// Lower the upper bound of `var`.
    pub fn set_max(&mut self, var: VarId, value: i64) -> Result<bool, Contradiction> {
        let changed = self.domains[var.0].set_max(value)?;
        Ok(self.note(var, changed))
    }

    /// Fix `var` to `value`.
    pub fn fix(&mut self, var: VarId, value: i64) -> Result<bool, Contradiction> {
        let changed = self.domains[var.0].fix(value)?;
        Ok(self.note(var, changed))
    }

    /// Remove `value` from `var`.
    pub fn remove(&mut self, var: VarId, value: i64) -> Result<bool, Contradiction> {
        let changed = self.domains[var.0].remove(value)?;
        Ok(self.note(var, changed))
    }

    fn note(&mut self, var: VarId, changed: bool) -> bool {
        if changed {
            self.modified.push(var);
        }
        changed
    }
}
