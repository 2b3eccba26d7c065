//! Bounds-consistent linear constraints.

use super::Propagator;
use crate::{Contradiction, Store, VarId};

/// `left <= right`.
#[derive(Debug, Clone, Copy)]
pub struct LessOrEqual {
    left: VarId,
    right: VarId,
}

impl LessOrEqual {
    /// Constrain `left <= right`.
    #[must_use]
    pub const fn new(left: VarId, right: VarId) -> Self {
        Self { left, right }
    }
}

impl Propagator for LessOrEqual {
    fn variables(&self) -> Vec<VarId> {
        vec![self.left, self.right]
    }

    fn propagate(&self, store: &mut Store) -> Result<(), Contradiction> {
        store.set_max(self.left, store.max(self.right))?;
        store.set_min(self.right, store.min(self.left))?;
        Ok(())
    }
}

/// `left + offset <= right` where `offset` is itself a variable.
///
/// This is the precedence constraint between consecutive arrival times.
#[derive(Debug, Clone, Copy)]
pub struct PlusLessOrEqual {
    left: VarId,
    offset: VarId,
    right: VarId,
}

impl PlusLessOrEqual {
    /// Constrain `left + offset <= right`.
    #[must_use]
    pub const fn new(left: VarId, offset: VarId, right: VarId) -> Self {
        Self {
            left,
            offset,
            right,
        }
    }
}

impl Propagator for PlusLessOrEqual {
    fn variables(&self) -> Vec<VarId> {
        vec![self.left, self.offset, self.right]
    }

    fn propagate(&self, store: &mut Store) -> Result<(), Contradiction> {
        let earliest = store
            .min(self.left)
            .saturating_add(store.min(self.offset));
        store.set_min(self.right, earliest)?;
        let ceiling = store.max(self.right);
        store.set_max(self.left, ceiling.saturating_sub(store.min(self.offset)))?;
        store.set_max(self.offset, ceiling.saturating_sub(store.min(self.left)))?;
        Ok(())
    }
}

/// `total = sum(terms)`.
#[derive(Debug, Clone)]
pub struct SumEquals {
    terms: Vec<VarId>,
    total: VarId,
}

impl SumEquals {
    /// Constrain `total` to the sum of `terms`.
    #[must_use]
    pub const fn new(terms: Vec<VarId>, total: VarId) -> Self {
        Self { terms, total }
    }
}

impl Propagator for SumEquals {
    fn variables(&self) -> Vec<VarId> {
        let mut vars = self.terms.clone();
        vars.push(self.total);
        vars
    }

    fn propagate(&self, store: &mut Store) -> Result<(), Contradiction> {
        let floor = self
            .terms
            .iter()
            .fold(0_i64, |acc, &term| acc.saturating_add(store.min(term)));
        let ceiling = self
            .terms
            .iter()
            .fold(0_i64, |acc, &term| acc.saturating_add(store.max(term)));
        store.set_min(self.total, floor)?;
        store.set_max(self.total, ceiling)?;

        let (low, high) = (store.min(self.total), store.max(self.total));
        for &term in &self.terms {
            let (term_min, term_max) = (store.min(term), store.max(term));
            let others_max = ceiling.saturating_sub(term_max);
            let others_min = floor.saturating_sub(term_min);
            store.set_min(term, low.saturating_sub(others_max))?;
            store.set_max(term, high.saturating_sub(others_min))?;
        }
        Ok(())
    }
}
