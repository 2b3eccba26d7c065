//! Pairwise distinct values.

use std::collections::BTreeSet;

use super::Propagator;
use crate::{Contradiction, Store, VarId};

/// Domains wider than this skip the pigeonhole check.
const PIGEONHOLE_LIMIT: u64 = 4096;

/// Every variable takes a different value.
///
/// Filtering is forward checking: a fixed value is removed from every other
/// domain. A pigeonhole test fails early when the union of small domains
/// holds fewer values than there are variables.
#[derive(Debug, Clone)]
pub struct AllDifferent {
    vars: Vec<VarId>,
}

impl AllDifferent {
    /// Constrain `vars` to be pairwise distinct.
    #[must_use]
    pub const fn new(vars: Vec<VarId>) -> Self {
        Self { vars }
    }

    fn pigeonhole(&self, store: &Store) -> Result<(), Contradiction> {
        if self
            .vars
            .iter()
            .any(|&var| store.domain(var).size() > PIGEONHOLE_LIMIT)
        {
            return Ok(());
        }
        let union: BTreeSet<i64> = self
            .vars
            .iter()
            .flat_map(|&var| store.domain(var).iter())
            .collect();
        if union.len() < self.vars.len() {
            return Err(Contradiction);
        }
        Ok(())
    }
}

impl Propagator for AllDifferent {
    fn variables(&self) -> Vec<VarId> {
        self.vars.clone()
    }

    fn propagate(&self, store: &mut Store) -> Result<(), Contradiction> {
        let mut changed = true;
        while changed {
            changed = false;
            for &var in &self.vars {
                let Some(value) = store.value(var) else {
                    continue;
                };
                for &other in &self.vars {
                    if other != var {
                        changed |= store.remove(other, value)?;
                    }
                }
            }
        }
        self.pigeonhole(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Model;
    use rstest::rstest;

    fn model_with(domains: &[(i64, i64)]) -> (Model, Vec<VarId>) {
        let mut model = Model::new();
        let vars = domains
            .iter()
            .enumerate()
            .map(|(index, &(min, max))| {
                model
                    .enum_var(format!("v{index}"), min, max)
                    .expect("non-empty domain")
            })
            .collect();
        (model, vars)
    }

    #[rstest]
    fn fixed_values_are_removed_elsewhere() {
        let (model, vars) = model_with(&[(1, 1), (1, 2), (1, 3)]);
        let mut store = model.root().clone();
        AllDifferent::new(vars.clone())
            .propagate(&mut store)
            .expect("consistent");
        let values: Vec<_> = vars.iter().map(|&var| store.value(var)).collect();
        assert_eq!(values, vec![Some(1), Some(2), Some(3)]);
    }

    #[rstest]
    fn equal_fixed_values_contradict() {
        let (model, vars) = model_with(&[(4, 4), (4, 4)]);
        let mut store = model.root().clone();
        assert_eq!(
            AllDifferent::new(vars).propagate(&mut store),
            Err(Contradiction)
        );
    }

    #[rstest]
    fn too_few_values_contradict() {
        let (model, vars) = model_with(&[(0, 1), (0, 1), (0, 1)]);
        let mut store = model.root().clone();
        assert_eq!(
            AllDifferent::new(vars).propagate(&mut store),
            Err(Contradiction)
        );
    }
}
