//! Variables, constraints and the propagation queue.

use std::collections::VecDeque;

use crate::constraint::{
    AllDifferent, Element, Element2d, LessOrEqual, PlusLessOrEqual, Propagator, SumEquals,
};
use crate::{Contradiction, Domain, ModelError, Store, VarId};

/// A constraint satisfaction or minimization problem.
///
/// Variables are declared with [`int_var`](Self::int_var) or
/// [`enum_var`](Self::enum_var); constraint methods post propagators that the
/// search wakes whenever one of their variables changes.
///
/// # Examples
/// ```
/// use tsptw_cp::Model;
///
/// # fn main() -> Result<(), tsptw_cp::ModelError> {
/// let mut model = Model::new();
/// let x = model.enum_var("x", 0, 3)?;
/// let y = model.enum_var("y", 0, 3)?;
/// model.all_different(&[x, y])?;
/// model.fix(x, 2)?;
///
/// let mut store = model.root().clone();
/// model.propagate_all(&mut store).expect("consistent");
/// assert!(!store.domain(y).contains(2));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct Model {
    root: Store,
    names: Vec<String>,
    propagators: Vec<Box<dyn Propagator>>,
    watchers: Vec<Vec<usize>>,
    objective: Option<VarId>,
}

impl Model {
    /// An empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a variable over `[min, max]` that only tracks its bounds.
    pub fn int_var(
        &mut self,
        name: impl Into<String>,
        min: i64,
        max: i64,
    ) -> Result<VarId, ModelError> {
        let name = name.into();
        match Domain::interval(min, max) {
            Some(domain) => Ok(self.declare(name, domain)),
            None => Err(ModelError::EmptyDomain { name, min, max }),
        }
    }

    /// Declare a variable holding every value of `[min, max]` explicitly.
    pub fn enum_var(
        &mut self,
        name: impl Into<String>,
        min: i64,
        max: i64,
    ) -> Result<VarId, ModelError> {
        let name = name.into();
        match Domain::enumerated(min, max) {
            Some(domain) => Ok(self.declare(name, domain)),
            None => Err(ModelError::EmptyDomain { name, min, max }),
        }
    }

    fn declare(&mut self, name: String, domain: Domain) -> VarId {
        self.names.push(name);
        self.watchers.push(Vec::new());
        self.root.push(domain)
    }

    /// Number of declared variables.
    #[must_use]
    pub const fn var_count(&self) -> usize {
        self.root.len()
    }

    /// Name given to `var` at declaration.
    #[must_use]
    pub fn name(&self, var: VarId) -> &str {
        self.names.get(var.index()).map_or("?", String::as_str)
    }

    /// Domains before any search decision.
    #[must_use]
    pub const fn root(&self) -> &Store {
        &self.root
    }

    /// Fix `var` to `value` in the root domains.
    pub fn fix(&mut self, var: VarId, value: i64) -> Result<(), ModelError> {
        self.check(var)?;
        self.root
            .fix(var, value)
            .map_err(|Contradiction| ModelError::ValueOutsideDomain {
                name: self.name(var).to_owned(),
                value,
            })?;
        self.root.take_modified();
        Ok(())
    }

    /// Minimize `var`.
    pub fn minimize(&mut self, var: VarId) -> Result<(), ModelError> {
        self.check(var)?;
        self.objective = Some(var);
        Ok(())
    }

    /// Variable to minimize, if any.
    #[must_use]
    pub const fn objective(&self) -> Option<VarId> {
        self.objective
    }

    /// Require pairwise distinct values.
    pub fn all_different(&mut self, vars: &[VarId]) -> Result<(), ModelError> {
        self.post(AllDifferent::new(vars.to_vec()))
    }

    /// Require `result = table[index]`.
    pub fn element(
        &mut self,
        index: VarId,
        table: Vec<i64>,
        result: VarId,
    ) -> Result<(), ModelError> {
        if table.is_empty() {
            return Err(ModelError::MalformedTable {
                constraint: "element",
            });
        }
        self.post(Element::new(index, table, result))
    }

    /// Require `result = table[row][col]`.
    pub fn element_2d(
        &mut self,
        row: VarId,
        col: VarId,
        table: Vec<Vec<i64>>,
        result: VarId,
    ) -> Result<(), ModelError> {
        let width = table.first().map_or(0, Vec::len);
        if width == 0 || table.iter().any(|line| line.len() != width) {
            return Err(ModelError::MalformedTable {
                constraint: "element_2d",
            });
        }
        self.post(Element2d::new(row, col, table, result))
    }

    /// Require `left <= right`.
    pub fn less_or_equal(&mut self, left: VarId, right: VarId) -> Result<(), ModelError> {
        self.post(LessOrEqual::new(left, right))
    }

    /// Require `left + offset <= right`.
    pub fn plus_less_or_equal(
        &mut self,
        left: VarId,
        offset: VarId,
        right: VarId,
    ) -> Result<(), ModelError> {
        self.post(PlusLessOrEqual::new(left, offset, right))
    }

    /// Require `total = sum(terms)`.
    pub fn sum(&mut self, terms: &[VarId], total: VarId) -> Result<(), ModelError> {
        self.post(SumEquals::new(terms.to_vec(), total))
    }

    /// Post a custom propagator.
    pub fn post<P: Propagator + 'static>(&mut self, propagator: P) -> Result<(), ModelError> {
        let vars = propagator.variables();
        for &var in &vars {
            self.check(var)?;
        }
        let id = self.propagators.len();
        for var in vars {
            if let Some(list) = self.watchers.get_mut(var.index())
                && !list.contains(&id)
            {
                list.push(id);
            }
        }
        self.propagators.push(Box::new(propagator));
        Ok(())
    }

    fn check(&self, var: VarId) -> Result<(), ModelError> {
        if self.root.owns(var) {
            Ok(())
        } else {
            Err(ModelError::UnknownVariable { index: var.index() })
        }
    }

    /// Run every propagator until no domain changes.
    pub fn propagate_all(&self, store: &mut Store) -> Result<(), Contradiction> {
        store.take_modified();
        self.run(store, (0..self.propagators.len()).collect())
    }

    /// Propagate the changes recorded in `store` since the last call.
    pub fn propagate(&self, store: &mut Store) -> Result<(), Contradiction> {
        let mut queue = Vec::new();
        for var in store.take_modified() {
            queue.extend(self.watchers_of(var));
        }
        self.run(store, queue)
    }

    fn watchers_of(&self, var: VarId) -> impl Iterator<Item = usize> + '_ {
        self.watchers
            .get(var.index())
            .into_iter()
            .flatten()
            .copied()
    }

    fn run(&self, store: &mut Store, initial: Vec<usize>) -> Result<(), Contradiction> {
        let mut queued = vec![false; self.propagators.len()];
        let mut queue = VecDeque::with_capacity(initial.len());
        for id in initial {
            enqueue(&mut queue, &mut queued, id);
        }
        while let Some(id) = queue.pop_front() {
            if let Some(flag) = queued.get_mut(id) {
                *flag = false;
            }
            let Some(propagator) = self.propagators.get(id) else {
                continue;
            };
            propagator.propagate(store)?;
            for var in store.take_modified() {
                for watcher in self.watchers_of(var) {
                    enqueue(&mut queue, &mut queued, watcher);
                }
            }
        }
        Ok(())
    }
}

fn enqueue(queue: &mut VecDeque<usize>, queued: &mut [bool], id: usize) {
    if let Some(flag) = queued.get_mut(id)
        && !*flag
    {
        *flag = true;
        queue.push_back(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn empty_domains_are_rejected() {
        let mut model = Model::new();
        let err = model.int_var("late", 5, 4).expect_err("empty");
        assert_eq!(
            err,
            ModelError::EmptyDomain {
                name: "late".to_owned(),
                min: 5,
                max: 4
            }
        );
    }

    #[rstest]
    fn foreign_variables_are_rejected() {
        let mut other = Model::new();
        other.int_var("a", 0, 1).expect("domain");
        let foreign = other.int_var("b", 0, 1).expect("domain");

        let mut model = Model::new();
        let own = model.int_var("a", 0, 1).expect("domain");
        let err = model.less_or_equal(own, foreign).expect_err("foreign");
        assert_eq!(err, ModelError::UnknownVariable { index: 1 });
    }

    #[rstest]
    fn ragged_tables_are_rejected() {
        let mut model = Model::new();
        let row = model.enum_var("r", 0, 1).expect("domain");
        let result = model.int_var("d", 0, 9).expect("domain");
        let err = model
            .element_2d(row, row, vec![vec![0, 1], vec![1]], result)
            .expect_err("ragged");
        assert_eq!(
            err,
            ModelError::MalformedTable {
                constraint: "element_2d"
            }
        );
    }

    #[rstest]
    fn fixing_outside_the_domain_fails() {
        let mut model = Model::new();
        let x = model.enum_var("x", 0, 3).expect("domain");
        let err = model.fix(x, 7).expect_err("outside");
        assert_eq!(
            err,
            ModelError::ValueOutsideDomain {
                name: "x".to_owned(),
                value: 7
            }
        );
    }

    #[rstest]
    fn propagation_chains_through_watchers() {
        let mut model = Model::new();
        let a = model.int_var("a", 0, 10).expect("domain");
        let b = model.int_var("b", 0, 10).expect("domain");
        let c = model.int_var("c", 0, 10).expect("domain");
        model.less_or_equal(a, b).expect("posted");
        model.less_or_equal(b, c).expect("posted");

        let mut store = model.root().clone();
        model.propagate_all(&mut store).expect("consistent");
        store.set_min(a, 6).expect("in range");
        model.propagate(&mut store).expect("consistent");
        assert_eq!(store.min(c), 6);

        store.set_max(c, 7).expect("in range");
        model.propagate(&mut store).expect("consistent");
        assert_eq!(store.max(a), 7);
    }

    #[rstest]
    fn propagation_reports_wipe_out() {
        let mut model = Model::new();
        let a = model.int_var("a", 0, 10).expect("domain");
        let b = model.int_var("b", 0, 10).expect("domain");
        let c = model.int_var("c", 0, 10).expect("domain");
        model.plus_less_or_equal(a, b, c).expect("posted");

        let mut store = model.root().clone();
        store.set_min(a, 6).expect("in range");
        store.set_min(b, 6).expect("in range");
        assert_eq!(model.propagate(&mut store), Err(Contradiction));
    }
}
