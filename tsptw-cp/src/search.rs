//! Depth-first branch-and-bound with restarts.
//!
//! [`Search`] is an iterator over solutions. When the model has an objective
//! every solution is strictly better than the previous one: the incumbent's
//! value minus one becomes the upper bound of the objective at every node
//! popped afterwards.
//!
//! With a [`Neighborhood`] plugged in, the search alternates restricted
//! descents. Each descent freezes part of the incumbent and ends at the first
//! improving solution, after `fail_limit` failures, or when its subtree is
//! exhausted; then the search restarts from the root with a fresh
//! neighbourhood. Only an unrestricted descent, or a root that fails under
//! the current bound, proves optimality.

use std::time::Instant;

use crate::{Contradiction, Model, Neighborhood, Store, VarId};

/// Values taken by every variable in a solution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    values: Vec<Option<i64>>,
}

impl Assignment {
    /// Assignment with no values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` for `var`.
    pub fn set(&mut self, var: VarId, value: i64) {
        let index = var.index();
        if self.values.len() <= index {
            self.values.resize(index.saturating_add(1), None);
        }
        if let Some(slot) = self.values.get_mut(index) {
            *slot = Some(value);
        }
    }

    /// Value recorded for `var`.
    #[must_use]
    pub fn value(&self, var: VarId) -> Option<i64> {
        self.values.get(var.index()).copied().flatten()
    }

    fn from_store(store: &Store) -> Self {
        Self {
            values: (0..store.len())
                .map(|index| store.value(VarId::new(index)))
                .collect(),
        }
    }
}

impl FromIterator<(VarId, i64)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (VarId, i64)>>(pairs: I) -> Self {
        let mut assignment = Self::new();
        for (var, value) in pairs {
            assignment.set(var, value);
        }
        assignment
    }
}

/// Resource limits for a [`Search`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// Wall-clock instant after which the search stops.
    pub deadline: Option<Instant>,
    /// Failures allowed in one restricted descent before restarting.
    pub fail_limit: Option<u64>,
}

/// Where a [`Search`] stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// More solutions may follow.
    Running,
    /// The space is exhausted: the last solution is optimal, or there is
    /// none.
    Exhausted,
    /// The deadline passed.
    TimedOut,
}

/// Counters describing the work done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes popped from the search stack.
    pub nodes: u64,
    /// Nodes whose propagation failed.
    pub fails: u64,
    /// Restarts that froze part of the incumbent.
    pub restarts: u64,
    /// Solutions returned.
    pub solutions: u64,
}

/// Branch-and-bound over a [`Model`].
///
/// Decision variables are chosen group by group (see
/// [`with_decision_groups`](Self::with_decision_groups)), smallest domain
/// first with ties broken by position, and always tried at their minimum
/// value first.
///
/// # Examples
/// ```
/// use tsptw_cp::{Model, Search, SearchStatus};
///
/// # fn main() -> Result<(), tsptw_cp::ModelError> {
/// let mut model = Model::new();
/// let x = model.enum_var("x", 0, 3)?;
/// let y = model.enum_var("y", 0, 3)?;
/// let total = model.int_var("total", 0, 6)?;
/// model.all_different(&[x, y])?;
/// model.sum(&[x, y], total)?;
/// model.minimize(total)?;
///
/// let mut search = Search::new(model);
/// let best = search.by_ref().last().and_then(|solution| solution.value(total));
/// assert_eq!(best, Some(1));
/// assert_eq!(search.status(), SearchStatus::Exhausted);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Search {
    model: Model,
    groups: Vec<Vec<VarId>>,
    limits: SearchLimits,
    neighborhood: Option<Box<dyn Neighborhood>>,
    warm_start: Option<Assignment>,
    stack: Vec<Store>,
    bounded_root: Option<(i64, Store)>,
    best: Option<i64>,
    restricted: bool,
    initial_descent: bool,
    pending_restart: bool,
    started: bool,
    fails_in_descent: u64,
    status: SearchStatus,
    stats: SearchStats,
}

impl Search {
    /// Search `model` with no limits and no neighbourhood.
    #[must_use]
    pub fn new(model: Model) -> Self {
        Self {
            model,
            groups: Vec::new(),
            limits: SearchLimits::default(),
            neighborhood: None,
            warm_start: None,
            stack: Vec::new(),
            bounded_root: None,
            best: None,
            restricted: false,
            initial_descent: false,
            pending_restart: false,
            started: false,
            fails_in_descent: 0,
            status: SearchStatus::Running,
            stats: SearchStats::default(),
        }
    }

    /// Branch on `groups` in order before any other variable.
    #[must_use]
    pub fn with_decision_groups(mut self, groups: Vec<Vec<VarId>>) -> Self {
        self.groups = groups;
        self
    }

    /// Apply a deadline and a per-descent failure limit.
    #[must_use]
    pub const fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Restart around the incumbent using `neighborhood`.
    #[must_use]
    pub fn with_neighborhood(mut self, neighborhood: Box<dyn Neighborhood>) -> Self {
        self.neighborhood = Some(neighborhood);
        self
    }

    /// Seed the neighbourhood with a known solution.
    ///
    /// The first descent then freezes around `solution` instead of searching
    /// from scratch, and the objective must improve on the value `solution`
    /// gives it. Without a neighbourhood the warm start is ignored.
    #[must_use]
    pub fn with_warm_start(mut self, solution: Assignment) -> Self {
        self.warm_start = Some(solution);
        self
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> SearchStatus {
        self.status
    }

    /// Work counters.
    #[must_use]
    pub const fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Objective value of the best solution so far.
    #[must_use]
    pub const fn best(&self) -> Option<i64> {
        self.best
    }

    fn start(&mut self) {
        self.started = true;
        if let (Some(neighborhood), Some(solution)) =
            (self.neighborhood.as_mut(), self.warm_start.take())
        {
            neighborhood.record_solution(&solution);
            self.best = self
                .model
                .objective()
                .and_then(|objective| solution.value(objective));
            self.pending_restart = true;
            return;
        }
        let mut root = self.model.root().clone();
        match self.model.propagate_all(&mut root) {
            Ok(()) => {
                self.initial_descent = self.neighborhood.is_some();
                self.stack.push(root);
            }
            Err(Contradiction) => self.status = SearchStatus::Exhausted,
        }
    }

    fn timed_out(&self) -> bool {
        self.limits
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// The root propagated under the current bound, or `None` if it fails.
    fn bounded_root(&mut self) -> Option<Store> {
        let bound = self.best.map_or(i64::MAX, |best| best.saturating_sub(1));
        if let Some((cached, root)) = &self.bounded_root
            && *cached == bound
        {
            return Some(root.clone());
        }
        let mut root = self.model.root().clone();
        self.model.propagate_all(&mut root).ok()?;
        if let Some(objective) = self.model.objective() {
            root.set_max(objective, bound).ok()?;
            self.model.propagate(&mut root).ok()?;
        }
        self.bounded_root = Some((bound, root.clone()));
        Some(root)
    }

    fn restart(&mut self) {
        self.pending_restart = false;
        self.stack.clear();
        self.fails_in_descent = 0;
        let Some(root) = self.bounded_root() else {
            log::debug!("root fails under bound {:?}; search closed", self.best);
            self.status = SearchStatus::Exhausted;
            return;
        };
        let Some(neighborhood) = self.neighborhood.as_mut() else {
            self.restricted = false;
            self.stack.push(root);
            return;
        };
        let mut candidate = root.clone();
        match neighborhood.fix_some_variables(&mut candidate) {
            Ok(true) => {
                self.stats.restarts += 1;
                log::trace!("restart {} around incumbent {:?}", self.stats.restarts, self.best);
                self.restricted = true;
                self.stack.push(candidate);
            }
            Ok(false) => {
                self.restricted = false;
                self.stack.push(root);
            }
            Err(Contradiction) => {
                self.stats.fails += 1;
                self.pending_restart = true;
            }
        }
    }

    fn fail(&mut self) {
        self.stats.fails += 1;
        self.fails_in_descent += 1;
        if self.restricted
            && self
                .limits
                .fail_limit
                .is_some_and(|limit| self.fails_in_descent >= limit)
        {
            self.pending_restart = true;
        }
    }

    /// Propagate a popped node under the current bound.
    fn settle(&self, store: &mut Store) -> Result<(), Contradiction> {
        if let (Some(objective), Some(best)) = (self.model.objective(), self.best) {
            store.set_max(objective, best.saturating_sub(1))?;
        }
        self.model.propagate(store)
    }

    fn choose(&self, store: &Store) -> Option<VarId> {
        self.groups
            .iter()
            .find_map(|group| smallest_unfixed(store, group.iter().copied()))
            .or_else(|| smallest_unfixed(store, (0..store.len()).map(VarId::new)))
    }

    fn branch(&mut self, store: Store, var: VarId) {
        let value = store.min(var);
        let mut right = store.clone();
        if right.remove(var, value).is_ok() {
            self.stack.push(right);
        }
        let mut left = store;
        if left.fix(var, value).is_ok() {
            self.stack.push(left);
        }
    }

    fn accept(&mut self, store: &Store) -> Assignment {
        let solution = Assignment::from_store(store);
        self.stats.solutions += 1;
        if let Some(objective) = self.model.objective() {
            self.best = store.value(objective);
        }
        if let Some(neighborhood) = self.neighborhood.as_mut() {
            neighborhood.record_solution(&solution);
            if self.restricted || self.initial_descent {
                self.initial_descent = false;
                self.pending_restart = true;
            }
        }
        solution
    }

    /// Advance to the next solution.
    fn step(&mut self) -> Option<Assignment> {
        if self.status != SearchStatus::Running {
            return None;
        }
        if !self.started {
            self.start();
        }
        while self.status == SearchStatus::Running {
            if self.timed_out() {
                self.status = SearchStatus::TimedOut;
                break;
            }
            if self.pending_restart {
                self.restart();
                continue;
            }
            let Some(mut store) = self.stack.pop() else {
                if self.restricted {
                    self.pending_restart = true;
                } else {
                    self.status = SearchStatus::Exhausted;
                }
                continue;
            };
            self.stats.nodes += 1;
            if self.settle(&mut store).is_err() {
                self.fail();
                continue;
            }
            match self.choose(&store) {
                Some(var) => self.branch(store, var),
                None => return Some(self.accept(&store)),
            }
        }
        None
    }
}

/// First-fail choice: smallest domain, then earliest position.
fn smallest_unfixed(store: &Store, vars: impl Iterator<Item = VarId>) -> Option<VarId> {
    vars.filter(|&var| !store.domain(var).is_fixed())
        .min_by_key(|&var| (store.domain(var).size(), var.index()))
}

impl Iterator for Search {
    type Item = Assignment;

    fn next(&mut self) -> Option<Assignment> {
        self.step()
    }
}
