//! Constraint model of a TSPTW instance.
//!
//! Position `i` of the tour holds node `x[i]`. Element constraints read the
//! window of that node into `earliest[i]` and `latest[i]`, and the cost of
//! the edge leaving it into `dist[i]`; the last edge closes the tour back to
//! the depot. Arrival times chain along the tour and must stay inside the
//! windows. The total travel cost must beat the seed and is minimized.

use tsptw_core::{Instance, Tour};
use tsptw_cp::{Assignment, Model, ModelError, VarId};

/// Variables of a [`TsptwModel`], by role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TsptwVars {
    /// Node at each position; position 0 is fixed to the depot.
    pub positions: Vec<VarId>,
    /// Arrival time at each position.
    pub arrivals: Vec<VarId>,
    /// Cost of the edge leaving each position, the last one returning to the
    /// depot.
    pub edges: Vec<VarId>,
    /// Total travel cost.
    pub total: Option<VarId>,
}

impl TsptwVars {
    /// Branching order: nodes first, then edge costs.
    #[must_use]
    pub fn decision_groups(&self) -> Vec<Vec<VarId>> {
        vec![self.positions.clone(), self.edges.clone()]
    }

    /// Load `tour` onto the position variables.
    #[must_use]
    pub fn warm_start(&self, tour: &Tour) -> Assignment {
        self.positions
            .iter()
            .zip(tour.nodes())
            .filter_map(|(&var, &node)| Some((var, i64::try_from(node).ok()?)))
            .collect()
    }

    /// Read the visiting order out of a complete assignment.
    #[must_use]
    pub fn decode(&self, solution: &Assignment) -> Option<Vec<usize>> {
        self.positions
            .iter()
            .map(|&var| usize::try_from(solution.value(var)?).ok())
            .collect()
    }

    /// Objective value of a complete assignment.
    #[must_use]
    pub fn objective(&self, solution: &Assignment) -> Option<i64> {
        solution.value(self.total?)
    }
}

/// A TSPTW instance posted onto a [`Model`].
#[derive(Debug)]
pub struct TsptwModel {
    /// The constraint model, ready to search.
    pub model: Model,
    /// Handles on its variables.
    pub vars: TsptwVars,
}

impl TsptwModel {
    /// Post `instance` with the requirement that the total cost stays below
    /// `upper_bound`.
    ///
    /// Fails with [`ModelError::EmptyDomain`] when `upper_bound` is not
    /// positive, since no tour can cost less than zero.
    ///
    /// # Examples
    /// ```
    /// use tsptw_core::test_support::open_instance;
    /// use tsptw_solver_cp::TsptwModel;
    ///
    /// let instance = open_instance(vec![vec![0, 2], vec![3, 0]], 10).expect("square");
    /// let tsptw = TsptwModel::build(&instance, 6).expect("model");
    /// assert_eq!(tsptw.vars.positions.len(), 2);
    /// assert_eq!(tsptw.vars.edges.len(), 2);
    /// ```
    pub fn build(instance: &Instance, upper_bound: i64) -> Result<Self, ModelError> {
        let node_count = instance.node_count();
        let last_node = to_value(node_count.saturating_sub(1));
        let windows = instance.time_windows();
        let opening: Vec<i64> = windows.iter().map(|window| window.earliest()).collect();
        let closing: Vec<i64> = windows.iter().map(|window| window.latest()).collect();
        let horizon = instance.horizon().max(0);

        let mut model = Model::new();
        let mut vars = TsptwVars::default();
        for position in 0..node_count {
            let node = model.enum_var(format!("x[{position}]"), 0, last_node)?;
            let earliest = model.int_var(
                format!("earliest[{position}]"),
                min_of(&opening),
                max_of(&opening),
            )?;
            let latest = model.int_var(
                format!("latest[{position}]"),
                min_of(&closing),
                max_of(&closing),
            )?;
            model.element(node, opening.clone(), earliest)?;
            model.element(node, closing.clone(), latest)?;

            let arrival = model.int_var(format!("arrival[{position}]"), 0, horizon)?;
            model.less_or_equal(earliest, arrival)?;
            model.less_or_equal(arrival, latest)?;

            vars.positions.push(node);
            vars.arrivals.push(arrival);
        }
        model.all_different(&vars.positions)?;
        if let (Some(&depot), Some(&start)) = (vars.positions.first(), vars.arrivals.first()) {
            model.fix(depot, to_value(Instance::DEPOT))?;
            model.fix(start, 0)?;
        }

        let distances = instance.distances().to_vec();
        let longest = instance.max_distance();
        let successors = vars.positions.iter().cycle().skip(1);
        for (position, (&from, &to)) in vars.positions.iter().zip(successors).enumerate() {
            let edge = model.int_var(format!("dist[{position}]"), 0, longest)?;
            model.element_2d(from, to, distances.clone(), edge)?;
            vars.edges.push(edge);
        }
        for (pair, &edge) in vars.arrivals.windows(2).zip(&vars.edges) {
            if let [before, after] = *pair {
                model.plus_less_or_equal(before, edge, after)?;
            }
        }

        let total = model.int_var("total", 0, upper_bound.saturating_sub(1))?;
        model.sum(&vars.edges, total)?;
        model.minimize(total)?;
        vars.total = Some(total);
        Ok(Self { model, vars })
    }
}

fn to_value(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

fn min_of(values: &[i64]) -> i64 {
    values.iter().copied().min().unwrap_or_default()
}

fn max_of(values: &[i64]) -> i64 {
    values.iter().copied().max().unwrap_or_default()
}
