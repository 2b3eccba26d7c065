//! The seam between the run driver and an optimization engine.
//!
//! A [`Solver`] turns a [`SolveRequest`] into a lazy [`SolutionStream`] of
//! strictly improving tours. The stream reports how the search ended once it
//! is exhausted.

use std::time::Duration;

use thiserror::Error;

use crate::{Instance, Tour, TourError, TourEvaluation};

/// Parameters for one optimization run.
///
/// # Examples
/// ```rust
/// use std::time::Duration;
/// use tsptw_core::{Instance, SolveRequest, TimeWindow, Tour};
///
/// let window = TimeWindow::new(0, 10_000).expect("ordered bounds");
/// let instance = Instance::new(vec![vec![0, 1_000], vec![1_000, 0]], vec![window; 2])
///     .expect("valid instance");
/// let request = SolveRequest {
///     initial_tour: Tour::from_visits(&[1], 2).expect("valid tour"),
///     instance,
///     time_limit: Duration::from_secs(1),
/// };
/// let seed = request.validate().expect("feasible seed");
/// assert_eq!(seed.cost, 2_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveRequest {
    /// Instance to optimize.
    pub instance: Instance,
    /// Feasible tour used as warm start and incumbent bound.
    pub initial_tour: Tour,
    /// Wall-clock budget for the whole run.
    pub time_limit: Duration,
}

impl SolveRequest {
    /// Evaluate the initial tour and reject it unless it is feasible.
    ///
    /// The returned cost is the incumbent bound every reported solution must
    /// beat.
    pub fn validate(&self) -> Result<TourEvaluation, SolveError> {
        let evaluation = self.instance.evaluate(&self.initial_tour)?;
        match evaluation.first_violation {
            None => Ok(evaluation),
            Some(position) => Err(SolveError::InfeasibleInitialTour {
                position,
                node: self
                    .initial_tour
                    .nodes()
                    .get(position)
                    .copied()
                    .unwrap_or_default(),
                violation: evaluation.violation,
            }),
        }
    }
}

/// An improving tour surfaced by a solver.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Solution {
    /// Tour in visiting order, depot first.
    pub tour: Tour,
    /// Total travel cost in the integer precision unit.
    pub objective: i64,
}

/// How a finished search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// No better tour exists; the last solution is optimal.
    Closed,
    /// The time budget elapsed first.
    TimedOut,
}

/// Errors returned by [`Solver::solve`] or yielded by a [`SolutionStream`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The initial tour is not a permutation starting at the depot.
    #[error("invalid initial tour: {0}")]
    InvalidInitialTour(#[from] TourError),
    /// The initial tour misses a time window.
    #[error(
        "initial tour is infeasible: node {node} at position {position} is late \
         (total lateness {violation})"
    )]
    InfeasibleInitialTour {
        /// First late position.
        position: usize,
        /// Node visited at that position.
        node: usize,
        /// Summed lateness over the whole tour.
        violation: i64,
    },
    /// The constraint model could not be built.
    #[error("failed to build model: {message}")]
    Model {
        /// Description from the engine.
        message: String,
    },
    /// The engine produced something the instance contradicts.
    #[error("engine failure: {message}")]
    EngineFailure {
        /// Description of the inconsistency.
        message: String,
    },
}

/// A lazy sequence of strictly improving solutions.
///
/// Every item yielded in order has a lower objective than the one before it
/// and than the initial tour. After the iterator returns `None`,
/// [`termination`](Self::termination) reports why.
pub trait SolutionStream: Iterator<Item = Result<Solution, SolveError>> {
    /// How the search ended, or `None` while it is still running or after it
    /// failed.
    fn termination(&self) -> Option<Termination>;
}

/// Anytime optimizer for a [`SolveRequest`].
///
/// Implementations validate the request eagerly and return errors instead of
/// panicking. Solvers must be `Send + Sync` to be shared across threads.
pub trait Solver: Send + Sync {
    /// Short name shown in reports.
    fn name(&self) -> &str;

    /// Start a run, returning the stream of improving solutions.
    fn solve<'a>(
        &'a self,
        request: &'a SolveRequest,
    ) -> Result<Box<dyn SolutionStream + 'a>, SolveError>;
}
