//! `CpLnsSolver`: anytime search driven by the windowed neighbourhood.
//!
//! The seed tour fixes the incumbent bound and is loaded as warm start; the
//! first descent already runs inside a window around it. Each improving
//! tour the engine finds is decoded, checked against the instance and then
//! yielded, so the caller sees every improvement as soon as it exists.

use std::num::{NonZeroU64, NonZeroUsize};
use std::time::Instant;

use tsptw_core::{
    Instance, Solution, SolutionStream, SolveError, SolveRequest, Solver, Termination, Tour,
};
use tsptw_cp::{Assignment, Search, SearchLimits, SearchStatus};

use crate::model::{TsptwModel, TsptwVars};
use crate::neighborhood::ConsecutiveNeighborhood;

const DEFAULT_WINDOW_SIZE: NonZeroUsize = match NonZeroUsize::new(5) {
    Some(size) => size,
    None => NonZeroUsize::MIN,
};

const DEFAULT_FAILURE_LIMIT: NonZeroU64 = match NonZeroU64::new(30) {
    Some(limit) => limit,
    None => NonZeroU64::MIN,
};

/// Configuration for [`CpLnsSolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpLnsConfig {
    /// Consecutive positions relaxed per restart.
    pub window_size: NonZeroUsize,
    /// Failures tolerated inside one window before restarting.
    pub max_failures_per_window: NonZeroU64,
    /// Seed of the window generator.
    pub seed: u64,
}

impl Default for CpLnsConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            max_failures_per_window: DEFAULT_FAILURE_LIMIT,
            seed: 31,
        }
    }
}

/// Constraint-programming solver with large neighbourhood search.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use tsptw_core::test_support::open_instance;
/// use tsptw_core::{SolveRequest, Solver, Termination, Tour};
/// use tsptw_solver_cp::CpLnsSolver;
///
/// let distances = vec![vec![0, 1, 1], vec![1, 0, 1], vec![1, 1, 0]];
/// let request = SolveRequest {
///     instance: open_instance(distances, 100).expect("square"),
///     initial_tour: Tour::from_visits(&[1, 2], 3).expect("valid tour"),
///     time_limit: Duration::from_secs(1),
/// };
/// let solver = CpLnsSolver::default();
/// let mut stream = solver.solve(&request).expect("feasible seed");
/// assert!(stream.next().is_none());
/// assert_eq!(stream.termination(), Some(Termination::Closed));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CpLnsSolver {
    config: CpLnsConfig,
}

impl CpLnsSolver {
    /// Construct a solver with explicit configuration.
    #[must_use]
    pub const fn with_config(config: CpLnsConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &CpLnsConfig {
        &self.config
    }
}

impl Solver for CpLnsSolver {
    fn name(&self) -> &str {
        "cp-lns"
    }

    fn solve<'a>(
        &'a self,
        request: &'a SolveRequest,
    ) -> Result<Box<dyn SolutionStream + 'a>, SolveError> {
        let seed = request.validate()?;
        let started = Instant::now();
        if seed.cost == 0 {
            log::info!("seed tour costs nothing; it is optimal");
            return Ok(Box::new(CpLnsStream::closed(&request.instance, started)));
        }

        let TsptwModel { model, vars } =
            TsptwModel::build(&request.instance, seed.cost).map_err(|err| SolveError::Model {
                message: err.to_string(),
            })?;
        log::debug!(
            "posted {} variables for {} nodes below bound {}",
            model.var_count(),
            request.instance.node_count(),
            seed.cost
        );

        let neighborhood = ConsecutiveNeighborhood::new(
            vars.positions.clone(),
            self.config.window_size.get(),
            self.config.seed,
        );
        let limits = SearchLimits {
            deadline: started.checked_add(request.time_limit),
            fail_limit: Some(self.config.max_failures_per_window.get()),
        };
        let search = Search::new(model)
            .with_decision_groups(vars.decision_groups())
            .with_limits(limits)
            .with_neighborhood(Box::new(neighborhood))
            .with_warm_start(vars.warm_start(&request.initial_tour));

        Ok(Box::new(CpLnsStream {
            instance: &request.instance,
            run: Some(Run { search, vars }),
            incumbent: seed.cost,
            termination: None,
            started,
        }))
    }
}

#[derive(Debug)]
struct Run {
    search: Search,
    vars: TsptwVars,
}

/// Improving tours as the engine finds them.
#[derive(Debug)]
struct CpLnsStream<'a> {
    instance: &'a Instance,
    run: Option<Run>,
    incumbent: i64,
    termination: Option<Termination>,
    started: Instant,
}

impl<'a> CpLnsStream<'a> {
    const fn closed(instance: &'a Instance, started: Instant) -> Self {
        Self {
            instance,
            run: None,
            incumbent: 0,
            termination: Some(Termination::Closed),
            started,
        }
    }

    fn finish(&mut self) -> Option<Result<Solution, SolveError>> {
        let run = self.run.take()?;
        let stats = run.search.stats();
        let termination = match run.search.status() {
            SearchStatus::Exhausted => Termination::Closed,
            SearchStatus::TimedOut => Termination::TimedOut,
            SearchStatus::Running => {
                return Some(Err(engine_failure("search stopped while still running")));
            }
        };
        log::info!(
            "search {termination:?} after {:?}: {} solutions, {} nodes, {} fails, {} restarts",
            self.started.elapsed(),
            stats.solutions,
            stats.nodes,
            stats.fails,
            stats.restarts
        );
        self.termination = Some(termination);
        None
    }
}

/// Check an engine solution against the instance before it is surfaced.
fn verify(
    instance: &Instance,
    vars: &TsptwVars,
    assignment: &Assignment,
    incumbent: i64,
) -> Result<Solution, SolveError> {
    let nodes = vars
        .decode(assignment)
        .ok_or_else(|| engine_failure("solution leaves a position unassigned"))?;
    let objective = vars
        .objective(assignment)
        .ok_or_else(|| engine_failure("solution leaves the total unassigned"))?;
    let tour = Tour::new(nodes, instance.node_count())
        .map_err(|err| engine_failure(format!("solution is not a tour: {err}")))?;
    let evaluation = instance
        .evaluate(&tour)
        .map_err(|err| engine_failure(format!("solution does not fit the instance: {err}")))?;
    if let Some(position) = evaluation.first_violation {
        return Err(engine_failure(format!(
            "tour {tour} is late at position {position}"
        )));
    }
    if evaluation.cost != objective {
        return Err(engine_failure(format!(
            "tour {tour} costs {} but the engine reported {objective}",
            evaluation.cost
        )));
    }
    if objective >= incumbent {
        return Err(engine_failure(format!(
            "objective {objective} does not improve on {incumbent}"
        )));
    }
    Ok(Solution { tour, objective })
}

fn engine_failure(message: impl Into<String>) -> SolveError {
    SolveError::EngineFailure {
        message: message.into(),
    }
}

impl Iterator for CpLnsStream<'_> {
    type Item = Result<Solution, SolveError>;

    fn next(&mut self) -> Option<Self::Item> {
        let run = self.run.as_mut()?;
        let Some(assignment) = run.search.next() else {
            return self.finish();
        };
        match verify(self.instance, &run.vars, &assignment, self.incumbent) {
            Ok(solution) => {
                self.incumbent = solution.objective;
                log::debug!(
                    "improved to {} after {:?}",
                    solution.objective,
                    self.started.elapsed()
                );
                Some(Ok(solution))
            }
            Err(err) => {
                log::warn!("discarding run: {err}");
                self.run = None;
                Some(Err(err))
            }
        }
    }
}

impl SolutionStream for CpLnsStream<'_> {
    fn termination(&self) -> Option<Termination> {
        self.termination
    }
}
