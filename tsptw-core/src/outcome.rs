//! Run classification.
//!
//! A [`RunTracker`] drains a [`SolutionStream`], remembers the best tour and
//! when it arrived, and folds the result into a [`RunOutcome`].

use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};

use crate::{SolveRequest, Solver, Termination, Tour, unscale};

/// Final classification of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Parsing, model building or search failed.
    Crashed,
    /// The search proved that no better tour exists.
    Closed {
        /// Whether the initial tour was beaten.
        improved: bool,
    },
    /// The time budget elapsed before optimality was proven.
    Open {
        /// Whether the initial tour was beaten.
        improved: bool,
    },
}

impl RunStatus {
    /// Classify a run. A crash overrides the other flags.
    ///
    /// # Examples
    /// ```
    /// use tsptw_core::RunStatus;
    ///
    /// assert_eq!(RunStatus::classify(true, false, false).label(), "closed (initial)");
    /// assert_eq!(RunStatus::classify(true, true, true).label(), "crashed");
    /// ```
    #[must_use]
    pub const fn classify(closed: bool, improved: bool, crashed: bool) -> Self {
        if crashed {
            Self::Crashed
        } else if closed {
            Self::Closed { improved }
        } else {
            Self::Open { improved }
        }
    }

    /// The label printed in the report line.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Crashed => "crashed",
            Self::Closed { improved: true } => "closed (improved)",
            Self::Closed { improved: false } => "closed (initial)",
            Self::Open { improved: true } => "open (improved)",
            Self::Open { improved: false } => "open (initial)",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for RunStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Everything the reporter needs to know about a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Classification of the run.
    pub status: RunStatus,
    /// Cost of the best tour in real units. Until a solver improves on the
    /// seed this is the cost given on the command line.
    pub objective: f64,
    /// Best known tour, if the run got far enough to have one.
    pub tour: Option<Tour>,
    /// Message of the error that crashed the run.
    pub error: Option<String>,
    /// Time from the start of the run until the best tour was found.
    pub time_to_best: Duration,
    /// Number of improving solutions received.
    pub improvements: usize,
}

impl RunOutcome {
    /// Whether the initial tour was beaten.
    #[must_use]
    pub const fn improved(&self) -> bool {
        matches!(
            self.status,
            RunStatus::Closed { improved: true } | RunStatus::Open { improved: true }
        )
    }

    /// Whether the reported tour is proven optimal.
    #[must_use]
    pub const fn proven_optimal(&self) -> bool {
        matches!(self.status, RunStatus::Closed { .. })
    }

    /// Whether the run failed.
    #[must_use]
    pub const fn crashed(&self) -> bool {
        matches!(self.status, RunStatus::Crashed)
    }
}

/// Wall-clock bookkeeping for one run.
///
/// # Examples
/// ```
/// use tsptw_core::{RunStatus, RunTracker};
///
/// let err = std::io::Error::other("missing file");
/// let outcome = RunTracker::start(12.5).crash(&err);
/// assert_eq!(outcome.status, RunStatus::Crashed);
/// assert_eq!(outcome.error.as_deref(), Some("missing file"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RunTracker {
    started: Instant,
    initial_cost: f64,
}

impl RunTracker {
    /// Start the clock. `initial_cost` is reported until a solver improves it.
    #[must_use]
    pub fn start(initial_cost: f64) -> Self {
        Self {
            started: Instant::now(),
            initial_cost,
        }
    }

    /// Run `solver` to completion and classify the result.
    ///
    /// Errors from the solver do not escape: they end the run as
    /// [`RunStatus::Crashed`] with the message captured.
    pub fn run(self, solver: &dyn Solver, request: &SolveRequest) -> RunOutcome {
        log::info!(
            "running {} on {} nodes with a {:?} budget",
            solver.name(),
            request.instance.node_count(),
            request.time_limit
        );
        let mut stream = match solver.solve(request) {
            Ok(stream) => stream,
            Err(err) => return self.crash(&err),
        };

        let mut outcome = RunOutcome {
            status: RunStatus::Open { improved: false },
            objective: self.initial_cost,
            tour: Some(request.initial_tour.clone()),
            error: None,
            time_to_best: Duration::ZERO,
            improvements: 0,
        };
        for item in stream.by_ref() {
            match item {
                Ok(solution) => {
                    outcome.time_to_best = self.started.elapsed();
                    outcome.objective = unscale(solution.objective);
                    outcome.tour = Some(solution.tour);
                    outcome.improvements += 1;
                }
                Err(err) => return self.crash(&err),
            }
        }

        let Some(termination) = stream.termination() else {
            return self.crash(&crate::SolveError::EngineFailure {
                message: "solution stream ended without a termination status".to_owned(),
            });
        };
        let improved = outcome.improvements > 0;
        outcome.status =
            RunStatus::classify(termination == Termination::Closed, improved, false);
        log::info!(
            "{} finished: {} after {} improvements",
            solver.name(),
            outcome.status,
            outcome.improvements
        );
        outcome
    }

    /// Record a failure that ended the run.
    pub fn crash(self, error: &dyn Error) -> RunOutcome {
        log::warn!("run crashed: {error}");
        RunOutcome {
            status: RunStatus::Crashed,
            objective: self.initial_cost,
            tour: None,
            error: Some(error.to_string()),
            time_to_best: Duration::ZERO,
            improvements: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SolveError;
    use crate::test_support::{ScriptedSolver, line_instance};
    use rstest::{fixture, rstest};

    #[fixture]
    fn request() -> SolveRequest {
        let instance = line_instance(&[(0, 10_000); 4]).expect("instance");
        SolveRequest {
            initial_tour: Tour::from_visits(&[2, 1, 3], 4).expect("valid tour"),
            instance,
            time_limit: Duration::from_secs(1),
        }
    }

    #[rstest]
    #[case(false, false, false, "open (initial)")]
    #[case(false, true, false, "open (improved)")]
    #[case(true, false, false, "closed (initial)")]
    #[case(true, true, false, "closed (improved)")]
    #[case(true, true, true, "crashed")]
    #[case(false, false, true, "crashed")]
    fn classification_labels(
        #[case] closed: bool,
        #[case] improved: bool,
        #[case] crashed: bool,
        #[case] label: &str,
    ) {
        assert_eq!(RunStatus::classify(closed, improved, crashed).label(), label);
    }

    #[rstest]
    fn status_honours_width() {
        let status = RunStatus::Crashed;
        assert_eq!(format!("{status:>10}"), "   crashed");
    }

    #[rstest]
    fn closed_run_reports_last_objective(request: SolveRequest) {
        let solver = ScriptedSolver::closing_with(vec![7_000, 6_500]);
        let outcome = RunTracker::start(8.0).run(&solver, &request);
        assert_eq!(outcome.status, RunStatus::Closed { improved: true });
        assert!((outcome.objective - 6.5).abs() < f64::EPSILON);
        assert_eq!(outcome.improvements, 2);
        assert!(outcome.proven_optimal());
    }

    #[rstest]
    fn timed_out_run_without_improvement_keeps_seed(request: SolveRequest) {
        let solver = ScriptedSolver::timing_out_with(Vec::new());
        let outcome = RunTracker::start(8.0).run(&solver, &request);
        assert_eq!(outcome.status, RunStatus::Open { improved: false });
        assert!((outcome.objective - 8.0).abs() < f64::EPSILON);
        assert_eq!(outcome.tour.as_ref(), Some(&request.initial_tour));
        assert_eq!(outcome.time_to_best, Duration::ZERO);
    }

    #[rstest]
    fn stream_error_crashes_run(request: SolveRequest) {
        let error = SolveError::EngineFailure {
            message: "boom".to_owned(),
        };
        let solver = ScriptedSolver::failing_after(vec![7_000], error);
        let outcome = RunTracker::start(8.0).run(&solver, &request);
        assert!(outcome.crashed());
        assert!(outcome.tour.is_none());
        assert_eq!(outcome.error.as_deref(), Some("engine failure: boom"));
    }

    #[rstest]
    fn refused_request_crashes_run(request: SolveRequest) {
        let error = SolveError::Model {
            message: "empty domain".to_owned(),
        };
        let outcome = RunTracker::start(8.0).run(&ScriptedSolver::refusing(error), &request);
        assert!(outcome.crashed());
        assert!(!outcome.improved());
    }
}
