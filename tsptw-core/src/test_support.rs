//! Small instance builders and a scripted [`Solver`] for unit and behaviour
//! tests.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    Instance, InstanceError, Solution, SolutionStream, SolveError, SolveRequest, Solver,
    Termination, TimeWindow, Tour,
};

/// Build an instance whose nodes sit on a line at unit spacing.
///
/// Node `i` is at coordinate `i`, so the distance between `i` and `j` is
/// `|i - j|`. Windows are taken verbatim from `windows`; inverted pairs are
/// clamped to a single instant at `earliest`.
///
/// # Examples
/// ```
/// use tsptw_core::test_support::line_instance;
///
/// let instance = line_instance(&[(0, 10), (0, 10), (0, 10)]).expect("non-empty");
/// assert_eq!(instance.distance(0, 2), Some(2));
/// ```
pub fn line_instance(windows: &[(i64, i64)]) -> Result<Instance, InstanceError> {
    let node_count = windows.len();
    let distances = (0..node_count)
        .map(|from| {
            (0..node_count)
                .map(|to| i64::try_from(from.abs_diff(to)).unwrap_or(i64::MAX))
                .collect()
        })
        .collect();
    let windows = windows
        .iter()
        .filter_map(|&(earliest, latest)| TimeWindow::new(earliest, latest.max(earliest)).ok())
        .collect();
    Instance::new(distances, windows)
}

/// Build an instance where every node shares the window `[0, horizon]`.
pub fn open_instance(distances: Vec<Vec<i64>>, horizon: i64) -> Result<Instance, InstanceError> {
    let windows = TimeWindow::new(0, horizon.max(0))
        .map(|window| vec![window; distances.len()])
        .unwrap_or_default();
    Instance::new(distances, windows)
}

/// Build a random instance together with a feasible seed tour.
///
/// Nodes are scattered on a 100 x 100 grid with Manhattan travel costs. The
/// seed visits them in a shuffled order and every window is placed around
/// the seed's arrival time, so the seed is always feasible while other
/// orders may be cheaper. The same `seed` always yields the same pair.
/// Returns `None` only when `node_count` is zero.
///
/// # Examples
/// ```
/// use tsptw_core::test_support::random_instance;
///
/// let (instance, tour) = random_instance(6, 7).expect("non-empty");
/// let evaluation = instance.evaluate(&tour).expect("matching sizes");
/// assert!(evaluation.is_feasible());
/// ```
#[must_use]
pub fn random_instance(node_count: usize, seed: u64) -> Option<(Instance, Tour)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let points: Vec<(i64, i64)> = (0..node_count)
        .map(|_| (rng.gen_range(0..100), rng.gen_range(0..100)))
        .collect();
    let distances: Vec<Vec<i64>> = points
        .iter()
        .map(|&(ax, ay)| {
            points
                .iter()
                .map(|&(bx, by)| (ax - bx).abs() + (ay - by).abs())
                .collect()
        })
        .collect();
    let mut visits: Vec<usize> = (1..node_count).collect();
    visits.shuffle(&mut rng);

    let mut windows: Vec<Option<TimeWindow>> = vec![None; node_count];
    let mut time = 0_i64;
    let mut previous = Instance::DEPOT;
    for &node in &visits {
        time += distances.get(previous)?.get(node)?;
        let earliest = (time - rng.gen_range(0..=20)).max(0);
        let latest = time + rng.gen_range(0..=40);
        *windows.get_mut(node)? = TimeWindow::new(earliest, latest).ok();
        previous = node;
    }
    *windows.get_mut(Instance::DEPOT)? = TimeWindow::new(0, time + 100).ok();
    let windows = windows.into_iter().collect::<Option<Vec<_>>>()?;

    let instance = Instance::new(distances, windows).ok()?;
    let tour = Tour::from_visits(&visits, node_count).ok()?;
    Some((instance, tour))
}

/// A [`Solver`] that replays a fixed list of objectives.
///
/// Each objective is reported with the request's initial tour. After the
/// script runs out the stream either fails or terminates as configured.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSolver {
    objectives: Vec<i64>,
    failure: Option<SolveError>,
    termination: Option<Termination>,
    refusal: Option<SolveError>,
}

impl ScriptedSolver {
    /// Replay `objectives`, then report a closed search.
    #[must_use]
    pub fn closing_with(objectives: Vec<i64>) -> Self {
        Self {
            objectives,
            termination: Some(Termination::Closed),
            ..Self::default()
        }
    }

    /// Replay `objectives`, then report a timeout.
    #[must_use]
    pub fn timing_out_with(objectives: Vec<i64>) -> Self {
        Self {
            objectives,
            termination: Some(Termination::TimedOut),
            ..Self::default()
        }
    }

    /// Replay `objectives`, then yield `error`.
    #[must_use]
    pub fn failing_after(objectives: Vec<i64>, error: SolveError) -> Self {
        Self {
            objectives,
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Reject every request with `error`.
    #[must_use]
    pub fn refusing(error: SolveError) -> Self {
        Self {
            refusal: Some(error),
            ..Self::default()
        }
    }
}

impl Solver for ScriptedSolver {
    fn name(&self) -> &str {
        "scripted"
    }

    fn solve<'a>(
        &'a self,
        request: &'a SolveRequest,
    ) -> Result<Box<dyn SolutionStream + 'a>, SolveError> {
        if let Some(error) = &self.refusal {
            return Err(error.clone());
        }
        let mut items: Vec<Result<Solution, SolveError>> = self
            .objectives
            .iter()
            .map(|&objective| {
                Ok(Solution {
                    tour: request.initial_tour.clone(),
                    objective,
                })
            })
            .collect();
        items.extend(self.failure.clone().map(Err));
        Ok(Box::new(ScriptedStream {
            items: items.into_iter(),
            termination: self.termination,
            finished: false,
        }))
    }
}

#[derive(Debug)]
struct ScriptedStream {
    items: std::vec::IntoIter<Result<Solution, SolveError>>,
    termination: Option<Termination>,
    finished: bool,
}

impl Iterator for ScriptedStream {
    type Item = Result<Solution, SolveError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.items.next();
        self.finished = item.is_none();
        item
    }
}

impl SolutionStream for ScriptedStream {
    fn termination(&self) -> Option<Termination> {
        self.termination.filter(|_| self.finished)
    }
}
