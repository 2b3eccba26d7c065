//! Randomised search for a feasible seed tour.
//!
//! The optimizer needs a tour that already respects every window. This
//! module builds one: a random order of the customers is repaired with
//! or-opt-1 moves that slide late nodes earlier or later while total
//! lateness drops. When the moves stall the order is shaken with a growing
//! number of random swaps, and after `level_max` fruitless shakes the search
//! starts over from a fresh shuffle.

use std::time::Instant;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::{Instance, Tour, TourError};

/// Parameters of the seed search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSearch {
    /// Seed of the shuffling generator.
    pub seed: u64,
    /// Largest shake, in random swaps, tried before reshuffling.
    pub level_max: usize,
}

impl Default for SeedSearch {
    fn default() -> Self {
        Self {
            seed: 20_211_215,
            level_max: 8,
        }
    }
}

/// Errors returned by [`SeedSearch::find`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeedSearchError {
    /// Tours leave the depot at time 0, which its window excludes.
    #[error("depot window [{earliest}, {latest}] excludes departure at time 0")]
    DepotClosed {
        /// Opening time of the depot.
        earliest: i64,
        /// Closing time of the depot.
        latest: i64,
    },
    /// The deadline passed before any order met every window.
    #[error("no feasible tour found in time (least lateness {violation})")]
    TimedOut {
        /// Smallest total lateness reached.
        violation: i64,
    },
    /// The order found could not be turned into a tour.
    #[error(transparent)]
    Tour(#[from] TourError),
}

impl SeedSearch {
    /// Search `instance` for a tour without lateness.
    ///
    /// With no `deadline` the search runs until it succeeds, which never
    /// happens on an infeasible instance.
    ///
    /// # Examples
    /// ```
    /// use tsptw_core::{Instance, SeedSearch, TimeWindow};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// // Nodes on a line, each closing one unit after the previous one.
    /// let distances = vec![
    ///     vec![0, 1, 2, 3],
    ///     vec![1, 0, 1, 2],
    ///     vec![2, 1, 0, 1],
    ///     vec![3, 2, 1, 0],
    /// ];
    /// let windows = [100, 1, 2, 3]
    ///     .into_iter()
    ///     .map(|latest| TimeWindow::new(0, latest))
    ///     .collect::<Result<Vec<_>, _>>()?;
    /// let instance = Instance::new(distances, windows)?;
    /// let tour = SeedSearch::default().find(&instance, None)?;
    /// assert_eq!(tour.visits(), &[1, 2, 3]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn find(
        &self,
        instance: &Instance,
        deadline: Option<Instant>,
    ) -> Result<Tour, SeedSearchError> {
        if let Some(depot) = instance.time_window(Instance::DEPOT)
            && !depot.contains(0)
        {
            return Err(SeedSearchError::DepotClosed {
                earliest: depot.earliest(),
                latest: depot.latest(),
            });
        }

        let repair = Repair::new(instance);
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut visits: Vec<usize> = (1..instance.node_count()).collect();
        let mut least = i64::MAX;
        let mut shuffles = 0_u64;
        loop {
            visits.shuffle(&mut rng);
            let mut score = repair.descend(&mut visits);
            let mut level = 1;
            while score.violation > 0 && level <= self.level_max && !expired(deadline) {
                let mut candidate = visits.clone();
                shake(&mut rng, &mut candidate, level);
                let shaken = repair.descend(&mut candidate);
                if shaken.beats(score) {
                    visits = candidate;
                    score = shaken;
                    level = 1;
                } else {
                    level += 1;
                }
            }

            if score.violation == 0 {
                log::debug!(
                    "feasible seed of cost {} after {shuffles} reshuffles",
                    score.cost
                );
                return Ok(Tour::from_visits(&visits, instance.node_count())?);
            }
            least = least.min(score.violation);
            if expired(deadline) {
                return Err(SeedSearchError::TimedOut { violation: least });
            }
            shuffles += 1;
            log::trace!("reshuffling; lateness stuck at {}", score.violation);
        }
    }
}

fn expired(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|deadline| Instant::now() >= deadline)
}

/// Swap `level` random pairs.
fn shake(rng: &mut ChaCha8Rng, visits: &mut [usize], level: usize) {
    if visits.len() < 2 {
        return;
    }
    for _ in 0..level {
        let first = rng.gen_range(0..visits.len());
        let second = rng.gen_range(0..visits.len());
        visits.swap(first, second);
    }
}

/// Lateness first, then cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Score {
    violation: i64,
    cost: i64,
}

impl Score {
    fn beats(self, other: Self) -> bool {
        (self.violation, self.cost) < (other.violation, other.cost)
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Earlier,
    Later,
}

/// Or-opt-1 repair of customer orders.
#[derive(Debug)]
struct Repair<'a> {
    instance: &'a Instance,
    /// `must_precede[x][y]`: leaving `y` at its opening already misses `x`,
    /// so `x` has to come before `y`.
    must_precede: Vec<Vec<bool>>,
}

impl<'a> Repair<'a> {
    fn new(instance: &'a Instance) -> Self {
        let windows = instance.time_windows();
        let must_precede = windows
            .iter()
            .enumerate()
            .map(|(x, late_side)| {
                windows
                    .iter()
                    .enumerate()
                    .map(|(y, early_side)| {
                        x != y
                            && instance.distance(y, x).is_some_and(|travel| {
                                early_side.earliest().saturating_add(travel) > late_side.latest()
                            })
                    })
                    .collect()
            })
            .collect();
        Self {
            instance,
            must_precede,
        }
    }

    fn must_precede(&self, x: usize, y: usize) -> bool {
        self.must_precede
            .get(x)
            .and_then(|row| row.get(y))
            .copied()
            .unwrap_or(false)
    }

    /// Walk the tour `0, visits.., 0`, reporting each late customer.
    fn walk(&self, visits: &[usize], mut on_late: impl FnMut(usize)) -> Score {
        let mut score = Score {
            violation: 0,
            cost: 0,
        };
        let mut time = 0_i64;
        let mut previous = Instance::DEPOT;
        for &node in visits {
            let (Some(travel), Some(window)) = (
                self.instance.distance(previous, node),
                self.instance.time_window(node),
            ) else {
                continue;
            };
            score.cost = score.cost.saturating_add(travel);
            time = time.saturating_add(travel).max(window.earliest());
            let lateness = time.saturating_sub(window.latest());
            if lateness > 0 {
                score.violation = score.violation.saturating_add(lateness);
                on_late(node);
            }
            previous = node;
        }
        let closing = self
            .instance
            .distance(previous, Instance::DEPOT)
            .unwrap_or_default();
        score.cost = score.cost.saturating_add(closing);
        score
    }

    fn score(&self, visits: &[usize]) -> Score {
        self.walk(visits, |_| {})
    }

    /// Apply improving passes until lateness stops dropping.
    fn descend(&self, visits: &mut Vec<usize>) -> Score {
        let mut score = self.score(visits);
        while let Some(improved) = self.improve(visits, score) {
            score = improved;
        }
        score
    }

    /// One pass over the customers that are late at its start.
    fn improve(&self, visits: &mut Vec<usize>, score: Score) -> Option<Score> {
        let mut late = Vec::new();
        self.walk(visits, |node| late.push(node));

        let mut best = score;
        let mut improved = false;
        for node in late {
            for direction in [Direction::Earlier, Direction::Later] {
                let mut candidate = visits.clone();
                if let Some(moved) = self.shift(&mut candidate, node, direction, best) {
                    *visits = candidate;
                    best = moved;
                    improved = true;
                }
            }
        }
        improved.then_some(best)
    }

    /// Slide `node` one step at a time until a precedence forbids it,
    /// keeping the least late arrangement seen.
    fn shift(
        &self,
        visits: &mut Vec<usize>,
        node: usize,
        direction: Direction,
        baseline: Score,
    ) -> Option<Score> {
        let start = visits.iter().position(|&visited| visited == node)?;
        let mut best: Option<(Score, Vec<usize>)> = None;
        let mut position = start;
        loop {
            let next = match direction {
                Direction::Earlier => position.checked_sub(1),
                Direction::Later => position.checked_add(1),
            };
            let Some((next, &neighbour)) = next.and_then(|next| Some((next, visits.get(next)?)))
            else {
                break;
            };
            let blocked = match direction {
                Direction::Earlier => self.must_precede(neighbour, node),
                Direction::Later => self.must_precede(node, neighbour),
            };
            if blocked {
                break;
            }
            visits.swap(position, next);
            position = next;
            let score = self.score(visits);
            let threshold = best.as_ref().map_or(baseline, |(kept, _)| *kept);
            if score.violation < threshold.violation {
                best = Some((score, visits.clone()));
            }
        }
        let (score, arrangement) = best?;
        *visits = arrangement;
        Some(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{line_instance, random_instance};
    use rstest::rstest;
    use std::time::Duration;

    fn soon() -> Option<Instant> {
        Instant::now().checked_add(Duration::from_secs(10))
    }

    #[rstest]
    fn staircase_windows_admit_one_order() {
        let instance =
            line_instance(&[(0, 100), (0, 1), (0, 2), (0, 3), (0, 4)]).expect("instance");
        let tour = SeedSearch::default()
            .find(&instance, soon())
            .expect("feasible order");
        assert_eq!(tour.visits(), &[1, 2, 3, 4]);
    }

    #[rstest]
    #[case(3)]
    #[case(17)]
    #[case(29)]
    fn random_instances_get_a_feasible_seed(#[case] seed: u64) {
        let (instance, _) = random_instance(10, seed).expect("instance");
        let tour = SeedSearch::default()
            .find(&instance, soon())
            .expect("feasible order");
        let evaluation = instance.evaluate(&tour).expect("sizes match");
        assert!(evaluation.is_feasible(), "late tour {tour}");
    }

    #[rstest]
    fn same_seed_finds_the_same_tour() {
        let (instance, _) = random_instance(12, 8).expect("instance");
        let search = SeedSearch {
            seed: 5,
            level_max: 4,
        };
        let first = search.find(&instance, soon()).expect("feasible order");
        let second = search.find(&instance, soon()).expect("feasible order");
        assert_eq!(first, second);
    }

    #[rstest]
    fn depot_closed_at_departure_is_rejected() {
        let instance = line_instance(&[(5, 10), (0, 100)]).expect("instance");
        assert_eq!(
            SeedSearch::default().find(&instance, soon()),
            Err(SeedSearchError::DepotClosed {
                earliest: 5,
                latest: 10
            })
        );
    }

    #[rstest]
    fn infeasible_instance_times_out_with_least_lateness() {
        // Both customers close at 1; whichever comes second is late.
        let instance = line_instance(&[(0, 100), (0, 1), (0, 1)]).expect("instance");
        let err = SeedSearch::default()
            .find(&instance, Some(Instant::now()))
            .expect_err("no feasible order");
        assert_eq!(err, SeedSearchError::TimedOut { violation: 1 });
    }

    #[rstest]
    #[case(4)]
    #[case(9)]
    fn walk_agrees_with_tour_evaluation(#[case] seed: u64) {
        let (instance, tour) = random_instance(10, seed).expect("instance");
        let mut visits = tour.visits().to_vec();
        visits.reverse();
        let reversed = Tour::from_visits(&visits, instance.node_count()).expect("valid tour");
        let evaluation = instance.evaluate(&reversed).expect("sizes match");

        let score = Repair::new(&instance).score(&visits);
        assert_eq!(score.cost, evaluation.cost);
        assert_eq!(score.violation, evaluation.violation);
    }

    #[rstest]
    fn precedence_follows_window_reachability() {
        // From node 2 at its opening (0) node 1 is reached at 1 > 0.
        let instance = line_instance(&[(0, 100), (0, 0), (0, 100)]).expect("instance");
        let repair = Repair::new(&instance);
        assert!(repair.must_precede(1, 2));
        assert!(!repair.must_precede(2, 1));
        assert!(!repair.must_precede(1, 1));
    }
}
