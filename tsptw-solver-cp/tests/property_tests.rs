//! Property-based tests for the CP-LNS solver.
//!
//! # Invariants tested
//!
//! - **Tour validity:** every reported tour is a permutation of the nodes
//!   with the depot first.
//! - **Monotonicity:** objectives strictly decrease and start below the seed.
//! - **Feasibility:** every reported tour meets all windows and costs exactly
//!   its objective.
//! - **Complete windows:** a window as long as the tour yields the same
//!   solution sequence as a search with no neighbourhood.

use std::num::NonZeroUsize;
use std::time::Duration;

use proptest::prelude::*;
use tsptw_core::test_support::random_instance;
use tsptw_core::{SolveRequest, Solver, Termination};
use tsptw_cp::Search;
use tsptw_solver_cp::{CpLnsConfig, CpLnsSolver, TsptwModel};

fn solver(window: usize, seed: u64) -> Result<CpLnsSolver, TestCaseError> {
    let window_size =
        NonZeroUsize::new(window).ok_or_else(|| TestCaseError::fail("window must be positive"))?;
    Ok(CpLnsSolver::with_config(CpLnsConfig {
        window_size,
        seed,
        ..CpLnsConfig::default()
    }))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Property: reported tours are valid, feasible and strictly improving.
    #[test]
    fn reported_tours_improve_and_stay_feasible(
        node_count in 3_usize..10,
        instance_seed in any::<u64>(),
        window in 1_usize..5,
        search_seed in any::<u64>(),
    ) {
        let (instance, initial_tour) = random_instance(node_count, instance_seed)
            .ok_or_else(|| TestCaseError::fail("instance generation failed"))?;
        let bound = instance
            .evaluate(&initial_tour)
            .map_err(|err| TestCaseError::fail(err.to_string()))?
            .cost;
        let request = SolveRequest {
            instance,
            initial_tour,
            time_limit: Duration::from_millis(100),
        };
        let solver = solver(window, search_seed)?;
        let mut stream = solver
            .solve(&request)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;

        let mut previous = bound;
        for item in stream.by_ref() {
            let solution = item.map_err(|err| TestCaseError::fail(err.to_string()))?;
            prop_assert_eq!(solution.tour.nodes().first(), Some(&0));
            let mut nodes = solution.tour.nodes().to_vec();
            nodes.sort_unstable();
            prop_assert_eq!(nodes, (0..node_count).collect::<Vec<_>>());

            let evaluation = request
                .instance
                .evaluate(&solution.tour)
                .map_err(|err| TestCaseError::fail(err.to_string()))?;
            prop_assert!(evaluation.is_feasible());
            prop_assert_eq!(evaluation.cost, solution.objective);
            prop_assert!(solution.objective < previous);
            previous = solution.objective;
        }
        prop_assert!(stream.termination().is_some());
    }

    /// Property: a window covering the tour behaves like plain search.
    #[test]
    fn complete_window_matches_unrestricted_search(
        node_count in 3_usize..7,
        instance_seed in any::<u64>(),
        extra in 0_usize..3,
    ) {
        let (instance, initial_tour) = random_instance(node_count, instance_seed)
            .ok_or_else(|| TestCaseError::fail("instance generation failed"))?;
        let bound = instance
            .evaluate(&initial_tour)
            .map_err(|err| TestCaseError::fail(err.to_string()))?
            .cost;
        prop_assume!(bound > 0);

        let TsptwModel { model, vars } = TsptwModel::build(&instance, bound)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        let unrestricted: Vec<(Vec<usize>, i64)> = Search::new(model)
            .with_decision_groups(vars.decision_groups())
            .filter_map(|solution| Some((vars.decode(&solution)?, vars.objective(&solution)?)))
            .collect();

        let request = SolveRequest {
            instance,
            initial_tour,
            time_limit: Duration::from_secs(30),
        };
        let solver = solver(node_count + extra, 31)?;
        let mut stream = solver
            .solve(&request)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        let mut windowed = Vec::new();
        for item in stream.by_ref() {
            let solution = item.map_err(|err| TestCaseError::fail(err.to_string()))?;
            windowed.push((solution.tour.nodes().to_vec(), solution.objective));
        }

        prop_assert_eq!(windowed, unrestricted);
        prop_assert_eq!(stream.termination(), Some(Termination::Closed));
    }
}
