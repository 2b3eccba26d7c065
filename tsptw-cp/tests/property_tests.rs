//! Property-based tests for the branch-and-bound engine.
//!
//! Each case is a small assignment problem: `n` variables with domains
//! `0..n`, pairwise different, each paying a cost from its own table row.
//!
//! # Invariants tested
//!
//! - **Feasibility:** every solution assigns distinct values and its total
//!   equals the summed table entries.
//! - **Monotonicity:** successive objectives strictly decrease.
//! - **Optimality:** an exhausted search ends at the brute-force optimum.

use proptest::prelude::*;
use tsptw_cp::{Assignment, Model, ModelError, Search, SearchStatus, VarId};

struct Problem {
    model: Model,
    choices: Vec<VarId>,
    total: VarId,
}

fn assignment_problem(costs: &[Vec<i64>]) -> Result<Problem, ModelError> {
    let size = i64::try_from(costs.len()).unwrap_or(i64::MAX);
    let mut model = Model::new();
    let mut choices = Vec::with_capacity(costs.len());
    let mut paid = Vec::with_capacity(costs.len());
    for (index, row) in costs.iter().enumerate() {
        let choice = model.enum_var(format!("x{index}"), 0, size - 1)?;
        let cost = model.int_var(format!("c{index}"), 0, 9)?;
        model.element(choice, row.clone(), cost)?;
        choices.push(choice);
        paid.push(cost);
    }
    model.all_different(&choices)?;
    let total = model.int_var("total", 0, 9 * size)?;
    model.sum(&paid, total)?;
    model.minimize(total)?;
    Ok(Problem {
        model,
        choices,
        total,
    })
}

fn permutations(size: usize) -> Vec<Vec<usize>> {
    if size == 0 {
        return vec![Vec::new()];
    }
    let mut all = Vec::new();
    for shorter in permutations(size - 1) {
        for slot in 0..size {
            let mut longer = shorter.clone();
            longer.insert(slot, size - 1);
            all.push(longer);
        }
    }
    all
}

fn table_cost(costs: &[Vec<i64>], values: &[usize]) -> Option<i64> {
    costs
        .iter()
        .zip(values)
        .map(|(row, &value)| row.get(value).copied())
        .sum()
}

fn brute_force(costs: &[Vec<i64>]) -> Option<i64> {
    permutations(costs.len())
        .iter()
        .filter_map(|values| table_cost(costs, values))
        .min()
}

fn values(solution: &Assignment, vars: &[VarId]) -> Option<Vec<usize>> {
    vars.iter()
        .map(|&var| solution.value(var).and_then(|value| usize::try_from(value).ok()))
        .collect()
}

fn cost_tables() -> impl Strategy<Value = Vec<Vec<i64>>> {
    (2_usize..=5).prop_flat_map(|size| {
        prop::collection::vec(prop::collection::vec(0_i64..10, size), size)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Property: solutions are feasible, strictly improving and end at the
    /// optimum.
    #[test]
    fn search_reaches_the_brute_force_optimum(costs in cost_tables()) {
        let Problem { model, choices, total } = assignment_problem(&costs)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        let mut search = Search::new(model).with_decision_groups(vec![choices.clone()]);

        let mut previous = None;
        for solution in search.by_ref() {
            let chosen = values(&solution, &choices)
                .ok_or_else(|| TestCaseError::fail("solution leaves a choice unfixed"))?;
            let mut distinct = chosen.clone();
            distinct.sort_unstable();
            distinct.dedup();
            prop_assert_eq!(distinct.len(), chosen.len());

            let objective = solution.value(total);
            prop_assert_eq!(objective, table_cost(&costs, &chosen));
            if let (Some(before), Some(now)) = (previous, objective) {
                prop_assert!(now < before);
            }
            previous = objective;
        }

        prop_assert_eq!(search.status(), SearchStatus::Exhausted);
        prop_assert_eq!(previous, brute_force(&costs));
        prop_assert_eq!(search.best(), previous);
    }
}
