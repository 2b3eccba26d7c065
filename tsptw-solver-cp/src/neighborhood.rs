//! Windowed relaxation of the incumbent tour.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tsptw_cp::{Assignment, Contradiction, Neighborhood, Store, VarId};

/// Frees a random run of consecutive positions and freezes the rest.
///
/// Each restart draws a start position `s` uniformly from `[0, n)` and fixes
/// every position outside `[s, s + window)` to the node it holds in the
/// incumbent. A window at least as long as the tour never freezes anything,
/// so the search it drives is complete.
///
/// The generator is owned by the neighbourhood; equal seeds replay equal
/// window sequences.
#[derive(Debug, Clone)]
pub struct ConsecutiveNeighborhood {
    positions: Vec<VarId>,
    window: usize,
    rng: ChaCha8Rng,
    incumbent: Vec<Option<i64>>,
}

impl ConsecutiveNeighborhood {
    /// Relax `window` consecutive `positions` at a time.
    #[must_use]
    pub fn new(positions: Vec<VarId>, window: usize, seed: u64) -> Self {
        Self {
            incumbent: vec![None; positions.len()],
            positions,
            window,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Whether the window covers the whole tour.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.window >= self.positions.len()
    }

    /// Draw the first free position of the next window.
    fn draw_start(&mut self) -> usize {
        self.rng.gen_range(0..self.positions.len())
    }
}

impl Neighborhood for ConsecutiveNeighborhood {
    fn record_solution(&mut self, solution: &Assignment) {
        self.incumbent = self
            .positions
            .iter()
            .map(|&var| solution.value(var))
            .collect();
    }

    fn fix_some_variables(&mut self, store: &mut Store) -> Result<bool, Contradiction> {
        if self.is_complete() || self.incumbent.iter().any(Option::is_none) {
            return Ok(false);
        }
        let start = self.draw_start();
        let end = start.saturating_add(self.window);
        log::trace!("relaxing positions {start}..{end}");
        for (position, (&var, slot)) in self.positions.iter().zip(&self.incumbent).enumerate() {
            if let Some(value) = *slot
                && !(start..end).contains(&position)
            {
                store.fix(var, value)?;
            }
        }
        Ok(true)
    }
}
