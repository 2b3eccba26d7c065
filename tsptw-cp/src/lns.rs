//! Large neighbourhood search hooks.

use std::fmt;

use crate::{Assignment, Contradiction, Store};

/// Chooses which variables to freeze at each restart.
///
/// The search hands every solution it finds to
/// [`record_solution`](Self::record_solution). On restart it calls
/// [`fix_some_variables`](Self::fix_some_variables) on a fresh copy of the
/// root domains; variables left untouched form the neighbourhood the next
/// descent explores.
pub trait Neighborhood: fmt::Debug + Send {
    /// Remember `solution` as the incumbent to freeze around.
    fn record_solution(&mut self, solution: &Assignment);

    /// Freeze part of the incumbent into `store`.
    ///
    /// Returns `Ok(false)` when nothing was frozen, in which case the search
    /// explores the full space and an exhausted descent proves optimality.
    fn fix_some_variables(&mut self, store: &mut Store) -> Result<bool, Contradiction>;
}
