//! Constraint propagators.
//!
//! A [`Propagator`] narrows domains in a [`Store`] until its constraint is
//! locally consistent or a domain empties. The [`Model`](crate::Model) wakes
//! a propagator whenever one of its [`variables`](Propagator::variables)
//! changes, so implementations need not reach a fixpoint on their own.

mod all_different;
mod element;
mod linear;

pub use all_different::AllDifferent;
pub use element::{Element, Element2d};
pub use linear::{LessOrEqual, PlusLessOrEqual, SumEquals};

use std::fmt;

use crate::{Contradiction, Store, VarId};

/// Domain filtering for one constraint.
pub trait Propagator: fmt::Debug + Send {
    /// Variables whose changes should wake this propagator.
    fn variables(&self) -> Vec<VarId>;

    /// Narrow the domains of [`variables`](Self::variables).
    ///
    /// Returns [`Contradiction`] when no assignment can satisfy the
    /// constraint.
    fn propagate(&self, store: &mut Store) -> Result<(), Contradiction>;
}
