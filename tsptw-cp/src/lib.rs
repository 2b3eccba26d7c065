//! A small finite-domain constraint solver.
//!
//! Integer variables live in a [`Store`]; a [`Model`] owns the root domains
//! and the propagators posted over them. [`Search`] explores the model
//! depth first, tightening the objective after every solution, and can hand
//! its restarts to a [`Neighborhood`] to run large neighbourhood search.
//!
//! Only the constraints needed for sequencing problems are provided:
//! all-different, one- and two-dimensional element, precedence with a
//! variable offset, and linear sums.

#![forbid(unsafe_code)]

pub mod constraint;
mod domain;
mod error;
mod lns;
mod model;
mod search;
mod store;

pub use domain::{Domain, DomainIter};
pub use error::{Contradiction, ModelError};
pub use lns::Neighborhood;
pub use model::Model;
pub use search::{Assignment, Search, SearchLimits, SearchStats, SearchStatus};
pub use store::{Store, VarId};
