//! Constraint-programming TSPTW solver with large neighbourhood search.
//!
//! This crate provides [`CpLnsSolver`], the default implementation of the
//! [`Solver`](tsptw_core::Solver) trait. It posts the instance onto the
//! `tsptw-cp` engine as a sequencing model ([`TsptwModel`]), loads the seed
//! tour as warm start and lets [`ConsecutiveNeighborhood`] pick which run of
//! positions to re-optimize at every restart.
//!
//! The stream it returns is lazy: the engine only searches while the caller
//! asks for the next improvement.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod model;
mod neighborhood;
mod solver;

pub use model::{TsptwModel, TsptwVars};
pub use neighborhood::ConsecutiveNeighborhood;
pub use solver::{CpLnsConfig, CpLnsSolver};
