//! Core domain types for the TSPTW optimizer.
//!
//! These models provide basic validation to keep downstream components
//! honest. Constructors return `Result` to surface invalid input early, so a
//! solver can assume every [`Instance`] is square and every [`Tour`] is a
//! permutation starting at the depot.
//!
//! All times and costs are integers in a fixed precision unit: real-valued
//! input is multiplied by [`PRECISION`] and rounded (see [`scale`]).

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod instance;
pub mod outcome;
pub mod parse;
pub mod report;
#[cfg(feature = "seed-search")]
#[cfg_attr(docsrs, doc(cfg(feature = "seed-search")))]
pub mod seed_search;
pub mod solver;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;
pub mod time_window;
pub mod tour;

pub use instance::{DistanceMatrix, Instance, InstanceError, Reordered, TourEvaluation};
pub use outcome::{RunOutcome, RunStatus, RunTracker};
pub use parse::{PRECISION, ParseError, parse_instance, scale, unscale};
pub use report::{ReportLine, instance_name};
#[cfg(feature = "seed-search")]
pub use seed_search::{SeedSearch, SeedSearchError};
pub use solver::{SolutionStream, SolveError, SolveRequest, Solution, Solver, Termination};
pub use time_window::{TimeWindow, TimeWindowError};
pub use tour::{Tour, TourError};
