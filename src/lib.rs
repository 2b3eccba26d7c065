//! Facade crate for the TSPTW anytime optimizer.
//!
//! This crate re-exports the core domain types, the seed tour search behind
//! the `seed-search` feature and the constraint-programming solver behind the
//! `solver-cp` feature.
//!
//! # Examples
//! ```
//! # #[cfg(feature = "solver-cp")]
//! # {
//! use std::time::Duration;
//! use tsptw_lns::{CpLnsSolver, RunStatus, RunTracker, SolveRequest, Tour};
//!
//! let instance = "3\n0 1 1\n1 0 1\n1 1 0\n0 100\n0 100\n0 100\n"
//!     .parse()
//!     .expect("valid instance");
//! let request = SolveRequest {
//!     initial_tour: Tour::from_visits(&[1, 2], 3).expect("valid tour"),
//!     instance,
//!     time_limit: Duration::from_secs(1),
//! };
//! let outcome = RunTracker::start(3.0).run(&CpLnsSolver::default(), &request);
//! assert_eq!(outcome.status, RunStatus::Closed { improved: false });
//! # }
//! ```

#![forbid(unsafe_code)]

pub use tsptw_core::{
    Instance, InstanceError, ParseError, ReportLine, RunOutcome, RunStatus, RunTracker,
    SolutionStream, Solution, SolveError, SolveRequest, Solver, Termination, TimeWindow, Tour,
    TourEvaluation, parse_instance,
};

#[cfg(feature = "seed-search")]
pub use tsptw_core::{SeedSearch, SeedSearchError};

#[cfg(feature = "solver-cp")]
pub use tsptw_solver_cp::{CpLnsConfig, CpLnsSolver};
