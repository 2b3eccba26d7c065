//! Shared test harness modules for the TSPTW CLI.

use super::*;

mod helpers;
mod solve_steps;
