//! Command-line interface for the TSPTW optimizer.
//!
//! `tsptw find` builds a feasible seed tour, `tsptw solve` improves it within
//! a time budget and prints a one-line report, and `tsptw check` evaluates a
//! tour. Options layer
//! from configuration files, `TSPTW_*` environment variables and flags
//! through `ortho_config`, flags winning.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod check;
mod error;
mod find;
mod input;
mod solve;

pub use error::CliError;

use check::CheckArgs;
use find::FindArgs;
use solve::SolveArgs;

pub(crate) const ARG_INSTANCE: &str = "instance";
pub(crate) const ARG_TOUR: &str = "tour";
pub(crate) const ARG_COST: &str = "cost";
pub(crate) const ARG_TIME_LIMIT: &str = "time-limit";
pub(crate) const ARG_WINDOW_SIZE: &str = "window-size";
pub(crate) const ARG_FAIL_LIMIT: &str = "fail-limit";
pub(crate) const ARG_SEED: &str = "seed";
pub(crate) const ARG_LEVEL_MAX: &str = "level-max";
pub(crate) const ARG_VERBOSE: &str = "verbose";
pub(crate) const ARG_FORMAT: &str = "format";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ENV_SOLVE_INSTANCE: &str = "TSPTW_CMDS_SOLVE_INSTANCE";
pub(crate) const ENV_SOLVE_TOUR: &str = "TSPTW_CMDS_SOLVE_TOUR";
pub(crate) const ENV_SOLVE_COST: &str = "TSPTW_CMDS_SOLVE_COST";
pub(crate) const ENV_CHECK_INSTANCE: &str = "TSPTW_CMDS_CHECK_INSTANCE";
pub(crate) const ENV_CHECK_TOUR: &str = "TSPTW_CMDS_CHECK_TOUR";
pub(crate) const ENV_FIND_INSTANCE: &str = "TSPTW_CMDS_FIND_INSTANCE";

/// Run the TSPTW CLI with the current process arguments and environment,
/// writing results to standard output.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Solve(args) => solve::run_solve(args, &mut stdout).map(|_| ()),
        Command::Check(args) => check::run_check(args, &mut stdout),
        Command::Find(args) => find::run_find(args, &mut stdout),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "tsptw",
    about = "Anytime optimizer for the travelling salesman problem with time windows",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Improve a feasible tour within a time budget.
    Solve(SolveArgs),
    /// Evaluate the cost and lateness of a tour.
    Check(CheckArgs),
    /// Build a feasible seed tour.
    Find(FindArgs),
}

#[cfg(test)]
mod tests;
