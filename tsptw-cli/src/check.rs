//! Check command: evaluate a tour without optimizing it.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use tsptw_core::{Instance, Tour, TourEvaluation, unscale};

use crate::input::{load_instance, parse_visits, require_existing};
use crate::{ARG_INSTANCE, ARG_TOUR, ARG_VERBOSE, CliError, ENV_CHECK_INSTANCE, ENV_CHECK_TOUR};

/// CLI arguments for the `check` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "check",
    long_about = "Print the cost and total lateness of a tour. The return to \
                 the depot adds cost but is not checked against the depot's \
                 window, matching what `solve` optimizes.",
    about = "Print the cost and total lateness of a tour"
)]
#[ortho_config(prefix = "TSPTW")]
pub(crate) struct CheckArgs {
    /// Path to the instance file.
    #[arg(short = 'f', long = ARG_INSTANCE, value_name = "path")]
    #[serde(default)]
    pub(crate) instance: Option<Utf8PathBuf>,
    /// Tour without the leading depot, e.g. "2 1 3".
    #[arg(short = 's', long = ARG_TOUR, value_name = "nodes")]
    #[serde(default)]
    pub(crate) tour: Option<String>,
    /// Print the arrival time at every customer before the totals.
    #[arg(short = 'v', long = ARG_VERBOSE)]
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CheckConfig {
    pub(crate) instance: Utf8PathBuf,
    pub(crate) visits: Vec<usize>,
    pub(crate) verbose: bool,
}

impl CheckConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.instance, ARG_INSTANCE)
    }
}

impl TryFrom<CheckArgs> for CheckConfig {
    type Error = CliError;

    fn try_from(args: CheckArgs) -> Result<Self, Self::Error> {
        let instance = args.instance.ok_or(CliError::MissingArgument {
            field: ARG_INSTANCE,
            env: ENV_CHECK_INSTANCE,
        })?;
        let tour = args.tour.ok_or(CliError::MissingArgument {
            field: ARG_TOUR,
            env: ENV_CHECK_TOUR,
        })?;
        Ok(Self {
            instance,
            visits: parse_visits(&tour)?,
            verbose: args.verbose,
        })
    }
}

pub(super) fn run_check(args: CheckArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = CheckConfig::try_from(merged)?;
    run_check_with(&config, writer)
}

pub(super) fn run_check_with(config: &CheckConfig, writer: &mut dyn Write) -> Result<(), CliError> {
    config.validate_sources()?;
    let instance = load_instance(&config.instance)?;
    let tour = Tour::from_visits(&config.visits, instance.node_count())?;
    let evaluation = instance.evaluate(&tour)?;
    if config.verbose {
        for line in trace(&instance, &tour)? {
            writeln!(writer, "{line}").map_err(CliError::WriteOutput)?;
        }
    }
    writeln!(writer, "{}", render_evaluation(&evaluation)).map_err(CliError::WriteOutput)
}

/// One line per customer: the edge taken, the arrival and the deadline.
fn trace(instance: &Instance, tour: &Tour) -> Result<Vec<String>, CliError> {
    let arrivals = instance.arrivals(tour)?;
    Ok(tour
        .nodes()
        .windows(2)
        .zip(arrivals.iter().skip(1))
        .filter_map(|(pair, &arrival)| match *pair {
            [from, to] => {
                let latest = instance.time_window(to)?.latest();
                Some(format!(
                    "{from:>2} -> {to:>2} || time {:>10.2} -- latest {:>10.2} || late {}",
                    unscale(arrival),
                    unscale(latest),
                    arrival > latest
                ))
            }
            _ => None,
        })
        .collect())
}

/// `cost <cost>  lateness <lateness>` in real units.
fn render_evaluation(evaluation: &TourEvaluation) -> String {
    format!(
        "cost {:>10.2}  lateness {:>10.2}",
        unscale(evaluation.cost),
        unscale(evaluation.violation)
    )
}
