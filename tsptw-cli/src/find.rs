//! Find command: build a feasible seed tour for `solve`.

use std::io::Write;
use std::time::{Duration, Instant};

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use tsptw_core::{SeedSearch, Tour, TourEvaluation, instance_name, unscale};

use crate::input::{load_instance, require_existing, resolve_time_limit};
use crate::{ARG_INSTANCE, ARG_LEVEL_MAX, ARG_SEED, ARG_TIME_LIMIT, CliError, ENV_FIND_INSTANCE};

/// CLI arguments for the `find` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "find",
    long_about = "Search for a tour that meets every time window, starting from \
                 random orders repaired by local search. Prints the instance \
                 name, the tour's cost and lateness, and the visits to pass to \
                 `solve -s`.",
    about = "Find a feasible seed tour"
)]
#[ortho_config(prefix = "TSPTW")]
pub(crate) struct FindArgs {
    /// Path to the instance file.
    #[arg(short = 'f', long = ARG_INSTANCE, value_name = "path")]
    #[serde(default)]
    pub(crate) instance: Option<Utf8PathBuf>,
    /// Seed of the shuffling generator (default 20211215).
    #[arg(long = ARG_SEED, value_name = "seed")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// Largest random shake tried before reshuffling (default 8).
    #[arg(long = ARG_LEVEL_MAX, value_name = "swaps")]
    #[serde(default)]
    pub(crate) level_max: Option<usize>,
    /// Time budget in seconds (default 600).
    #[arg(short = 't', long = ARG_TIME_LIMIT, value_name = "seconds")]
    #[serde(default)]
    pub(crate) time_limit: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FindConfig {
    pub(crate) instance: Utf8PathBuf,
    pub(crate) search: SeedSearch,
    pub(crate) time_limit: Duration,
}

impl TryFrom<FindArgs> for FindConfig {
    type Error = CliError;

    fn try_from(args: FindArgs) -> Result<Self, Self::Error> {
        let instance = args.instance.ok_or(CliError::MissingArgument {
            field: ARG_INSTANCE,
            env: ENV_FIND_INSTANCE,
        })?;
        let defaults = SeedSearch::default();
        Ok(Self {
            instance,
            search: SeedSearch {
                seed: args.seed.unwrap_or(defaults.seed),
                level_max: args.level_max.unwrap_or(defaults.level_max),
            },
            time_limit: resolve_time_limit(args.time_limit)?,
        })
    }
}

pub(super) fn run_find(args: FindArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = FindConfig::try_from(merged)?;
    log::debug!("resolved find configuration: {config:?}");
    run_find_with(&config, writer)
}

pub(super) fn run_find_with(config: &FindConfig, writer: &mut dyn Write) -> Result<(), CliError> {
    require_existing(&config.instance, ARG_INSTANCE)?;
    let instance = load_instance(&config.instance)?;
    let deadline = Instant::now().checked_add(config.time_limit);
    let tour = config
        .search
        .find(&instance, deadline)
        .map_err(|source| CliError::SeedSearch {
            path: config.instance.clone(),
            source,
        })?;
    let evaluation = instance.evaluate(&tour)?;
    writeln!(
        writer,
        "{}",
        render_seed(config.instance.as_str(), &tour, &evaluation)
    )
    .map_err(CliError::WriteOutput)
}

/// `<name>  <cost>  <lateness>  <visits>`, costs in real units.
fn render_seed(path: &str, tour: &Tour, evaluation: &TourEvaluation) -> String {
    let visits = tour
        .visits()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "{:<20}    {:>10.2}  {:>10.2}  {visits}",
        instance_name(path),
        unscale(evaluation.cost),
        unscale(evaluation.violation)
    )
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<FindConfig, CliError> {
    let merged = FindArgs::merge_from_layers(layers).map_err(CliError::from)?;
    FindConfig::try_from(merged)
}
