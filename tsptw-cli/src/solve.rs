//! Solve command implementation for the TSPTW CLI.

use std::io::Write;
use std::num::{NonZeroU64, NonZeroUsize};
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use tsptw_core::{ReportLine, RunTracker, SolveRequest, Solver, Tour};
use tsptw_solver_cp::{CpLnsConfig, CpLnsSolver};

use crate::input::{load_instance, parse_visits, resolve_time_limit};
use crate::{
    ARG_COST, ARG_FAIL_LIMIT, ARG_FORMAT, ARG_INSTANCE, ARG_OUTPUT, ARG_SEED, ARG_TIME_LIMIT,
    ARG_TOUR, ARG_WINDOW_SIZE, CliError, ENV_SOLVE_COST, ENV_SOLVE_INSTANCE, ENV_SOLVE_TOUR,
};

/// How the report is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ReportFormat {
    /// The fixed-width `|`-separated line.
    #[default]
    Line,
    /// One JSON object per run.
    Json,
}

/// CLI arguments for the `solve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "solve",
    long_about = "Improve a feasible seed tour with constraint programming and \
                 large neighbourhood search until the time budget runs out or \
                 the best tour is proven optimal. Prints one report line.",
    about = "Improve a feasible tour within a time budget"
)]
#[ortho_config(prefix = "TSPTW")]
pub(crate) struct SolveArgs {
    /// Path to the instance file.
    #[arg(short = 'f', long = ARG_INSTANCE, value_name = "path")]
    #[serde(default)]
    pub(crate) instance: Option<Utf8PathBuf>,
    /// Seed tour without the leading depot, e.g. "2 1 3".
    #[arg(short = 's', long = ARG_TOUR, value_name = "nodes")]
    #[serde(default)]
    pub(crate) tour: Option<String>,
    /// Cost of the seed tour, reported until it is improved.
    #[arg(short = 'c', long = ARG_COST, value_name = "cost")]
    #[serde(default)]
    pub(crate) cost: Option<f64>,
    /// Time budget in seconds (default 600).
    #[arg(short = 't', long = ARG_TIME_LIMIT, value_name = "seconds")]
    #[serde(default)]
    pub(crate) time_limit: Option<f64>,
    /// Number of consecutive positions re-optimized per restart (default 5).
    #[arg(long = ARG_WINDOW_SIZE, value_name = "positions")]
    #[serde(default)]
    pub(crate) window_size: Option<usize>,
    /// Failures allowed before a restart (default 30).
    #[arg(long = ARG_FAIL_LIMIT, value_name = "failures")]
    #[serde(default)]
    pub(crate) fail_limit: Option<u64>,
    /// Seed of the neighbourhood generator (default 31).
    #[arg(long = ARG_SEED, value_name = "seed")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// Report format.
    #[arg(long = ARG_FORMAT, value_enum, value_name = "format")]
    #[serde(default)]
    pub(crate) format: Option<ReportFormat>,
    /// Also append the report to this file, creating it if needed.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl SolveArgs {
    pub(crate) fn into_config(self) -> Result<SolveConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SolveConfig::try_from(merged)
    }
}

/// Resolved `solve` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SolveConfig {
    /// Path to the instance file.
    pub(crate) instance: Utf8PathBuf,
    /// Seed tour after the depot.
    pub(crate) visits: Vec<usize>,
    /// Seed cost in real units.
    pub(crate) initial_cost: f64,
    /// Wall-clock budget.
    pub(crate) time_limit: Duration,
    /// Engine parameters.
    pub(crate) solver: CpLnsConfig,
    pub(crate) format: ReportFormat,
    /// Results file the report is appended to.
    pub(crate) output: Option<Utf8PathBuf>,
}

impl TryFrom<SolveArgs> for SolveConfig {
    type Error = CliError;

    fn try_from(args: SolveArgs) -> Result<Self, Self::Error> {
        let instance = args.instance.ok_or(CliError::MissingArgument {
            field: ARG_INSTANCE,
            env: ENV_SOLVE_INSTANCE,
        })?;
        let tour = args.tour.ok_or(CliError::MissingArgument {
            field: ARG_TOUR,
            env: ENV_SOLVE_TOUR,
        })?;
        let initial_cost = args.cost.ok_or(CliError::MissingArgument {
            field: ARG_COST,
            env: ENV_SOLVE_COST,
        })?;

        let time_limit = resolve_time_limit(args.time_limit)?;

        let defaults = CpLnsConfig::default();
        let window_size = match args.window_size {
            Some(size) => NonZeroUsize::new(size).ok_or(CliError::ZeroParameter {
                field: ARG_WINDOW_SIZE,
            })?,
            None => defaults.window_size,
        };
        let max_failures_per_window = match args.fail_limit {
            Some(limit) => NonZeroU64::new(limit).ok_or(CliError::ZeroParameter {
                field: ARG_FAIL_LIMIT,
            })?,
            None => defaults.max_failures_per_window,
        };

        Ok(Self {
            instance,
            visits: parse_visits(&tour)?,
            initial_cost,
            time_limit,
            solver: CpLnsConfig {
                window_size,
                max_failures_per_window,
                seed: args.seed.unwrap_or(defaults.seed),
            },
            format: args.format.unwrap_or_default(),
            output: args.output,
        })
    }
}

pub(super) fn run_solve(args: SolveArgs, writer: &mut dyn Write) -> Result<ReportLine, CliError> {
    let config = args.into_config()?;
    log::debug!("resolved solve configuration: {config:?}");
    let solver = CpLnsSolver::with_config(config.solver);
    run_solve_with(&config, &solver, writer)
}

/// Runs `solver` and writes the report.
///
/// Failures while loading the instance or the seed, and failures of the run
/// itself, end up in the report as a crashed line. Only output failures are
/// returned as errors.
pub(super) fn run_solve_with(
    config: &SolveConfig,
    solver: &dyn Solver,
    writer: &mut dyn Write,
) -> Result<ReportLine, CliError> {
    let tracker = RunTracker::start(config.initial_cost);
    let outcome = match load_request(config) {
        Ok(request) => tracker.run(solver, &request),
        Err(err) => tracker.crash(&err),
    };
    let report = ReportLine::new(config.instance.as_str(), solver.name(), &outcome);
    let rendered = render_report(&report, config.format)?;

    writer
        .write_all(rendered.as_bytes())
        .map_err(CliError::WriteOutput)?;
    if let Some(path) = &config.output {
        tsptw_fs::append_utf8_file(path)
            .and_then(|mut file| file.write_all(rendered.as_bytes()))
            .map_err(|source| CliError::AppendResults {
                path: path.clone(),
                source,
            })?;
    }
    Ok(report)
}

fn load_request(config: &SolveConfig) -> Result<SolveRequest, CliError> {
    let instance = load_instance(&config.instance)?;
    let initial_tour = Tour::from_visits(&config.visits, instance.node_count())?;
    Ok(SolveRequest {
        instance,
        initial_tour,
        time_limit: config.time_limit,
    })
}

fn render_report(report: &ReportLine, format: ReportFormat) -> Result<String, CliError> {
    let mut rendered = match format {
        ReportFormat::Line => report.to_string(),
        ReportFormat::Json => serde_json::to_string(report).map_err(CliError::SerializeReport)?,
    };
    rendered.push('\n');
    Ok(rendered)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SolveConfig, CliError> {
    let merged = SolveArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SolveConfig::try_from(merged)
}
