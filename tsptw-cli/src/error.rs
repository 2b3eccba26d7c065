//! Error types emitted by the TSPTW CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use tsptw_core::{ParseError, SeedSearchError, TourError};

/// Errors emitted by the TSPTW CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Long flag name.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// A search parameter that must be positive was zero.
    #[error("{field} must be positive")]
    ZeroParameter {
        /// Long flag name.
        field: &'static str,
    },
    /// The time budget is negative, not finite or too large.
    #[error("invalid time limit {seconds} seconds")]
    InvalidTimeLimit {
        /// Value as given.
        seconds: f64,
    },
    /// A token of the tour argument is not a node index.
    #[error("invalid node {token:?} in tour")]
    InvalidTourToken {
        /// Offending token.
        token: String,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Long flag name.
        field: &'static str,
        /// Path as given.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Long flag name.
        field: &'static str,
        /// Path as given.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Long flag name.
        field: &'static str,
        /// Path as given.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the instance file failed.
    #[error("failed to open instance at {path:?}: {source}")]
    OpenInstance {
        /// Path as given.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The instance file is malformed.
    #[error("failed to parse instance at {path:?}: {source}")]
    ParseInstance {
        /// Path as given.
        path: Utf8PathBuf,
        /// Parser failure.
        #[source]
        source: ParseError,
    },
    /// No feasible seed tour could be built.
    #[error("failed to find a seed tour for {path:?}: {source}")]
    SeedSearch {
        /// Instance path as given.
        path: Utf8PathBuf,
        /// Search failure.
        #[source]
        source: SeedSearchError,
    },
    /// The tour does not fit the instance.
    #[error(transparent)]
    Tour(#[from] TourError),
    /// Serializing the report failed.
    #[error("failed to serialize report: {0}")]
    SerializeReport(#[source] serde_json::Error),
    /// Writing to standard output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
    /// Appending the report to the results file failed.
    #[error("failed to append report to {path:?}: {source}")]
    AppendResults {
        /// Path as given.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}
