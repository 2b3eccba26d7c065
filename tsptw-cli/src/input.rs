//! Loading instances and tours named on the command line.

use std::io::BufReader;
use std::time::Duration;

use camino::Utf8Path;
use tsptw_core::{Instance, parse_instance};
use tsptw_fs::open_utf8_file;

use crate::CliError;

/// Reads and parses the instance file at `path`.
pub(crate) fn load_instance(path: &Utf8Path) -> Result<Instance, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenInstance {
        path: path.to_path_buf(),
        source,
    })?;
    parse_instance(BufReader::new(file)).map_err(|source| CliError::ParseInstance {
        path: path.to_path_buf(),
        source,
    })
}

const DEFAULT_TIME_LIMIT_SECS: f64 = 600.0;

/// Resolves a time budget in seconds, 600 when unset.
pub(crate) fn resolve_time_limit(seconds: Option<f64>) -> Result<Duration, CliError> {
    let seconds = seconds.unwrap_or(DEFAULT_TIME_LIMIT_SECS);
    Duration::try_from_secs_f64(seconds).map_err(|_| CliError::InvalidTimeLimit { seconds })
}

/// Fails unless `path` names an existing regular file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match tsptw_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Splits a whitespace-separated list of node indices.
///
/// The list names the visits after the depot, so `"2 1 3"` describes the
/// tour `0 2 1 3`.
pub(crate) fn parse_visits(text: &str) -> Result<Vec<usize>, CliError> {
    text.split_whitespace()
        .map(|token| {
            token.parse().map_err(|_| CliError::InvalidTourToken {
                token: token.to_owned(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case("2 1 3", vec![2, 1, 3])]
    #[case("  4\t5\n", vec![4, 5])]
    #[case("", vec![])]
    fn visits_split_on_whitespace(#[case] text: &str, #[case] expected: Vec<usize>) {
        assert_eq!(parse_visits(text).expect("valid tour"), expected);
    }

    #[rstest]
    #[case("1 x 2", "x")]
    #[case("1 -2", "-2")]
    #[case("1.5", "1.5")]
    fn bad_tokens_are_named(#[case] text: &str, #[case] bad: &str) {
        match parse_visits(text) {
            Err(CliError::InvalidTourToken { token }) => assert_eq!(token, bad),
            other => panic!("expected InvalidTourToken, found {other:?}"),
        }
    }

    #[rstest]
    fn malformed_instance_reports_path_and_line() {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        let path = root.join("broken.txt");
        std::fs::write(&path, "2\n0 1\n1 x\n0 10\n0 10\n").expect("write instance");

        let err = load_instance(&path).expect_err("bad number");
        assert!(matches!(&err, CliError::ParseInstance { path: found, .. } if *found == path));
        assert!(err.to_string().contains("line 3"), "unexpected message: {err}");
    }
}
