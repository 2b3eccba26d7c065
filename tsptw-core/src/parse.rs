//! Parser for the line-oriented instance format.
//!
//! The format is:
//!
//! 1. the node count;
//! 2. one whitespace-separated row of the distance matrix per node;
//! 3. one `earliest latest` pair per node, depot first.
//!
//! Lines starting with `#` and blank lines are ignored and do not count as
//! structural lines. Every number is real-valued in the text and converted
//! with [`scale`].

use std::io::{self, BufRead};
use std::str::FromStr;

use thiserror::Error;

use crate::{Instance, InstanceError, TimeWindow, TimeWindowError};

/// Scale factor applied to every real-valued input.
pub const PRECISION: f64 = 1000.0;

const COMMENT_MARKER: char = '#';

/// Errors raised while reading an instance.
///
/// Line numbers are 1-based physical line numbers, comments included.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Reading from the underlying source failed.
    #[error("failed to read line {line}: {source}")]
    Io {
        /// Line being read.
        line: usize,
        /// Source error from std I/O.
        #[source]
        source: io::Error,
    },
    /// The first structural line is not a node count.
    #[error("line {line}: invalid node count {token:?}")]
    NodeCount {
        /// Offending line.
        line: usize,
        /// Token that failed to parse.
        token: String,
    },
    /// A token is not a finite number, or overflows once scaled.
    #[error("line {line}: invalid number {token:?}")]
    InvalidNumber {
        /// Offending line.
        line: usize,
        /// Token that failed to parse.
        token: String,
    },
    /// A distance row has the wrong number of entries.
    #[error("line {line}: distance row {row} has {found} entries, expected {expected}")]
    RaggedRow {
        /// Offending line.
        line: usize,
        /// Zero-based matrix row.
        row: usize,
        /// Number of nodes.
        expected: usize,
        /// Entries found.
        found: usize,
    },
    /// A time-window line has fewer than two values.
    #[error("line {line}: time window needs an earliest and a latest value")]
    MissingWindowBound {
        /// Offending line.
        line: usize,
    },
    /// A time window closes before it opens.
    #[error("line {line}: {source}")]
    Window {
        /// Offending line.
        line: usize,
        /// Validation failure.
        #[source]
        source: TimeWindowError,
    },
    /// The input ended before every section was read.
    #[error("expected {expected} {section} lines but found {found}")]
    Truncated {
        /// Section that is incomplete.
        section: &'static str,
        /// Lines required.
        expected: usize,
        /// Lines present.
        found: usize,
    },
    /// Structural lines follow the last time window.
    #[error("line {line}: unexpected content after the last time window")]
    TrailingLine {
        /// Offending line.
        line: usize,
    },
    /// The parsed data does not form a valid instance.
    #[error(transparent)]
    Instance(#[from] InstanceError),
}

/// Convert a real value to the integer precision unit.
///
/// The product `value * PRECISION` is rounded half-to-even, so `2.5` becomes
/// `2500` and `2.4995` becomes `2500`. Returns `None` for non-finite input or
/// results outside the `i64` range.
///
/// # Examples
/// ```
/// use tsptw_core::scale;
///
/// assert_eq!(scale(2.5), Some(2500));
/// assert_eq!(scale(2.4995), Some(2500));
/// assert_eq!(scale(f64::NAN), None);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "input is real-valued; the range is checked before the cast"
)]
pub fn scale(value: f64) -> Option<i64> {
    let scaled = (value * PRECISION).round_ties_even();
    let in_range = scaled.is_finite() && scaled >= i64::MIN as f64 && scaled < i64::MAX as f64;
    in_range.then_some(scaled as i64)
}

/// Convert an integer in the precision unit back to real units.
///
/// # Examples
/// ```
/// use tsptw_core::unscale;
///
/// assert!((unscale(2_500) - 2.5).abs() < f64::EPSILON);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "reports are printed in real units"
)]
pub const fn unscale(value: i64) -> f64 {
    value as f64 / PRECISION
}

/// Parse an instance from any buffered reader.
///
/// # Examples
/// ```
/// use tsptw_core::parse_instance;
///
/// let text = "# two nodes\n2\n0 1.5\n1.5 0\n0 10\n0 10\n";
/// let instance = parse_instance(text.as_bytes()).expect("valid instance");
/// assert_eq!(instance.distance(0, 1), Some(1500));
/// ```
pub fn parse_instance<R: BufRead>(reader: R) -> Result<Instance, ParseError> {
    let mut parser = Parser::default();
    for (index, line) in reader.lines().enumerate() {
        let number = index + 1;
        let text = line.map_err(|source| ParseError::Io {
            line: number,
            source,
        })?;
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER) {
            continue;
        }
        parser.consume(number, trimmed)?;
    }
    parser.finish()
}

impl FromStr for Instance {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse_instance(text.as_bytes())
    }
}

#[derive(Debug, Default)]
struct Parser {
    node_count: Option<usize>,
    distances: Vec<Vec<i64>>,
    windows: Vec<TimeWindow>,
}

impl Parser {
    fn consume(&mut self, line: usize, text: &str) -> Result<(), ParseError> {
        let Some(node_count) = self.node_count else {
            let token = text.split_whitespace().next().unwrap_or_default();
            let count = token.parse::<usize>().map_err(|_| ParseError::NodeCount {
                line,
                token: token.to_owned(),
            })?;
            self.node_count = Some(count);
            return Ok(());
        };

        if self.distances.len() < node_count {
            let row = text
                .split_whitespace()
                .map(|token| number(line, token))
                .collect::<Result<Vec<_>, _>>()?;
            if row.len() != node_count {
                return Err(ParseError::RaggedRow {
                    line,
                    row: self.distances.len(),
                    expected: node_count,
                    found: row.len(),
                });
            }
            self.distances.push(row);
            return Ok(());
        }

        if self.windows.len() < node_count {
            let mut tokens = text.split_whitespace();
            let (Some(earliest), Some(latest)) = (tokens.next(), tokens.next()) else {
                return Err(ParseError::MissingWindowBound { line });
            };
            let window = TimeWindow::new(number(line, earliest)?, number(line, latest)?)
                .map_err(|source| ParseError::Window { line, source })?;
            self.windows.push(window);
            return Ok(());
        }

        Err(ParseError::TrailingLine { line })
    }

    fn finish(self) -> Result<Instance, ParseError> {
        let Some(node_count) = self.node_count else {
            return Err(ParseError::Truncated {
                section: "node count",
                expected: 1,
                found: 0,
            });
        };
        if self.distances.len() < node_count {
            return Err(ParseError::Truncated {
                section: "distance",
                expected: node_count,
                found: self.distances.len(),
            });
        }
        if self.windows.len() < node_count {
            return Err(ParseError::Truncated {
                section: "time window",
                expected: node_count,
                found: self.windows.len(),
            });
        }
        Ok(Instance::new(self.distances, self.windows)?)
    }
}

fn number(line: usize, token: &str) -> Result<i64, ParseError> {
    token
        .parse::<f64>()
        .ok()
        .and_then(scale)
        .ok_or_else(|| ParseError::InvalidNumber {
            line,
            token: token.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TRIANGLE: &str = "\
# depot and two customers
3

0 1 1
1 0 1
# rows may be interleaved with comments
1 1 0
0 100
0 100
0 100
";

    #[rstest]
    fn parses_comments_and_blank_lines() {
        let instance: Instance = TRIANGLE.parse().expect("valid instance");
        assert_eq!(instance.node_count(), 3);
        assert_eq!(instance.distance(0, 1), Some(1000));
        assert_eq!(instance.distance(2, 2), Some(0));
        assert_eq!(
            instance.time_window(2),
            Some(TimeWindow::new(0, 100_000).expect("ordered bounds"))
        );
    }

    #[rstest]
    fn parsing_is_deterministic() {
        let first: Instance = TRIANGLE.parse().expect("valid instance");
        let second: Instance = TRIANGLE.parse().expect("valid instance");
        assert_eq!(first, second);
    }

    #[rstest]
    #[case(2.5, 2500)]
    #[case(2.4995, 2500)]
    #[case(1.23456, 1235)]
    #[case(-0.25, -250)]
    #[case(0.0, 0)]
    fn scale_rounds_to_nearest(#[case] value: f64, #[case] expected: i64) {
        assert_eq!(scale(value), Some(expected));
    }

    #[rstest]
    #[case(f64::INFINITY)]
    #[case(f64::NAN)]
    #[case(1e300)]
    fn scale_rejects_unrepresentable_values(#[case] value: f64) {
        assert_eq!(scale(value), None);
    }

    #[rstest]
    fn node_count_uses_first_token() {
        let instance: Instance = "1 extra\n0\n0 5\n".parse().expect("valid instance");
        assert_eq!(instance.node_count(), 1);
    }

    #[rstest]
    fn rejects_invalid_node_count() {
        let err = "three\n".parse::<Instance>().expect_err("bad count");
        assert!(matches!(err, ParseError::NodeCount { line: 1, ref token } if token == "three"));
    }

    #[rstest]
    fn rejects_ragged_row_with_line_number() {
        let err = "# header\n2\n0 1\n1\n0 1\n0 1\n"
            .parse::<Instance>()
            .expect_err("ragged row");
        assert!(matches!(
            err,
            ParseError::RaggedRow {
                line: 4,
                row: 1,
                expected: 2,
                found: 1
            }
        ));
    }

    #[rstest]
    fn rejects_non_numeric_distance() {
        let err = "2\n0 x\n1 0\n0 1\n0 1\n"
            .parse::<Instance>()
            .expect_err("bad token");
        assert!(matches!(err, ParseError::InvalidNumber { line: 2, ref token } if token == "x"));
    }

    #[rstest]
    fn rejects_missing_window_lines() {
        let err = "2\n0 1\n1 0\n0 1\n".parse::<Instance>().expect_err("truncated");
        assert!(matches!(
            err,
            ParseError::Truncated {
                section: "time window",
                expected: 2,
                found: 1
            }
        ));
    }

    #[rstest]
    fn rejects_single_bound_window() {
        let err = "1\n0\n5\n".parse::<Instance>().expect_err("one bound");
        assert!(matches!(err, ParseError::MissingWindowBound { line: 3 }));
    }

    #[rstest]
    fn rejects_inverted_window() {
        let err = "1\n0\n5 1\n".parse::<Instance>().expect_err("inverted");
        assert!(matches!(err, ParseError::Window { line: 3, .. }));
    }

    #[rstest]
    fn rejects_trailing_lines() {
        let err = "1\n0\n0 5\n0 5\n".parse::<Instance>().expect_err("trailing");
        assert!(matches!(err, ParseError::TrailingLine { line: 4 }));
    }

    #[rstest]
    fn rejects_empty_input() {
        let err = "# nothing here\n\n".parse::<Instance>().expect_err("empty");
        assert!(matches!(err, ParseError::Truncated { section: "node count", .. }));
    }

    #[rstest]
    fn rejects_zero_nodes() {
        let err = "0\n".parse::<Instance>().expect_err("no nodes");
        assert!(matches!(err, ParseError::Instance(InstanceError::Empty)));
    }

    #[rstest]
    fn rejects_negative_distances() {
        let err = "2\n0 -1\n1 0\n0 1\n0 1\n"
            .parse::<Instance>()
            .expect_err("negative distance");
        assert!(matches!(
            err,
            ParseError::Instance(InstanceError::NegativeDistance { .. })
        ));
    }
}
