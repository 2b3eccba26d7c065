//! The one-line run report.

use std::fmt;

use crate::{RunOutcome, RunStatus};

/// Short instance name: the last two `/`-separated segments of `path`.
///
/// Trailing empty segments are dropped first, so `a/b/` names `a/b`.
///
/// # Examples
/// ```
/// use tsptw_core::instance_name;
///
/// assert_eq!(instance_name("data/potvin/rc_201.1.txt"), "potvin/rc_201.1.txt");
/// assert_eq!(instance_name("rc_201.1.txt"), "rc_201.1.txt");
/// ```
#[must_use]
pub fn instance_name(path: &str) -> String {
    let segments: Vec<&str> = path.trim_end_matches('/').split('/').collect();
    let tail = segments
        .len()
        .checked_sub(2)
        .and_then(|start| segments.get(start..))
        .unwrap_or(&segments);
    tail.join("/")
}

/// A finished run rendered for standard output.
///
/// Displays as
/// `<instance> | <solver> | <status> | <objective> | <elapsed> | <tour or error>`
/// with the first five fields right-aligned to ten columns. The tour omits
/// the leading depot so it reads like the tour given on the command line.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ReportLine {
    /// Short instance name, see [`instance_name`].
    pub instance: String,
    /// Name of the solver that produced the outcome.
    pub solver: String,
    /// Run classification.
    pub status: RunStatus,
    /// Best cost in real units.
    pub objective: f64,
    /// Seconds from the start of the run to the best tour.
    pub elapsed: f64,
    /// Visits after the depot, absent when the run crashed.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub tour: Option<Vec<usize>>,
    /// Error message of a crashed run.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub error: Option<String>,
}

impl ReportLine {
    /// Build the report for `outcome`.
    #[must_use]
    pub fn new(instance: &str, solver: &str, outcome: &RunOutcome) -> Self {
        let crashed = outcome.crashed();
        Self {
            instance: instance_name(instance),
            solver: solver.to_owned(),
            status: outcome.status,
            objective: outcome.objective,
            elapsed: outcome.time_to_best.as_secs_f64(),
            tour: outcome
                .tour
                .as_ref()
                .filter(|_| !crashed)
                .map(|tour| tour.visits().to_vec()),
            error: outcome.error.clone().filter(|_| crashed),
        }
    }
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>10} | {:>10} | {:>10} | {:>10.2} | {:>10.2} | ",
            self.instance, self.solver, self.status, self.objective, self.elapsed
        )?;
        match (&self.error, &self.tour) {
            (Some(error), _) => f.write_str(error),
            (None, Some(visits)) => {
                let mut first = true;
                for node in visits {
                    if !first {
                        f.write_str(" ")?;
                    }
                    write!(f, "{node}")?;
                    first = false;
                }
                Ok(())
            }
            (None, None) => Ok(()),
        }
    }
}
