//! Arrival time windows.

use thiserror::Error;

/// The interval during which a node may be visited.
///
/// Both bounds are expressed in the integer precision unit. Arriving before
/// `earliest` means waiting; arriving after `latest` is infeasible.
///
/// # Examples
/// ```
/// use tsptw_core::TimeWindow;
///
/// let window = TimeWindow::new(1_000, 5_000).expect("ordered bounds");
/// assert!(window.contains(2_500));
/// assert!(!window.contains(5_001));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TimeWindow {
    earliest: i64,
    latest: i64,
}

/// Errors returned by [`TimeWindow::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimeWindowError {
    /// The window closes before it opens.
    #[error("time window closes at {latest} before it opens at {earliest}")]
    Inverted {
        /// Requested opening time.
        earliest: i64,
        /// Requested closing time.
        latest: i64,
    },
}

impl TimeWindow {
    /// Validates and constructs a [`TimeWindow`].
    pub const fn new(earliest: i64, latest: i64) -> Result<Self, TimeWindowError> {
        if earliest > latest {
            return Err(TimeWindowError::Inverted { earliest, latest });
        }
        Ok(Self { earliest, latest })
    }

    /// Opening time of the window.
    #[must_use]
    pub const fn earliest(self) -> i64 {
        self.earliest
    }

    /// Closing time of the window.
    #[must_use]
    pub const fn latest(self) -> i64 {
        self.latest
    }

    /// Whether `time` lies within the inclusive bounds.
    #[must_use]
    pub const fn contains(self, time: i64) -> bool {
        self.earliest <= time && time <= self.latest
    }
}
