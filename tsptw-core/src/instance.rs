//! Problem instances: distances and time windows.
//!
//! Node [`Instance::DEPOT`] is the depot. Distances double as travel times,
//! so a tour's timing and its cost are read from the same matrix.

use thiserror::Error;

use crate::{TimeWindow, Tour, TourError};

/// Square matrix of travel costs, indexed `[from][to]`.
pub type DistanceMatrix = Vec<Vec<i64>>;

/// A TSPTW instance.
///
/// # Examples
/// ```
/// use tsptw_core::{Instance, TimeWindow, Tour};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let wide = TimeWindow::new(0, 100)?;
/// let instance = Instance::new(
///     vec![vec![0, 1, 1], vec![1, 0, 1], vec![1, 1, 0]],
///     vec![wide; 3],
/// )?;
/// let tour = Tour::from_visits(&[1, 2], instance.node_count())?;
/// assert_eq!(instance.evaluate(&tour)?.cost, 3);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Instance {
    distances: DistanceMatrix,
    time_windows: Vec<TimeWindow>,
}

/// Errors returned by [`Instance::new`] and [`Instance::permuted`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstanceError {
    /// No nodes were supplied.
    #[error("instance must contain at least the depot")]
    Empty,
    /// A distance row has the wrong length.
    #[error("distance row {row} has {found} entries, expected {expected}")]
    NotSquare {
        /// Zero-based row index.
        row: usize,
        /// Number of nodes.
        expected: usize,
        /// Entries found in the row.
        found: usize,
    },
    /// The number of time windows differs from the number of nodes.
    #[error("instance has {expected} nodes but {found} time windows")]
    WindowCount {
        /// Number of nodes.
        expected: usize,
        /// Number of windows supplied.
        found: usize,
    },
    /// A travel cost is negative.
    #[error("distance from {from} to {to} is negative ({value})")]
    NegativeDistance {
        /// Origin node.
        from: usize,
        /// Destination node.
        to: usize,
        /// Offending value.
        value: i64,
    },
    /// A reordering is not a permutation of the node indices.
    #[error("node order is not a permutation of 0..{node_count}")]
    InvalidPermutation {
        /// Number of nodes.
        node_count: usize,
    },
}

/// Cost and lateness of a tour.
///
/// Arrival at position 0 is time 0. Each subsequent arrival is the previous
/// arrival plus the travel cost, raised to the node's opening time when the
/// tour arrives early. Lateness is the amount by which an arrival exceeds the
/// node's closing time. The closing edge back to the depot adds cost but is
/// not time-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TourEvaluation {
    /// Sum of every edge, including the return to the depot.
    pub cost: i64,
    /// Summed lateness over all positions.
    pub violation: i64,
    /// First position whose arrival falls outside its window.
    pub first_violation: Option<usize>,
}

impl TourEvaluation {
    /// Whether every arrival respects its time window.
    #[must_use]
    pub const fn is_feasible(&self) -> bool {
        self.first_violation.is_none()
    }
}

/// An instance whose nodes were reordered, with the order used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reordered {
    /// The reordered instance.
    pub instance: Instance,
    /// `order[i]` is the original index of reordered node `i`.
    pub order: Vec<usize>,
}

impl Reordered {
    /// Index of the original depot within the reordered instance.
    #[must_use]
    pub fn depot(&self) -> Option<usize> {
        self.order.iter().position(|&node| node == Instance::DEPOT)
    }

    /// Undo the reordering, reconstructing the original instance.
    pub fn restore(&self) -> Result<Instance, InstanceError> {
        let mut inverse = vec![0; self.order.len()];
        for (position, &node) in self.order.iter().enumerate() {
            let slot = inverse
                .get_mut(node)
                .ok_or(InstanceError::InvalidPermutation {
                    node_count: self.order.len(),
                })?;
            *slot = position;
        }
        self.instance.permuted(&inverse)
    }
}

impl Instance {
    /// Index of the depot.
    pub const DEPOT: usize = 0;

    /// Validates and constructs an [`Instance`].
    pub fn new(
        distances: DistanceMatrix,
        time_windows: Vec<TimeWindow>,
    ) -> Result<Self, InstanceError> {
        let node_count = distances.len();
        if node_count == 0 {
            return Err(InstanceError::Empty);
        }
        if time_windows.len() != node_count {
            return Err(InstanceError::WindowCount {
                expected: node_count,
                found: time_windows.len(),
            });
        }
        for (from, row) in distances.iter().enumerate() {
            if row.len() != node_count {
                return Err(InstanceError::NotSquare {
                    row: from,
                    expected: node_count,
                    found: row.len(),
                });
            }
            if let Some((to, &value)) = row.iter().enumerate().find(|(_, d)| **d < 0) {
                return Err(InstanceError::NegativeDistance { from, to, value });
            }
        }
        Ok(Self {
            distances,
            time_windows,
        })
    }

    /// Number of nodes, depot included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.distances.len()
    }

    /// Travel cost from `from` to `to`.
    #[must_use]
    pub fn distance(&self, from: usize, to: usize) -> Option<i64> {
        self.distances.get(from)?.get(to).copied()
    }

    /// The full distance matrix.
    #[must_use]
    pub fn distances(&self) -> &[Vec<i64>] {
        &self.distances
    }

    /// Time window of `node`.
    #[must_use]
    pub fn time_window(&self, node: usize) -> Option<TimeWindow> {
        self.time_windows.get(node).copied()
    }

    /// Every time window, indexed by node.
    #[must_use]
    pub fn time_windows(&self) -> &[TimeWindow] {
        &self.time_windows
    }

    /// Latest closing time over all nodes.
    #[must_use]
    pub fn horizon(&self) -> i64 {
        self.time_windows
            .iter()
            .map(|window| window.latest())
            .max()
            .unwrap_or_default()
    }

    /// Largest single travel cost.
    #[must_use]
    pub fn max_distance(&self) -> i64 {
        self.distances
            .iter()
            .flatten()
            .copied()
            .max()
            .unwrap_or_default()
    }

    /// Build a new instance in which node `i` is original node `order[i]`.
    pub fn permuted(&self, order: &[usize]) -> Result<Self, InstanceError> {
        let node_count = self.node_count();
        let invalid = InstanceError::InvalidPermutation { node_count };
        if !is_permutation(order, node_count) {
            return Err(invalid);
        }
        let mut distances = Vec::with_capacity(node_count);
        let mut time_windows = Vec::with_capacity(node_count);
        for &from in order {
            let row = order
                .iter()
                .map(|&to| self.distance(from, to))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| invalid.clone())?;
            distances.push(row);
            time_windows.push(self.time_window(from).ok_or_else(|| invalid.clone())?);
        }
        Self::new(distances, time_windows)
    }

    /// Reorder nodes by non-decreasing closing time.
    ///
    /// The sort is stable, so nodes sharing a deadline keep their relative
    /// order. The depot is not pinned: callers use [`Reordered::depot`] to
    /// find it again.
    #[must_use]
    pub fn sorted_by_deadline(&self) -> Reordered {
        let mut order: Vec<usize> = (0..self.node_count()).collect();
        order.sort_by_key(|&node| {
            self.time_window(node)
                .map_or(i64::MAX, TimeWindow::latest)
        });
        let instance = self.permuted(&order).unwrap_or_else(|_| self.clone());
        Reordered { instance, order }
    }

    /// Arrival time at each position of `tour`.
    ///
    /// The depot is left at time 0 and the tour waits at nodes it reaches
    /// before they open.
    pub fn arrivals(&self, tour: &Tour) -> Result<Vec<i64>, TourError> {
        let node_count = self.node_count();
        if tour.len() != node_count {
            return Err(TourError::WrongLength {
                expected: node_count,
                found: tour.len(),
            });
        }
        let mut arrivals = Vec::with_capacity(node_count);
        let mut time = 0_i64;
        let mut previous = None;
        for &node in tour.nodes() {
            let window = self
                .time_window(node)
                .ok_or(TourError::NodeOutOfRange { node, node_count })?;
            if let Some(from) = previous {
                let travel = self.lookup(from, node, node_count)?;
                time = time.saturating_add(travel).max(window.earliest());
            }
            arrivals.push(time);
            previous = Some(node);
        }
        Ok(arrivals)
    }

    /// Cost and lateness of `tour` on this instance.
    pub fn evaluate(&self, tour: &Tour) -> Result<TourEvaluation, TourError> {
        let node_count = self.node_count();
        let arrivals = self.arrivals(tour)?;

        let mut evaluation = TourEvaluation {
            cost: 0,
            violation: 0,
            first_violation: None,
        };
        for (position, (&node, &arrival)) in tour.nodes().iter().zip(&arrivals).enumerate() {
            let window = self
                .time_window(node)
                .ok_or(TourError::NodeOutOfRange { node, node_count })?;
            let lateness = if position > 0 || window.contains(arrival) {
                arrival.saturating_sub(window.latest()).max(0)
            } else {
                // The depot is left at time 0: waiting for a later opening is
                // not possible.
                window.earliest().max(0).max(window.latest().saturating_neg())
            };
            if lateness > 0 {
                evaluation.violation = evaluation.violation.saturating_add(lateness);
                evaluation.first_violation.get_or_insert(position);
            }
        }
        for (from, to) in tour.edges() {
            let travel = self.lookup(from, to, node_count)?;
            evaluation.cost = evaluation.cost.saturating_add(travel);
        }
        Ok(evaluation)
    }

    fn lookup(&self, from: usize, to: usize, node_count: usize) -> Result<i64, TourError> {
        self.distance(from, to).ok_or(TourError::NodeOutOfRange {
            node: from.max(to),
            node_count,
        })
    }
}

fn is_permutation(order: &[usize], node_count: usize) -> bool {
    if order.len() != node_count {
        return false;
    }
    let mut seen = vec![false; node_count];
    order.iter().all(|&node| match seen.get_mut(node) {
        Some(slot) if !*slot => {
            *slot = true;
            true
        }
        _ => false,
    })
}
