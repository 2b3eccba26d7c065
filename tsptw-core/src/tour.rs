//! Tours through every node of an instance.
//!
//! A [`Tour`] is a permutation of `[0, n)` whose first position is the depot.
//! The closing edge back to the depot is implicit.

use std::fmt;

use thiserror::Error;

use crate::Instance;

/// An ordered visit of every node, starting at the depot.
///
/// # Examples
/// ```
/// use tsptw_core::Tour;
///
/// let tour = Tour::from_visits(&[2, 1], 3).expect("valid permutation");
/// assert_eq!(tour.nodes(), &[0, 2, 1]);
/// assert_eq!(tour.visits(), &[2, 1]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Tour {
    nodes: Vec<usize>,
}

/// Errors returned when a node sequence is not a valid tour.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TourError {
    /// The sequence does not cover every node exactly once.
    #[error("tour visits {found} nodes but the instance has {expected}")]
    WrongLength {
        /// Number of nodes in the instance.
        expected: usize,
        /// Number of nodes in the sequence.
        found: usize,
    },
    /// A node index is outside `[0, node_count)`.
    #[error("node {node} is out of range for an instance of {node_count} nodes")]
    NodeOutOfRange {
        /// Offending node index.
        node: usize,
        /// Number of nodes in the instance.
        node_count: usize,
    },
    /// A node appears more than once.
    #[error("node {node} is visited more than once")]
    DuplicateNode {
        /// Repeated node index.
        node: usize,
    },
    /// Position 0 does not hold the depot.
    #[error("tour must start at the depot but starts at node {found}")]
    DepotNotFirst {
        /// Node found in position 0.
        found: usize,
    },
}

impl Tour {
    /// Validates and constructs a [`Tour`] over `node_count` nodes.
    pub fn new(nodes: Vec<usize>, node_count: usize) -> Result<Self, TourError> {
        if nodes.len() != node_count {
            return Err(TourError::WrongLength {
                expected: node_count,
                found: nodes.len(),
            });
        }
        let mut seen = vec![false; node_count];
        for &node in &nodes {
            let slot = seen
                .get_mut(node)
                .ok_or(TourError::NodeOutOfRange { node, node_count })?;
            if *slot {
                return Err(TourError::DuplicateNode { node });
            }
            *slot = true;
        }
        match nodes.first() {
            Some(&first) if first != Instance::DEPOT => {
                Err(TourError::DepotNotFirst { found: first })
            }
            _ => Ok(Self { nodes }),
        }
    }

    /// Builds a tour from the visits that follow the depot.
    ///
    /// This is the shape tours take on the command line, where the leading
    /// depot is implicit.
    pub fn from_visits(visits: &[usize], node_count: usize) -> Result<Self, TourError> {
        let mut nodes = Vec::with_capacity(visits.len() + 1);
        nodes.push(Instance::DEPOT);
        nodes.extend_from_slice(visits);
        Self::new(nodes, node_count)
    }

    /// Every node in visiting order, depot first.
    #[must_use]
    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    /// The nodes visited after leaving the depot.
    #[must_use]
    pub fn visits(&self) -> &[usize] {
        self.nodes.get(1..).unwrap_or_default()
    }

    /// Number of positions in the tour.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tour has no positions.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Consecutive `(from, to)` edges including the return to the depot.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let closing = match (self.nodes.last(), self.nodes.first()) {
            (Some(&last), Some(&first)) => Some((last, first)),
            _ => None,
        };
        self.nodes
            .windows(2)
            .filter_map(|pair| match *pair {
                [from, to] => Some((from, to)),
                _ => None,
            })
            .chain(closing)
    }
}

impl fmt::Display for Tour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for node in &self.nodes {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{node}")?;
            first = false;
        }
        Ok(())
    }
}
