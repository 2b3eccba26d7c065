//! Error types for model construction and propagation.

use thiserror::Error;

/// Errors raised while building a [`Model`](crate::Model).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A variable was declared with `min > max`.
    #[error("variable {name} has an empty domain [{min}, {max}]")]
    EmptyDomain {
        /// Variable name.
        name: String,
        /// Requested lower bound.
        min: i64,
        /// Requested upper bound.
        max: i64,
    },
    /// A constraint refers to a variable the model does not own.
    #[error("unknown variable #{index}")]
    UnknownVariable {
        /// Index of the foreign variable.
        index: usize,
    },
    /// A lookup table is empty or not rectangular.
    #[error("{constraint} constraint has a malformed table")]
    MalformedTable {
        /// Constraint being posted.
        constraint: &'static str,
    },
    /// Restricting a variable at the root removed its last value.
    #[error("variable {name} cannot take the value {value}")]
    ValueOutsideDomain {
        /// Variable name.
        name: String,
        /// Requested value.
        value: i64,
    },
}

/// Propagation emptied a domain.
///
/// This is the ordinary failure signal of the search and carries no detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("domain wipe-out")]
pub struct Contradiction;
