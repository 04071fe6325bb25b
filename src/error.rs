//! Errors raised while building rule fragments.

use thiserror::Error;

/// Reasons a rule builder may refuse to emit a fragment.
///
/// All of these indicate a mistake in the calling puzzle module rather than a property of the puzzle data,
/// so builders surface them immediately instead of substituting a default.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum Error {
    /// An adjacency kind name that no [`AdjacencyKind`](crate::adjacency::AdjacencyKind) variant answers to.
    #[error("unsupported adjacency kind: {0}")]
    UnsupportedAdjacency(String),
    /// A container name other than `grid` or `area`.
    #[error("unsupported container kind: {0}")]
    UnsupportedContainer(String),
    /// A comparator name outside of `eq, ge, gt, le, lt, ne`.
    #[error("unsupported comparator: {0}")]
    UnsupportedComparator(String),
    /// A negated predicate was passed where the rule needs to derive or choose the predicate itself.
    #[error("predicate `{0}` is negated but a positive predicate is required here")]
    NegatedPredicate(String),
    /// A positive predicate name starting with the reserved `not_` prefix.
    #[error("predicate name `{0}` starts with the reserved prefix `not_`")]
    ReservedPrefix(String),
    /// A name which is not a valid solver identifier.
    #[error("`{0}` is not a valid predicate name")]
    InvalidName(String),
    /// A shape was given with no cells.
    #[error("shape has no cells")]
    EmptyShape,
    /// Grid dimensions with no cells in them.
    #[error("invalid grid dimensions {rows}x{cols}")]
    InvalidGrid {
        /// Requested row count.
        rows: i32,
        /// Requested column count.
        cols: i32,
    },
}

/// Result alias used by every builder in this crate.
pub type Result<T> = std::result::Result<T, Error>;
