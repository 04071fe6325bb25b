#![warn(missing_docs)]

//! # `gridlogic`
//!
//! Building blocks for encoding grid logic puzzles as answer set programs, in the input language of solvers such as
//! [clingo](https://potassco.org/clingo/).
//!
//! A puzzle encoding is assembled from small [`Program`]s, each produced by a template function: the grid facts from
//! [`common`], an adjacency relation from [`adjacency`], then whatever rules the puzzle needs, such as connectivity
//! from [`reachable`], rectangle recognition from [`rect`], polyomino detection from [`placement`] or loop topology
//! from [`loops`]. Programs are concatenated with [`Program::extend`] and rendered once through
//! [`Display`](std::fmt::Display).
//!
//! Every template derives the names of its auxiliary predicates from its parameters through [`tag!`], so two
//! instances of a template with different colors, adjacency kinds or containers never clash.
//!
//! # Internals
//! The templates encode least fixpoints declaratively and leave their computation to the solver. The [`check`]
//! module computes the same closures imperatively over a fixed shading, which is how the encodings are tested.
//!
//! Shape templates enumerate the orientations of a polyomino by closing it under quarter turns and mirroring. The
//! enumeration is memoized in a [`Context`] owned by the caller.

pub use context::Context;
pub use error::{Error, Result};
pub use location::Location;
pub use predicate::Predicate;
pub use program::{Comparator, Program, Target};

pub mod adjacency;
pub mod check;
pub mod common;
pub mod context;
pub mod direction;
pub mod error;
pub mod location;
pub mod loops;
pub mod placement;
pub mod predicate;
pub mod program;
pub mod reachable;
pub mod rect;
pub mod shape;
pub mod tag;
mod tests;
