//! Neighbor relations between grid cells.

use std::str::FromStr;

use strum::{EnumString, VariantArray};
use tracing::debug;

use crate::common::{grid_at, EDGE_LEFT, EDGE_TOP, GRID_DIRECTION, GRID_OUT};
use crate::direction::Direction;
use crate::error::{Error, Result};
use crate::location::Location;
use crate::program::{shifted, Atom, Literal, Program, Term};

/// Which pairs of cells count as neighbors.
///
/// The gated kinds depend on facts produced elsewhere: walls (`edge_left`, `edge_top`) for [`EdgeGated`](Self::EdgeGated)
/// and path directions (`grid_direction`, `grid_out`) for the loop kinds.
#[derive(Copy, Clone, Debug, EnumString, Eq, Hash, Ord, PartialEq, PartialOrd, VariantArray)]
pub enum AdjacencyKind {
    /// Cells sharing a side.
    #[strum(serialize = "4")]
    Orthogonal4,
    /// Cells sharing only a corner.
    #[strum(serialize = "x")]
    DiagonalX,
    /// Either of the above.
    #[strum(serialize = "8")]
    Combined8,
    /// Cells sharing a side with no wall on it.
    #[strum(serialize = "edge")]
    EdgeGated,
    /// Cells joined by an undirected path fact.
    #[strum(serialize = "loop")]
    LoopGated,
    /// Cells joined by a directed path fact.
    #[strum(serialize = "loop_directed")]
    DirectedLoopGated,
}

impl AdjacencyKind {
    /// Parse a kind name such as `4`, `x` or `edge`.
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| Error::UnsupportedAdjacency(name.to_owned()))
    }

    /// The kind name, as accepted by [`parse`](Self::parse) and used in `adj_<kind>`.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Orthogonal4 => "4",
            Self::DiagonalX => "x",
            Self::Combined8 => "8",
            Self::EdgeGated => "edge",
            Self::LoopGated => "loop",
            Self::DirectedLoopGated => "loop_directed",
        }
    }

    /// The kind as one tag part. Never contains the tag separator, so a kind cannot run into the color after it.
    pub fn tag_token(&self) -> &'static str {
        match self {
            Self::DirectedLoopGated => "loopdirected",
            kind => kind.token(),
        }
    }

    /// The relation defined by [`build_adjacency`], e.g. `adj_4`.
    pub fn predicate(&self) -> String {
        format!("adj_{}", self.token())
    }

    /// `adj_<kind>(r, c, r1, c1)`.
    pub fn at(&self, r: impl Into<Term>, c: impl Into<Term>, r1: impl Into<Term>, c1: impl Into<Term>) -> Atom {
        Atom::cell(self.predicate(), r, c).with(r1).with(c1)
    }

    /// Whether `a` and `b` are neighbors by geometry alone, ignoring any walls or path facts the kind is gated on.
    pub fn geometric(&self, a: Location, b: Location) -> bool {
        match self {
            Self::DiagonalX => a.is_diagonal_to(&b),
            Self::Combined8 => a.is_orthogonal_to(&b) || a.is_diagonal_to(&b),
            Self::Orthogonal4 | Self::EdgeGated | Self::LoopGated | Self::DirectedLoopGated => a.is_orthogonal_to(&b),
        }
    }
}

fn distance_rule(program: &mut Program, kind: AdjacencyKind, condition: &str) {
    program.rule(
        kind.at("R", "C", "R1", "C1"),
        [grid_at("R", "C"), grid_at("R1", "C1"), Literal::expr(condition)],
    );
}

fn symmetric(program: &mut Program, kind: AdjacencyKind) {
    program.rule(kind.at("R", "C", "R1", "C1"), [kind.at("R1", "C1", "R", "C").into()]);
}

/// Rules joining a cell to its neighbor through each side that carries a path fact named `fact`.
fn path_gated(program: &mut Program, kind: AdjacencyKind, fact: &str) {
    for dir in Direction::VARIANTS {
        let (dr, dc) = dir.delta();
        let r1 = shifted(&Term::from("R"), dr);
        let c1 = shifted(&Term::from("C"), dc);
        program.rule(
            kind.at("R", "C", r1.clone(), c1.clone()),
            [
                grid_at("R", "C"),
                grid_at(r1, c1),
                Atom::cell(fact, "R", "C").with(Term::Str(dir.letter().into())).into(),
            ],
        );
    }
    symmetric(program, kind);
}

/// Define `adj_<kind>(R, C, R1, C1)` over the grid.
///
/// With `include_self`, every cell is also its own neighbor.
pub fn build_adjacency(kind: AdjacencyKind, include_self: bool) -> Program {
    let mut program = Program::new();

    match kind {
        AdjacencyKind::Orthogonal4 => distance_rule(&mut program, kind, "|R - R1| + |C - C1| == 1"),
        AdjacencyKind::DiagonalX => distance_rule(&mut program, kind, "|R - R1| == 1, |C - C1| == 1"),
        AdjacencyKind::Combined8 => {
            distance_rule(&mut program, kind, "|R - R1| + |C - C1| == 1");
            distance_rule(&mut program, kind, "|R - R1| == 1, |C - C1| == 1");
        }
        AdjacencyKind::EdgeGated => {
            program.rule(
                kind.at("R", "C", "R", "C + 1"),
                [grid_at("R", "C"), grid_at("R", "C + 1"), Literal::Neg(Atom::cell(EDGE_LEFT, "R", "C + 1"))],
            );
            program.rule(
                kind.at("R", "C", "R + 1", "C"),
                [grid_at("R", "C"), grid_at("R + 1", "C"), Literal::Neg(Atom::cell(EDGE_TOP, "R + 1", "C"))],
            );
            symmetric(&mut program, kind);
        }
        AdjacencyKind::LoopGated => path_gated(&mut program, kind, GRID_DIRECTION),
        AdjacencyKind::DirectedLoopGated => path_gated(&mut program, kind, GRID_OUT),
    }

    if include_self {
        program.rule(kind.at("R", "C", "R", "C"), [grid_at("R", "C")]);
    }

    debug!(kind = kind.token(), statements = program.len(), "built adjacency");
    program
}
