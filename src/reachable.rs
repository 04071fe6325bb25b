//! Connectivity as flood fill: seed facts, a propagation rule over an adjacency relation, and a closure constraint.
//!
//! All templates refer to `adj_<kind>`, which the caller defines with
//! [`build_adjacency`](crate::adjacency::build_adjacency).

use std::ops::Range;

use tracing::debug;

use crate::adjacency::AdjacencyKind;
use crate::common::{grid_at, EDGE_LEFT, EDGE_TOP};
use crate::error::{Error, Result};
use crate::location::{Coord, Location};
use crate::predicate::Predicate;
use crate::program::{Atom, Literal, Program, Term};
use crate::tag;

/// The propagation step shared by the grid-wide templates: `tag(R, C)` spreads to matching neighbors.
fn spread(program: &mut Program, tag: &str, color: &Predicate, adj: AdjacencyKind) {
    program.rule(
        Atom::cell(tag, "R", "C"),
        [
            Literal::Pos(Atom::cell(tag, "R1", "C1")),
            grid_at("R", "C"),
            color.at("R", "C"),
            adj.at("R", "C", "R1", "C1").into(),
        ],
    );
}

fn closure(program: &mut Program, tag: &str, color: &Predicate) {
    program.constraint([grid_at("R", "C"), color.at("R", "C"), Literal::Neg(Atom::cell(tag, "R", "C"))]);
}

/// All cells of `color` form one connected group.
///
/// The group is seeded at the smallest matching cell, or with a `grid_size` hint, at the matching cell closest to the
/// center, which tends to ground faster on large grids.
pub fn grid_color_connected(color: &Predicate, adj: AdjacencyKind, grid_size: Option<(Coord, Coord)>) -> Program {
    let tag = tag!("reachable", "grid", "adj", adj, color);
    let mut program = Program::new();

    let seed = match grid_size {
        None => format!("(R, C) = #min {{ (R1, C1): grid(R1, C1), {} }}", color.at("R1", "C1")),
        Some((rows, cols)) => format!(
            "(D, R, C) = #min {{ (|R1 - {}| + |C1 - {}|, R1, C1): grid(R1, C1), {} }}",
            rows / 2,
            cols / 2,
            color.at("R1", "C1")
        ),
    };
    program.rule(Atom::cell(tag.as_str(), "R", "C"), [Literal::expr(seed)]);
    spread(&mut program, &tag, color, adj);
    closure(&mut program, &tag, color);

    debug!(%tag, statements = program.len(), "built grid connectivity");
    program
}

/// Every cell of `color` is connected to a matching cell on the outer ring of the grid.
pub fn border_color_connected(rows: Coord, cols: Coord, color: &Predicate, adj: AdjacencyKind) -> Result<Program> {
    if rows <= 0 || cols <= 0 {
        return Err(Error::InvalidGrid { rows, cols });
    }

    let tag = tag!("reachable", "border", "adj", adj, color);
    let mut program = Program::new();
    for r in 0..rows {
        for c in 0..cols {
            if r == 0 || r == rows - 1 || c == 0 || c == cols - 1 {
                program.rule(Atom::cell(tag.as_str(), r, c), [color.at(r, c)]);
            }
        }
    }
    spread(&mut program, &tag, color, adj);
    closure(&mut program, &tag, color);

    debug!(%tag, statements = program.len(), "built border connectivity");
    Ok(program)
}

/// Within every area, the cells of `color` form one connected group.
pub fn area_color_connected(color: &Predicate, adj: AdjacencyKind) -> Program {
    let tag = tag!("reachable", "area", "adj", adj, color);
    let area = |a: &str, r: &str, c: &str| Atom::new("area", [a, r, c]);

    let mut program = Program::new();
    program
        .rule(
            Atom::new(tag.as_str(), ["A", "R", "C"]),
            [
                Literal::expr("area(A, _, _)"),
                Literal::expr(format!("(R, C) = #min {{ (R1, C1): area(A, R1, C1), {} }}", color.at("R1", "C1"))),
            ],
        )
        .rule(
            Atom::new(tag.as_str(), ["A", "R", "C"]),
            [
                Literal::Pos(Atom::new(tag.as_str(), ["A", "R1", "C1"])),
                area("A", "R", "C").into(),
                color.at("R", "C"),
                adj.at("R", "C", "R1", "C1").into(),
            ],
        )
        .constraint([
            Literal::Pos(area("A", "R", "C")),
            color.at("R", "C"),
            Literal::Neg(Atom::new(tag.as_str(), ["A", "R", "C"])),
        ]);

    debug!(%tag, statements = program.len(), "built area connectivity");
    program
}

fn src_tag(color: Option<&Predicate>, adj: AdjacencyKind) -> String {
    tag!("reachable", "grid", "src", "adj", adj, color)
}

/// Mark every cell reachable from `src` as `reachable_grid_src_adj_<kind>_<color>(r, c, R, C)`.
///
/// Cells in `include` must be reached and cells in `exclude` must not. Without a `color`, propagation runs over every
/// cell. Under [`AdjacencyKind::EdgeGated`], two reached cells may not sit on either side of a wall either.
pub fn grid_src_color_connected(
    src: Location,
    include: &[Location],
    exclude: &[Location],
    color: Option<&Predicate>,
    adj: AdjacencyKind,
) -> Program {
    let tag = src_tag(color, adj);
    let Location(r, c) = src;
    let reached = |r1: Term, c1: Term| Atom::new(tag.as_str(), [Term::from(r), Term::from(c), r1, c1]);

    let mut program = Program::new();
    program.fact(reached(r.into(), c.into()));
    for Location(r1, c1) in include {
        program.constraint([Literal::Neg(reached((*r1).into(), (*c1).into()))]);
    }
    for Location(r1, c1) in exclude {
        program.constraint([Literal::Pos(reached((*r1).into(), (*c1).into()))]);
    }

    let mut body = vec![Literal::Pos(reached("R1".into(), "C1".into())), grid_at("R", "C")];
    if let Some(color) = color {
        body.push(color.at("R", "C"));
    }
    body.push(adj.at("R", "C", "R1", "C1").into());
    program.rule(reached("R".into(), "C".into()), body);

    if adj == AdjacencyKind::EdgeGated {
        program
            .constraint([
                Literal::Pos(reached("R".into(), "C".into())),
                reached("R".into(), "C + 1".into()).into(),
                Atom::cell(EDGE_LEFT, "R", "C + 1").into(),
            ])
            .constraint([
                Literal::Pos(reached("R".into(), "C".into())),
                reached("R + 1".into(), "C".into()).into(),
                Atom::cell(EDGE_TOP, "R + 1", "C").into(),
            ]);
    }

    debug!(%tag, r, c, statements = program.len(), "built source connectivity");
    program
}

/// Every cell of `color` must be reached from some source registered with [`grid_src_color_connected`].
pub fn avoid_unknown_src(color: &Predicate, adj: AdjacencyKind) -> Program {
    let tag = src_tag(Some(color), adj);
    let mut program = Program::new();
    program.constraint([
        grid_at("R", "C"),
        color.at("R", "C"),
        Literal::Neg(Atom::new(tag.as_str(), ["_", "_", "R", "C"])),
    ]);
    program
}

/// Like [`grid_src_color_connected`], but only along the row and column of `src`, as light travels from a bulb.
pub fn bulb_src_color_connected(src: Location, color: &Predicate, adj: AdjacencyKind) -> Program {
    let tag = tag!("reachable", "bulb", "src", "adj", adj, color);
    let Location(r, c) = src;
    let reached = |r1: Term, c1: Term| Atom::new(tag.as_str(), [Term::from(r), Term::from(c), r1, c1]);

    let mut program = Program::new();
    program.fact(reached(r.into(), c.into())).rule(
        reached("R".into(), "C".into()),
        [
            Literal::Pos(reached("R1".into(), "C1".into())),
            grid_at("R", "C"),
            color.at("R", "C"),
            adj.at("R", "C", "R1", "C1").into(),
            Literal::expr(format!("(R - {r}) * (C - {c}) == 0")),
        ],
    );
    program
}

/// Bit positions needed to give each of `sources` sources a distinct binary id.
pub fn num_binary_range(sources: usize) -> Range<u32> {
    let nbit = match sources {
        0 | 1 => 1,
        n => usize::BITS - (n - 1).leading_zeros(),
    };
    0..nbit
}

/// Seed the bits of `id` at `src`: `clue_bit(r, c, b).` for set bits and `clue_no_bit(r, c, b).` for the rest.
pub fn clue_bit(src: Location, id: u64, bits: Range<u32>) -> Program {
    let Location(r, c) = src;
    let mut program = Program::new();
    for bit in bits {
        let name = if id.checked_shr(bit).unwrap_or(0) & 1 == 1 { "clue_bit" } else { "clue_no_bit" };
        program.fact(Atom::cell(name, r, c).with(Term::from(i64::from(bit))));
    }

    program
}

/// Connectivity of many labelled sources at once, tracked per bit of the source id rather than per source.
///
/// Presence and absence of each bit both flood through matching cells, so a group of matching cells can only be
/// reached from sources sharing one id, and every matching cell must be reached from some source seeded with
/// [`clue_bit`].
pub fn grid_bit_color_connected(color: &Predicate, adj: AdjacencyKind) -> Program {
    let present = tag!("reachable", "grid", "bit", "adj", adj, color);
    let absent = tag!("reachable", "grid", "no_bit", "adj", adj, color);

    let mut program = Program::new();
    for (tag, seed) in [(&present, "clue_bit"), (&absent, "clue_no_bit")] {
        program
            .rule(Atom::new(tag.as_str(), ["R", "C", "B"]), [Literal::Pos(Atom::new(seed, ["R", "C", "B"]))])
            .rule(
                Atom::new(tag.as_str(), ["R", "C", "B"]),
                [
                    Literal::Pos(Atom::new(tag.as_str(), ["R1", "C1", "B"])),
                    grid_at("R", "C"),
                    color.at("R", "C"),
                    adj.at("R", "C", "R1", "C1").into(),
                ],
            );
    }

    program
        .constraint([
            Literal::Pos(Atom::new(present.as_str(), ["R", "C", "B"])),
            Atom::new(absent.as_str(), ["R", "C", "B"]).into(),
        ])
        .constraint([
            grid_at("R", "C"),
            color.at("R", "C"),
            Literal::Neg(Atom::new(present.as_str(), ["R", "C", "_"])),
            Literal::Neg(Atom::new(absent.as_str(), ["R", "C", "_"])),
        ]);

    debug!(tag = %present, statements = program.len(), "built bit connectivity");
    program
}
