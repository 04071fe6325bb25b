//! Recognizing filled rectangles.
//!
//! [`all_rect`] and [`all_rect_region`] run a four-state automaton over the grid. Scanning from the top left, a cell is
//! `upleft` when it opens a rectangle, `up` along the rectangle's top row, `left` down its left column and `remain`
//! everywhere inside. A blob is a rectangle exactly when every cell gets a role and no role leaks outside the blob.

use itertools::Itertools;
use tracing::debug;

use crate::common::{grid_at, EDGE_LEFT, EDGE_TOP, GRID};
use crate::error::{Error, Result};
use crate::location::{Coord, Location};
use crate::predicate::Predicate;
use crate::program::{shifted, Atom, Literal, Program, Term};
use crate::tag;

/// Role names of the automaton, in the order `upleft`, `left`, `up`, `remain`.
struct Roles {
    upleft: String,
    left: String,
    up: String,
    remain: String,
}

impl Roles {
    /// `upleft_<color>` and so on.
    fn for_color(color: &Predicate) -> Self {
        Self {
            upleft: tag!("upleft", color),
            left: tag!("left", color),
            up: tag!("up", color),
            remain: tag!("remain", color),
        }
    }

    /// `region_upleft` and so on. Color roles always start with the role, so the two sets are disjoint.
    fn for_region() -> Self {
        Self {
            upleft: tag!("region", "upleft"),
            left: tag!("region", "left"),
            up: tag!("region", "up"),
            remain: tag!("region", "remain"),
        }
    }
}

fn role(name: &str, r: &str, c: &str) -> Literal {
    Literal::Pos(Atom::cell(name, r, c))
}

/// Ways for the cell at `(r, c)` not to match `color`. Outside the grid always counts.
fn unmatched(color: &Predicate, r: &str, c: &str) -> Vec<Vec<Literal>> {
    match color {
        Predicate::Positive(_) => vec![vec![color.not_at(r, c)]],
        Predicate::Negated(_) => vec![vec![Literal::Neg(Atom::cell(GRID, r, c))], vec![color.not_at(r, c)]],
    }
}

/// Every connected group of `color` cells is a filled rectangle, or a square if `square` is set.
pub fn all_rect(color: &Predicate, square: bool) -> Program {
    let roles = Roles::for_color(color);
    let matched = || vec![grid_at("R", "C"), color.at("R", "C")];
    let mut program = Program::new();

    let (lefts, ups) = (unmatched(color, "R", "C - 1"), unmatched(color, "R - 1", "C"));
    for (left, up) in lefts.iter().cartesian_product(&ups) {
        program.rule(Atom::cell(roles.upleft.as_str(), "R", "C"), matched().into_iter().chain(left.clone()).chain(up.clone()));
    }
    for left in &lefts {
        for above in [&roles.upleft, &roles.left] {
            let body = matched().into_iter().chain([role(above, "R - 1", "C")]).chain(left.clone());
            program.rule(Atom::cell(roles.left.as_str(), "R", "C"), body);
        }
    }
    for up in &ups {
        for before in [&roles.upleft, &roles.up] {
            let body = matched().into_iter().chain([role(before, "R", "C - 1")]).chain(up.clone());
            program.rule(Atom::cell(roles.up.as_str(), "R", "C"), body);
        }
    }
    for (before, above) in [&roles.left, &roles.remain].into_iter().cartesian_product([&roles.up, &roles.remain]) {
        program.rule(
            Atom::cell(roles.remain.as_str(), "R", "C"),
            [grid_at("R", "C"), role(before, "R", "C - 1"), role(above, "R - 1", "C")],
        );
    }

    program
        .constraint(
            matched()
                .into_iter()
                .chain([&roles.upleft, &roles.left, &roles.up, &roles.remain].map(|name| Literal::Neg(Atom::cell(name.as_str(), "R", "C")))),
        )
        .constraint([grid_at("R", "C"), role(&roles.remain, "R", "C"), color.not_at("R", "C")]);

    if square {
        let height = format!(
            "MR = #min {{ R1: grid(R1, C), {}, R1 > R; R1 + 1: grid(R1, C), not grid(R1 + 1, C) }}",
            color.not_at("R1", "C")
        );
        let width = format!(
            "MC = #min {{ C1: grid(R, C1), {}, C1 > C; C1 + 1: grid(R, C1), not grid(R, C1 + 1) }}",
            color.not_at("R", "C1")
        );
        program
            .constraint([
                grid_at("R", "C"),
                role(&roles.upleft, "R", "C"),
                Literal::expr(height),
                Literal::expr(width),
                Literal::expr("MR - R != MC - C"),
            ])
            .constraint([
                role(&roles.upleft, "R", "C"),
                role(&roles.left, "R + 1", "C"),
                Literal::Neg(Atom::cell(roles.up.as_str(), "R", "C + 1")),
            ])
            .constraint([
                role(&roles.upleft, "R", "C"),
                role(&roles.up, "R", "C + 1"),
                Literal::Neg(Atom::cell(roles.left.as_str(), "R + 1", "C")),
            ]);
    }

    debug!(color = %color, square, statements = program.len(), "built rectangle automaton");
    program
}

fn wall(name: &str, r: &str, c: &str) -> Literal {
    Literal::Pos(Atom::cell(name, r, c))
}

fn no_wall(name: &str, r: &str, c: &str) -> Literal {
    Literal::Neg(Atom::cell(name, r, c))
}

/// Every region bounded by `edge_left`/`edge_top` walls is a rectangle, or a square if `square` is set.
///
/// Expects the outer border walls from [`edge`](crate::common::edge).
pub fn all_rect_region(square: bool) -> Program {
    let roles = Roles::for_region();
    let mut program = Program::new();

    program.rule(
        Atom::cell(roles.upleft.as_str(), "R", "C"),
        [grid_at("R", "C"), wall(EDGE_LEFT, "R", "C"), wall(EDGE_TOP, "R", "C")],
    );
    for above in [&roles.upleft, &roles.left] {
        program.rule(
            Atom::cell(roles.left.as_str(), "R", "C"),
            [grid_at("R", "C"), wall(EDGE_LEFT, "R", "C"), no_wall(EDGE_TOP, "R", "C"), role(above, "R - 1", "C")],
        );
    }
    for before in [&roles.upleft, &roles.up] {
        program.rule(
            Atom::cell(roles.up.as_str(), "R", "C"),
            [grid_at("R", "C"), wall(EDGE_TOP, "R", "C"), no_wall(EDGE_LEFT, "R", "C"), role(before, "R", "C - 1")],
        );
    }
    for (before, above) in [&roles.left, &roles.remain].into_iter().cartesian_product([&roles.up, &roles.remain]) {
        program.rule(
            Atom::cell(roles.remain.as_str(), "R", "C"),
            [
                grid_at("R", "C"),
                no_wall(EDGE_LEFT, "R", "C"),
                no_wall(EDGE_TOP, "R", "C"),
                role(before, "R", "C - 1"),
                role(above, "R - 1", "C"),
            ],
        );
    }
    program.constraint(
        [grid_at("R", "C")]
            .into_iter()
            .chain([&roles.upleft, &roles.left, &roles.up, &roles.remain].map(|name| Literal::Neg(Atom::cell(name.as_str(), "R", "C")))),
    );

    // Two cells joined without a wall share their walls on the sides parallel to the join.
    let joins = [
        ("R", "C + 1", EDGE_LEFT, "R", "C + 1", EDGE_TOP, [("R", "C"), ("R", "C + 1")]),
        ("R", "C + 1", EDGE_LEFT, "R", "C + 1", EDGE_TOP, [("R + 1", "C"), ("R + 1", "C + 1")]),
        ("R + 1", "C", EDGE_TOP, "R + 1", "C", EDGE_LEFT, [("R", "C"), ("R + 1", "C")]),
        ("R + 1", "C", EDGE_TOP, "R + 1", "C", EDGE_LEFT, [("R", "C + 1"), ("R + 1", "C + 1")]),
    ];
    for (r1, c1, join, jr, jc, side, [(ar, ac), (br, bc)]) in joins {
        for (a, b) in [(wall(side, ar, ac), no_wall(side, br, bc)), (no_wall(side, ar, ac), wall(side, br, bc))] {
            program.constraint([grid_at("R", "C"), grid_at(r1, c1), no_wall(join, jr, jc), a, b]);
        }
    }

    if square {
        program.constraint([
            role(&roles.upleft, "R", "C"),
            Literal::expr("MR = #min { R1: edge_top(R1, C), R1 > R }"),
            Literal::expr("MC = #min { C1: edge_left(R, C1), C1 > C }"),
            Literal::expr("MR - R != MC - C"),
        ]);
    }

    debug!(square, statements = program.len(), "built region rectangle automaton");
    program
}

/// Forbid an `height` by `width` block of `color` anchored at `corner`, or anywhere without one.
pub fn avoid_rect(height: Coord, width: Coord, color: &Predicate, corner: Option<Location>) -> Result<Program> {
    if height <= 0 || width <= 0 {
        return Err(Error::InvalidGrid { rows: height, cols: width });
    }

    let (r, c) = match corner {
        Some(Location(r, c)) => (Term::from(r), Term::from(c)),
        None => (Term::from("R"), Term::from("C")),
    };
    let mut body = Vec::new();
    for (dr, dc) in (0..height).cartesian_product(0..width) {
        let (r, c) = (shifted(&r, dr), shifted(&c, dc));
        if color.is_negated() {
            body.push(grid_at(r.clone(), c.clone()));
        }
        body.push(color.at(r, c));
    }

    let mut program = Program::new();
    program.constraint(body);
    Ok(program)
}

/// No connected group of `color` cells is a filled rectangle.
///
/// A 2x2 window with exactly one unmatched corner seeds its other three cells, the seed spreads through matching cells
/// under `adj_4`, and every matching cell must be seeded. A rectangle never contains such a window.
pub fn no_rect(color: &Predicate) -> Program {
    let tag = tag!("no_rect", color);
    let window = [("R", "C"), ("R", "C + 1"), ("R + 1", "C"), ("R + 1", "C + 1")];
    let mut program = Program::new();

    for (missing, &(mr, mc)) in window.iter().enumerate() {
        let mut body = vec![grid_at("R", "C"), grid_at("R + 1", "C + 1"), color.not_at(mr, mc)];
        for (index, &(r, c)) in window.iter().enumerate() {
            if index != missing {
                body.push(color.at(r, c));
            }
        }

        for (index, &(r, c)) in window.iter().enumerate() {
            if index != missing {
                program.rule(Atom::cell(tag.as_str(), r, c), body.clone());
            }
        }
    }

    program
        .rule(
            Atom::cell(tag.as_str(), "R", "C"),
            [
                Literal::Pos(Atom::cell(tag.as_str(), "R1", "C1")),
                grid_at("R", "C"),
                color.at("R", "C"),
                Literal::Pos(Atom::new("adj_4", ["R", "C", "R1", "C1"])),
            ],
        )
        .constraint([grid_at("R", "C"), color.at("R", "C"), Literal::Neg(Atom::cell(tag.as_str(), "R", "C"))]);

    debug!(%tag, statements = program.len(), "built rectangle absence");
    program
}

/// No four walls may meet at one interior vertex.
pub fn avoid_region_border_crossover() -> Program {
    let mut program = Program::new();
    program.constraint([
        wall(EDGE_LEFT, "R", "C + 1"),
        wall(EDGE_LEFT, "R + 1", "C + 1"),
        wall(EDGE_TOP, "R + 1", "C"),
        wall(EDGE_TOP, "R + 1", "C + 1"),
    ]);
    program
}
