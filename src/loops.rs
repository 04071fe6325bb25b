//! Loop and path topology over direction facts.
//!
//! `grid_direction(R, C, D)` says the undirected loop leaves `(R, C)` through side `D`, one of `"l"`, `"u"`, `"r"`,
//! `"d"`. Directed loops use `grid_in` and `grid_out` instead, naming the side a path enters or leaves through.

use strum::VariantArray;
use tracing::debug;

use crate::common::{grid_at, GRID_DIRECTION, GRID_IN, GRID_OUT};
use crate::direction::Direction;
use crate::location::Location;
use crate::predicate::Predicate;
use crate::program::{shifted, Atom, ChoiceElement, Literal, Program, Term};
use crate::tag;

const PASS_BY: &str = "pass_by_loop";
const DEAD_END: &str = "dead_end";
const PATH_START: &str = "path_start";
const PATH_END: &str = "path_end";
const OUTSIDE: &str = "outside_loop";

fn side(fact: &str, r: impl Into<Term>, c: impl Into<Term>, dir: Direction) -> Atom {
    Atom::cell(fact, r, c).with(Term::Str(dir.letter().into()))
}

fn degree(fact: &str) -> String {
    format!("#count {{ D: {fact}(R, C, D) }}")
}

/// Let the solver choose direction facts on cells of `color`, and forbid them elsewhere.
pub fn fill_path(color: &Predicate, directed: bool) -> Program {
    let facts: &[&str] = if directed { &[GRID_IN, GRID_OUT] } else { &[GRID_DIRECTION] };
    let mut program = Program::new();
    for fact in facts {
        let element = ChoiceElement {
            atom: Atom::cell(*fact, "R", "C").with("D"),
            condition: vec![Literal::Pos(Atom::new("direction", ["D"]))],
        };
        program.choice([element], None, [grid_at("R", "C"), color.at("R", "C")]).constraint([
            grid_at("R", "C"),
            Literal::Pos(Atom::cell(*fact, "R", "C").with("_")),
            color.not_at("R", "C"),
        ]);
    }

    program
}

/// Every direction a cell uses must be answered by the opposite direction on the neighbor it points at.
fn mirrored(program: &mut Program) {
    for dir in Direction::VARIANTS {
        let (dr, dc) = dir.delta();
        let (r1, c1) = (shifted(&Term::from("R"), dr), shifted(&Term::from("C"), dc));
        program.constraint([
            grid_at("R", "C"),
            Literal::Pos(side(GRID_DIRECTION, "R", "C", *dir)),
            Literal::Neg(side(GRID_DIRECTION, r1, c1, dir.invert())),
        ]);
    }
}

fn pass_by(program: &mut Program, color: &Predicate, degrees: &[i64], path: bool) {
    for n in degrees {
        program.rule(
            Atom::cell(PASS_BY, "R", "C"),
            [grid_at("R", "C"), Literal::expr(format!("{} = {n}", degree(GRID_DIRECTION)))],
        );
    }

    if path {
        program
            .constraint([
                grid_at("R", "C"),
                color.at("R", "C"),
                Literal::Neg(Atom::cell(DEAD_END, "R", "C")),
                Literal::Neg(Atom::cell(PASS_BY, "R", "C")),
            ])
            .constraint([
                grid_at("R", "C"),
                Literal::Pos(Atom::cell(DEAD_END, "R", "C")),
                Literal::expr(format!("{} != 1", degree(GRID_DIRECTION))),
            ]);
    } else {
        program.constraint([grid_at("R", "C"), color.at("R", "C"), Literal::Neg(Atom::cell(PASS_BY, "R", "C"))]);
    }

    mirrored(program);
}

/// Cells of `color` form loops: each has exactly two directions, answered by its neighbors.
///
/// With `path`, cells the caller marks `dead_end(R, C)` end the path instead and have exactly one direction.
pub fn single_loop(color: &Predicate, path: bool) -> Program {
    let mut program = Program::new();
    pass_by(&mut program, color, &[2], path);
    debug!(color = %color, path, statements = program.len(), "built single loop");
    program
}

/// Like [`single_loop`], except that a cell using all four directions is a crossing and also allowed.
pub fn intersect_loop(color: &Predicate, path: bool) -> Program {
    let mut program = Program::new();
    pass_by(&mut program, color, &[2, 4], path);
    debug!(color = %color, path, statements = program.len(), "built intersecting loop");
    program
}

/// Cells of `color` form directed loops: one way in, one different way out, agreeing with the neighbors.
///
/// With `path`, exactly one matching cell has no way in (`path_start`) and exactly one has no way out (`path_end`).
pub fn directed_loop(color: &Predicate, path: bool) -> Program {
    let matched = || [grid_at("R", "C"), color.at("R", "C")];
    let mut program = Program::new();

    if path {
        for (marker, fact) in [(PATH_START, GRID_IN), (PATH_END, GRID_OUT)] {
            program
                .rule(
                    Atom::cell(marker, "R", "C"),
                    matched().into_iter().chain([Literal::expr(format!("{} = 0", degree(fact)))]),
                )
                .constraint([Literal::expr(format!("#count {{ R, C: {marker}(R, C) }} != 1"))])
                .constraint(matched().into_iter().chain([Literal::expr(format!("{} > 1", degree(fact)))]));
        }
        program.constraint([
            Literal::Pos(Atom::cell(PATH_START, "R", "C")),
            Literal::Pos(Atom::cell(PATH_END, "R", "C")),
        ]);
    } else {
        for fact in [GRID_IN, GRID_OUT] {
            program.constraint(matched().into_iter().chain([Literal::expr(format!("{} != 1", degree(fact)))]));
        }
    }

    program.constraint([
        grid_at("R", "C"),
        Literal::Pos(Atom::cell(GRID_IN, "R", "C").with("D")),
        Literal::Pos(Atom::cell(GRID_OUT, "R", "C").with("D")),
    ]);

    for dir in Direction::VARIANTS {
        let (dr, dc) = dir.delta();
        let (r1, c1) = (shifted(&Term::from("R"), dr), shifted(&Term::from("C"), dc));
        for (here, there) in [(GRID_IN, GRID_OUT), (GRID_OUT, GRID_IN)] {
            program.constraint([
                grid_at("R", "C"),
                Literal::Pos(side(here, "R", "C", *dir)),
                Literal::Neg(side(there, r1.clone(), c1.clone(), dir.invert())),
            ]);
        }
    }

    debug!(color = %color, path, statements = program.len(), "built directed loop");
    program
}

/// The six ways a loop can pass through a cell, named by the glyph they resemble.
const SIGNS: [(&str, Direction, Direction); 6] = [
    ("J", Direction::Left, Direction::Up),
    ("7", Direction::Left, Direction::Down),
    ("L", Direction::Up, Direction::Right),
    ("r", Direction::Down, Direction::Right),
    ("-", Direction::Left, Direction::Right),
    ("1", Direction::Up, Direction::Down),
];

/// `loop_sign_<color>(R, C, S)`: the shape `S` the loop makes through a cell of `color`.
pub fn loop_sign(color: &Predicate) -> Program {
    let tag = tag!("loop_sign", color);
    let mut program = Program::new();
    for (sign, a, b) in SIGNS {
        program.rule(
            Atom::cell(tag.as_str(), "R", "C").with(Term::Str(sign.into())),
            [
                grid_at("R", "C"),
                color.at("R", "C"),
                Literal::Pos(side(GRID_DIRECTION, "R", "C", a)),
                Literal::Pos(side(GRID_DIRECTION, "R", "C", b)),
            ],
        );
    }

    program
}

/// `loop_segment(r, c, C1, C2, "H")` and `loop_segment(r, c, R1, R2, "V")`: the straight runs of the loop through
/// `src`, from the nearest cell not joined to its predecessor up to the nearest cell not joined to its successor.
pub fn loop_segment(src: Location) -> Program {
    let Location(r, c) = src;
    let mut program = Program::new();
    program
        .rule(
            Atom::cell("loop_segment", r, c).with("C1").with("C2").with(Term::Str("H".into())),
            [
                Literal::expr(format!("C1 = #max {{ C0: grid({r}, C0), C0 <= {c}, not grid_direction({r}, C0, \"l\") }}")),
                Literal::expr(format!("C2 = #min {{ C0: grid({r}, C0), C0 >= {c}, not grid_direction({r}, C0, \"r\") }}")),
            ],
        )
        .rule(
            Atom::cell("loop_segment", r, c).with("R1").with("R2").with(Term::Str("V".into())),
            [
                Literal::expr(format!("R1 = #max {{ R0: grid(R0, {c}), R0 <= {r}, not grid_direction(R0, {c}, \"u\") }}")),
                Literal::expr(format!("R2 = #min {{ R0: grid(R0, {c}), R0 >= {r}, not grid_direction(R0, {c}, \"d\") }}")),
            ],
        );
    program
}

/// `loop_straight_<color>(R, C)`: the loop runs straight through a cell of `color`.
pub fn loop_straight(color: &Predicate) -> Program {
    let tag = tag!("loop_straight", color);
    let mut program = Program::new();
    for (a, b) in [(Direction::Left, Direction::Right), (Direction::Up, Direction::Down)] {
        program.rule(
            Atom::cell(tag.as_str(), "R", "C"),
            [
                grid_at("R", "C"),
                color.at("R", "C"),
                Literal::Pos(side(GRID_DIRECTION, "R", "C", a)),
                Literal::Pos(side(GRID_DIRECTION, "R", "C", b)),
            ],
        );
    }

    program
}

/// `loop_turning_<color>(R, C)`: the loop turns in a cell of `color`.
pub fn loop_turning(color: &Predicate) -> Program {
    let tag = tag!("loop_turning", color);
    let mut program = Program::new();
    for horizontal in [Direction::Left, Direction::Right] {
        for vertical in [Direction::Up, Direction::Down] {
            program.rule(
                Atom::cell(tag.as_str(), "R", "C"),
                [
                    grid_at("R", "C"),
                    color.at("R", "C"),
                    Literal::Pos(side(GRID_DIRECTION, "R", "C", horizontal)),
                    Literal::Pos(side(GRID_DIRECTION, "R", "C", vertical)),
                ],
            );
        }
    }

    program
}

/// Place cells of `inside` within the loop and cells of `outside` out of it.
///
/// Each column is scanned downward from a virtual row above the grid; the `outside_loop` flag flips whenever the cell
/// above joins its left neighbor, i.e. a loop edge crosses the scan line just left of the cell centers.
pub fn separate_item_from_loop(inside: Option<&Predicate>, outside: Option<&Predicate>) -> Program {
    let mut program = Program::new();
    program
        .rule(Atom::cell(OUTSIDE, -1, "C"), [grid_at("_", "C")])
        .rule(
            Atom::cell(OUTSIDE, "R", "C"),
            [
                grid_at("R", "C"),
                Literal::Pos(Atom::cell(OUTSIDE, "R - 1", "C")),
                Literal::Neg(side(GRID_DIRECTION, "R - 1", "C", Direction::Left)),
            ],
        )
        .rule(
            Atom::cell(OUTSIDE, "R", "C"),
            [
                grid_at("R", "C"),
                Literal::Neg(Atom::cell(OUTSIDE, "R - 1", "C")),
                Literal::Pos(side(GRID_DIRECTION, "R - 1", "C", Direction::Left)),
            ],
        );

    if let Some(inside) = inside {
        program.constraint([grid_at("R", "C"), inside.at("R", "C"), Literal::Pos(Atom::cell(OUTSIDE, "R", "C"))]);
    }
    if let Some(outside) = outside {
        program.constraint([grid_at("R", "C"), outside.at("R", "C"), Literal::Neg(Atom::cell(OUTSIDE, "R", "C"))]);
    }

    program
}
