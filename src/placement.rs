//! Detecting occurrences of polyominoes among the cells of one color.
//!
//! [`general_shape`] registers a shape under a name and id. It defines a detector
//! `shape_<container>_<name>_<color>(R, C, Id, V)` that holds when the shape in orientation `V` is rooted at `(R, C)`,
//! and a membership relation `belong_to_shape_<container>_<name>_<color>(R, C, Id, V)` for each covered cell.
//! When ranging over areas, both carry the area as an extra first argument.

use itertools::Itertools;
use strum::VariantArray;
use tracing::debug;

use crate::adjacency::AdjacencyKind;
use crate::common::Container;
use crate::context::Context;
use crate::direction::Direction;
use crate::error::Result;
use crate::location::Location;
use crate::predicate::Predicate;
use crate::program::{shifted, Atom, Literal, Program, Target, Term};
use crate::shape::{canonicalize, Shape, Symmetry};
use crate::tag;

fn detector(name: &str, color: &Predicate, container: Container) -> String {
    tag!("shape", container, name, color)
}

fn membership(name: &str, color: &Predicate, container: Container) -> String {
    tag!("belong_to_shape", container, name, color)
}

fn touch(name: &str, color: &Predicate, adj: AdjacencyKind) -> String {
    tag!("touch_shape", name, adj, color)
}

fn at(offset: Location) -> (Term, Term) {
    (shifted(&Term::from("R"), offset.0), shifted(&Term::from("C"), offset.1))
}

/// Offsets next to the shape under `adj`, by geometry, that the shape does not cover.
fn outside_neighbors(variant: &Shape, adj: AdjacencyKind) -> Vec<(Location, Location)> {
    let diagonals = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
    let steps = Direction::VARIANTS.iter().map(Direction::delta).chain(diagonals);

    variant
        .cells()
        .iter()
        .cartesian_product(steps.collect_vec())
        .map(|(cell, step)| (*cell, cell.offset_by(step)))
        .filter(|(cell, neighbor)| adj.geometric(*cell, *neighbor) && !variant.contains(*neighbor))
        .collect_vec()
}

/// Register `deltas` as shape `id` under `name`, detecting it in every rotation and reflection.
///
/// Each orientation requires all of its cells to lie in the container and match `color`, and requires `adj` to hold
/// between every pair of cells that touch within the shape. Unless `simple` is set, an occurrence is also rejected when
/// a cell of `color` outside the shape touches it under `adj`, so that a larger blob is not mistaken for the shape.
#[allow(clippy::too_many_arguments)]
pub fn general_shape(
    ctx: &Context,
    name: &str,
    id: i64,
    deltas: &[Location],
    color: &Predicate,
    container: Container,
    adj: AdjacencyKind,
    simple: bool,
) -> Result<Program> {
    let shape = canonicalize(deltas)?;
    let variants = ctx.variants(&shape, Symmetry::FULL);
    let detector = detector(name, color, container);
    let membership = membership(name, color, container);
    let touch = touch(name, color, adj);

    let mut program = Program::new();
    if !simple {
        program.rule(
            Atom::cell(touch.as_str(), "R", "C").with("R1").with("C1"),
            [adj.at("R", "C", "R1", "C1").into(), color.at("R1", "C1")],
        );
    }

    for (index, variant) in variants.iter().enumerate() {
        let mut body = Vec::new();
        for cell in variant.cells() {
            let (r, c) = at(*cell);
            body.push(container.at(r.clone(), c.clone()));
            body.push(color.at(r, c));
        }

        for (a, b) in variant.cells().iter().tuple_combinations() {
            if adj.geometric(*a, *b) {
                let ((r, c), (r1, c1)) = (at(*a), at(*b));
                body.push(adj.at(r, c, r1, c1).into());
            }
        }

        if !simple {
            for (cell, neighbor) in outside_neighbors(variant, adj) {
                let ((r, c), (r1, c1)) = (at(cell), at(neighbor));
                body.push(Literal::Neg(Atom::cell(touch.as_str(), r, c).with(r1).with(c1)));
            }
        }

        let root = container.keyed(&detector, [Term::from("R"), Term::from("C"), Term::from(id), Term::from(index)]);
        program.rule(root.clone(), body);

        for cell in variant.cells() {
            let (r, c) = at(*cell);
            program.rule(
                container.keyed(&membership, [r, c, Term::from(id), Term::from(index)]),
                [root.clone().into()],
            );
        }
    }

    debug!(shape = name, id, variants = variants.len(), statements = program.len(), "built shape detector");
    Ok(program)
}

/// Every cell of `color` must be covered by some detected occurrence of some shape registered under `name`.
pub fn all_shapes(name: &str, color: &Predicate, container: Container) -> Program {
    let membership = membership(name, color, container);
    let mut program = Program::new();
    program.constraint([
        container.at("R", "C"),
        color.at("R", "C"),
        Literal::Neg(container.keyed(&membership, ["R", "C", "_", "_"].map(Term::from))),
    ]);
    program
}

/// Constrain the number of detected occurrences of shapes registered under `name`, or only of shape `id`.
///
/// Over areas, the count applies to each area separately.
pub fn count_shape(target: Target, name: &str, id: Option<i64>, color: &Predicate, container: Container) -> Program {
    let detector = detector(name, color, container);
    let (op, value) = target.encode();
    let (vars, id) = match id {
        Some(id) => ("R, C, V", Term::from(id)),
        None => ("R, C, I, V", Term::from("I")),
    };
    let element = container.keyed(&detector, [Term::from("R"), Term::from("C"), id, Term::from("V")]);
    let aggregate = Literal::expr(format!("#count {{ {vars}: {element} }} {} {value}", op.symbol()));

    let mut program = Program::new();
    match container {
        Container::Grid => program.constraint([aggregate]),
        Container::Area => program.constraint([Literal::expr("area(A, _, _)"), aggregate]),
    };
    program
}
