//! Facts and rules shared by nearly every puzzle: the grid itself, areas, shading choices and counts.

use std::str::FromStr;

use strum::{EnumString, VariantArray};

use crate::direction::Direction;
use crate::error::{Error, Result};
use crate::location::{Coord, Location};
use crate::predicate::Predicate;
use crate::program::{Atom, ChoiceElement, Comparator, Literal, Program, Target, Term};

pub(crate) const GRID: &str = "grid";
pub(crate) const AREA: &str = "area";
/// Wall on the left side of a cell.
pub(crate) const EDGE_LEFT: &str = "edge_left";
/// Wall on the top side of a cell.
pub(crate) const EDGE_TOP: &str = "edge_top";
pub(crate) const GRID_DIRECTION: &str = "grid_direction";
pub(crate) const GRID_IN: &str = "grid_in";
pub(crate) const GRID_OUT: &str = "grid_out";

/// `grid(r, c)`
pub(crate) fn grid_at(r: impl Into<Term>, c: impl Into<Term>) -> Literal {
    Literal::Pos(Atom::cell(GRID, r, c))
}

/// What a template ranges over: the whole grid, or each area separately.
#[derive(Copy, Clone, Debug, EnumString, Eq, Hash, PartialEq, VariantArray)]
#[strum(serialize_all = "lowercase")]
pub enum Container {
    /// Every cell of the grid at once.
    Grid,
    /// Each area on its own.
    Area,
}

impl Container {
    /// Parse `grid` or `area`.
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| Error::UnsupportedContainer(name.to_owned()))
    }

    /// The membership predicate, `grid` or `area`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Grid => GRID,
            Self::Area => AREA,
        }
    }

    /// Membership of `(r, c)`; areas are bound to the variable `A`.
    pub(crate) fn at(&self, r: impl Into<Term>, c: impl Into<Term>) -> Literal {
        match self {
            Self::Grid => grid_at(r, c),
            Self::Area => Literal::Pos(Atom::new(AREA, [Term::from("A"), r.into(), c.into()])),
        }
    }

    /// Prefix `args` with the area variable when ranging over areas.
    pub(crate) fn keyed(&self, name: &str, args: impl IntoIterator<Item = Term>) -> Atom {
        let key = match self {
            Self::Grid => None,
            Self::Area => Some(Term::from("A")),
        };
        Atom::new(name, key.into_iter().chain(args))
    }
}

/// `grid(0..rows-1, 0..cols-1).`
pub fn grid(rows: Coord, cols: Coord) -> Result<Program> {
    if rows <= 0 || cols <= 0 {
        return Err(Error::InvalidGrid { rows, cols });
    }

    let mut program = Program::new();
    program.fact(Atom::cell(GRID, format!("0..{}", rows - 1), format!("0..{}", cols - 1)));
    Ok(program)
}

/// One `area(id, r, c).` fact per cell.
pub fn area(id: i64, cells: impl IntoIterator<Item = Location>) -> Program {
    let mut program = Program::new();
    for Location(r, c) in cells {
        program.fact(Atom::new(AREA, [Term::from(id), r.into(), c.into()]));
    }

    program
}

/// `#show item/arity.`
pub fn display(item: &str, arity: usize) -> Program {
    let mut program = Program::new();
    program.directive(format!("#show {item}/{arity}"));
    program
}

/// `#defined item/arity.`, silencing warnings for predicates that may have no facts.
pub fn defined(item: &str, arity: usize) -> Program {
    let mut program = Program::new();
    program.directive(format!("#defined {item}/{arity}"));
    program
}

/// Let the solver freely shade cells of the container with `color`.
pub fn shade_c(color: &Predicate, container: Container) -> Result<Program> {
    let name = color.require_positive()?;
    let mut program = Program::new();
    let cell = Atom::cell(name, "R", "C");
    match container {
        Container::Grid => program.choice([cell.into()], None, [grid_at("R", "C")]),
        Container::Area => program.choice([cell.into()], None, [Literal::expr("area(_, R, C)")]),
    };

    Ok(program)
}

/// Every cell takes exactly one of `colors`.
pub fn shade_cc(colors: &[Predicate]) -> Result<Program> {
    let elements = colors
        .iter()
        .map(|color| Ok(ChoiceElement::from(Atom::cell(color.require_positive()?, "R", "C"))))
        .collect::<Result<Vec<_>>>()?;

    let mut program = Program::new();
    program.choice(elements, Some((Comparator::Eq, 1)), [grid_at("R", "C")]);
    Ok(program)
}

/// Derive `invert` on every cell where `color` does not hold.
pub fn invert_c(color: &Predicate, invert: &Predicate) -> Result<Program> {
    let mut program = Program::new();
    program.rule(Atom::cell(invert.require_positive()?, "R", "C"), [grid_at("R", "C"), color.not_at("R", "C")]);
    Ok(program)
}

/// Constrain the number of cells with `color`, over the whole grid or per area.
///
/// With [`Container::Area`] and an `id`, only that area is constrained; without one, every area is.
pub fn count(target: Target, color: &Predicate, container: Container, id: Option<i64>) -> Program {
    let (op, value) = target.encode();
    let mut program = Program::new();
    match (container, id) {
        (Container::Grid, _) => program.constraint([Literal::expr(format!(
            "#count {{ R, C: grid(R, C), {} }} {} {value}",
            color.at("R", "C"),
            op.symbol()
        ))]),
        (Container::Area, Some(id)) => program.constraint([Literal::expr(format!(
            "#count {{ R, C: area({id}, R, C), {} }} {} {value}",
            color.at("R", "C"),
            op.symbol()
        ))]),
        (Container::Area, None) => program.constraint([
            Literal::expr("area(A, _, _)"),
            Literal::expr(format!("#count {{ R, C: area(A, R, C), {} }} {} {value}", color.at("R", "C"), op.symbol())),
        ]),
    };

    program
}

/// Free choice of interior walls, with the outer border always walled.
pub fn edge(rows: Coord, cols: Coord) -> Result<Program> {
    if rows <= 0 || cols <= 0 {
        return Err(Error::InvalidGrid { rows, cols });
    }

    let mut program = Program::new();
    program
        .choice([Atom::cell(EDGE_LEFT, "R", "C").into()], None, [grid_at("R", "C"), Literal::expr("C > 0")])
        .choice([Atom::cell(EDGE_TOP, "R", "C").into()], None, [grid_at("R", "C"), Literal::expr("R > 0")])
        .rule(Atom::cell(EDGE_LEFT, "R", 0), [grid_at("R", 0)])
        .rule(Atom::cell(EDGE_LEFT, "R", cols), [grid_at("R", cols - 1)])
        .rule(Atom::cell(EDGE_TOP, 0, "C"), [grid_at(0, "C")])
        .rule(Atom::cell(EDGE_TOP, rows, "C"), [grid_at(rows - 1, "C")]);
    Ok(program)
}

/// `direction(d).` for every side a path may use.
pub fn direction(dirs: &[Direction]) -> Program {
    let mut program = Program::new();
    for dir in dirs {
        program.fact(Atom::new("direction", [Term::Str(dir.letter().into())]));
    }

    program
}
