//! Polyominoes as sets of cell offsets, and their orientations under rotation and reflection.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::error::{Error, Result};
use crate::location::Location;

/// A non-empty set of offsets in canonical form: sorted by `(row, col)` and translated so the smallest offset is `(0, 0)`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Shape {
    cells: Vec<Location>,
}

/// Sort `offsets` and translate them so the smallest becomes `(0, 0)`.
///
/// Duplicate offsets are merged. Canonicalizing an already canonical shape returns it unchanged.
pub fn canonicalize(offsets: &[Location]) -> Result<Shape> {
    let mut cells = offsets.iter().copied().sorted().dedup().collect_vec();
    let Some(&Location(dr, dc)) = cells.first() else {
        return Err(Error::EmptyShape);
    };

    for cell in cells.iter_mut() {
        *cell = cell.offset_by((-dr, -dc));
    }

    Ok(Shape { cells })
}

impl Shape {
    /// Build a shape from `(dr, dc)` pairs.
    pub fn new(offsets: impl IntoIterator<Item = (i32, i32)>) -> Result<Self> {
        canonicalize(&offsets.into_iter().map(Location::from).collect_vec())
    }

    /// The offsets, in canonical order.
    pub fn cells(&self) -> &[Location] {
        &self.cells
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false for a constructed shape.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `offset` is one of the cells.
    pub fn contains(&self, offset: Location) -> bool {
        self.cells.binary_search(&offset).is_ok()
    }

    /// Apply `f` to every cell and canonicalize the result.
    pub fn map(&self, f: impl Fn(Location) -> Location) -> Self {
        let mut cells = self.cells.iter().copied().map(f).sorted().dedup().collect_vec();
        // a non-empty shape stays non-empty under any map
        let Location(dr, dc) = cells[0];
        for cell in cells.iter_mut() {
            *cell = cell.offset_by((-dr, -dc));
        }

        Self { cells }
    }

    /// Quarter turn, `(r, c) -> (-c, r)`.
    pub fn rotate(&self) -> Self {
        self.map(|Location(r, c)| Location(-c, r))
    }

    /// Mirror, `(r, c) -> (-r, c)`.
    pub fn reflect(&self) -> Self {
        self.map(|Location(r, c)| Location(-r, c))
    }

    /// Height and width of the bounding box.
    pub fn extent(&self) -> (i32, i32) {
        let (min_c, max_c) = self.cells.iter().map(|cell| cell.1).minmax().into_option().unwrap_or((0, 0));
        let max_r = self.cells.iter().map(|cell| cell.0).max().unwrap_or(0);
        (max_r + 1, max_c - min_c + 1)
    }
}

impl Display for Shape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let min_c = self.cells.iter().map(|cell| cell.1).min().unwrap_or(0);
        let (rows, cols) = self.extent();
        for r in 0..rows {
            for c in min_c..min_c + cols {
                write!(f, "{}", if self.contains(Location(r, c)) { '#' } else { '.' })?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Which orientations count as the same shape.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Symmetry {
    /// Quarter turns give the same shape.
    pub rotation: bool,
    /// Mirror images give the same shape.
    pub reflection: bool,
}

impl Symmetry {
    /// Every orientation is distinct.
    pub const NONE: Self = Self { rotation: false, reflection: false };
    /// Rotations only.
    pub const ROTATION: Self = Self { rotation: true, reflection: false };
    /// Rotations and reflections.
    pub const FULL: Self = Self { rotation: true, reflection: true };

    /// Upper bound on the number of distinct orientations under this group.
    pub fn order(&self) -> usize {
        match (self.rotation, self.reflection) {
            (false, false) => 1,
            (false, true) => 2,
            (true, false) => 4,
            (true, true) => 8,
        }
    }

    fn generators(&self) -> Vec<fn(&Shape) -> Shape> {
        let mut generators: Vec<fn(&Shape) -> Shape> = Vec::with_capacity(2);
        if self.rotation {
            generators.push(Shape::rotate);
        }
        if self.reflection {
            generators.push(Shape::reflect);
        }

        generators
    }
}

/// The distinct orientations of a shape, the input orientation first.
///
/// Indices into the set are stable for a given input and are what detector rules use as variant numbers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VariantSet {
    variants: Vec<Shape>,
}

impl VariantSet {
    /// Number of distinct orientations.
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Whether there are no orientations.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Whether `shape` is one of the orientations.
    pub fn contains(&self, shape: &Shape) -> bool {
        self.variants.contains(shape)
    }

    /// Orientations by index.
    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.variants.iter()
    }
}

impl<'a> IntoIterator for &'a VariantSet {
    type Item = &'a Shape;
    type IntoIter = std::slice::Iter<'a, Shape>;

    fn into_iter(self) -> Self::IntoIter {
        self.variants.iter()
    }
}

/// Close `shape` under the generators of `symmetry`.
///
/// Every pass applies each generator to each known orientation, stopping once a pass discovers nothing new.
pub fn enumerate_variants(shape: &Shape, symmetry: Symmetry) -> VariantSet {
    let generators = symmetry.generators();
    let mut variants = vec![shape.clone()];
    let mut seen: HashSet<Shape> = HashSet::from([shape.clone()]);

    loop {
        let discovered = variants
            .iter()
            .cartesian_product(generators.iter())
            .map(|(variant, generator)| generator(variant))
            .filter(|candidate| !seen.contains(candidate))
            .unique()
            .collect_vec();

        if discovered.is_empty() {
            break;
        }

        seen.extend(discovered.iter().cloned());
        variants.extend(discovered);
    }

    VariantSet { variants }
}

/// Named polyominoes of one to five cells, keyed by letter and size.
pub(crate) const OMINOES: &[(&str, &[(i32, i32)])] = &[
    ("O1", &[(0, 0)]),
    ("I2", &[(0, 0), (1, 0)]),
    ("I3", &[(0, 0), (1, 0), (2, 0)]),
    ("L3", &[(0, 0), (1, 0), (1, 1)]),
    ("I4", &[(0, 0), (1, 0), (2, 0), (3, 0)]),
    ("L4", &[(0, 0), (1, 0), (2, 0), (2, 1)]),
    ("O4", &[(0, 0), (0, 1), (1, 0), (1, 1)]),
    ("S4", &[(0, 1), (0, 2), (1, 0), (1, 1)]),
    ("T4", &[(0, 0), (0, 1), (0, 2), (1, 1)]),
    ("F5", &[(0, 1), (0, 2), (1, 0), (1, 1), (2, 1)]),
    ("I5", &[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]),
    ("L5", &[(0, 0), (1, 0), (2, 0), (3, 0), (3, 1)]),
    ("N5", &[(0, 1), (1, 1), (2, 0), (2, 1), (3, 0)]),
    ("P5", &[(0, 0), (0, 1), (1, 0), (1, 1), (2, 0)]),
    ("T5", &[(0, 0), (0, 1), (0, 2), (1, 1), (2, 1)]),
    ("U5", &[(0, 0), (0, 2), (1, 0), (1, 1), (1, 2)]),
    ("V5", &[(0, 0), (1, 0), (2, 0), (2, 1), (2, 2)]),
    ("W5", &[(0, 0), (1, 0), (1, 1), (2, 1), (2, 2)]),
    ("X5", &[(0, 1), (1, 0), (1, 1), (1, 2), (2, 1)]),
    ("Y5", &[(0, 1), (1, 0), (1, 1), (2, 1), (3, 1)]),
    ("Z5", &[(0, 0), (0, 1), (1, 1), (2, 1), (2, 2)]),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_under(variants: &VariantSet, symmetry: Symmetry) -> bool {
        variants.iter().all(|variant| {
            symmetry.generators().iter().all(|generator| variants.contains(&generator(variant)))
        })
    }

    #[test]
    fn canonical_form() {
        let shape = canonicalize(&[Location(3, 4), Location(2, 5), Location(3, 5)]).unwrap();
        assert_eq!(shape.cells(), &[Location(0, 0), Location(1, -1), Location(1, 0)]);
        assert_eq!(canonicalize(shape.cells()).unwrap(), shape);
        assert_eq!(canonicalize(&[]), Err(Error::EmptyShape));
    }

    #[test]
    fn canonical_is_idempotent_for_catalog() {
        for (_, offsets) in OMINOES {
            let shape = Shape::new(offsets.iter().copied()).unwrap();
            assert_eq!(shape.cells()[0], Location(0, 0));
            assert_eq!(canonicalize(shape.cells()).unwrap(), shape);
        }
    }

    #[test]
    fn square_has_one_variant() {
        let square = Shape::new([(0, 0), (0, 1), (1, 0), (1, 1)]).unwrap();
        assert_eq!(enumerate_variants(&square, Symmetry::FULL).len(), 1);
    }

    #[test]
    fn domino_rotates_twice() {
        let domino = Shape::new([(0, 0), (1, 0)]).unwrap();
        let variants = enumerate_variants(&domino, Symmetry::ROTATION);
        assert_eq!(variants.len(), 2);
        assert!(variants.contains(&Shape::new([(0, 0), (0, 1)]).unwrap()));
    }

    #[test]
    fn no_symmetry_keeps_input() {
        let l = Shape::new([(0, 0), (1, 0), (1, 1)]).unwrap();
        let variants = enumerate_variants(&l, Symmetry::NONE);
        assert_eq!(variants.len(), 1);
        assert_eq!(variants.iter().next(), Some(&l));
    }

    #[test]
    fn fixed_polyomino_counts() {
        let count = |size: usize, symmetry: Symmetry| -> usize {
            OMINOES
                .iter()
                .filter(|(_, offsets)| offsets.len() == size)
                .map(|(_, offsets)| enumerate_variants(&Shape::new(offsets.iter().copied()).unwrap(), symmetry).len())
                .sum()
        };

        // fixed and one-sided polyomino counts
        assert_eq!(count(4, Symmetry::FULL), 19);
        assert_eq!(count(5, Symmetry::FULL), 63);
        assert_eq!(count(4, Symmetry::ROTATION), 13);
        assert_eq!(count(5, Symmetry::ROTATION), 41);
        assert_eq!(count(3, Symmetry::FULL), 6);
    }

    #[test]
    fn orbits_divide_group_order_and_are_closed() {
        for symmetry in [Symmetry::ROTATION, Symmetry::FULL, Symmetry { rotation: false, reflection: true }] {
            for (name, offsets) in OMINOES {
                let variants = enumerate_variants(&Shape::new(offsets.iter().copied()).unwrap(), symmetry);
                assert_eq!(symmetry.order() % variants.len(), 0, "{name} under {symmetry:?}");
                assert!(closed_under(&variants, symmetry), "{name} under {symmetry:?}");
            }
        }
    }

    #[test]
    fn chiral_pieces() {
        let s = Shape::new([(0, 1), (0, 2), (1, 0), (1, 1)]).unwrap();
        assert_eq!(enumerate_variants(&s, Symmetry::ROTATION).len(), 2);
        assert_eq!(enumerate_variants(&s, Symmetry::FULL).len(), 4);

        let f = Shape::new([(0, 1), (0, 2), (1, 0), (1, 1), (2, 1)]).unwrap();
        assert_eq!(enumerate_variants(&f, Symmetry::ROTATION).len(), 4);
        assert_eq!(enumerate_variants(&f, Symmetry::FULL).len(), 8);
    }

    #[test]
    fn display() {
        let t = Shape::new([(0, 0), (0, 1), (0, 2), (1, 1)]).unwrap();
        assert_eq!(t.to_string(), "###\n.#.\n");
        let s = Shape::new([(0, 1), (0, 2), (1, 0), (1, 1)]).unwrap();
        assert_eq!(s.to_string(), ".##\n##.\n");
    }
}
