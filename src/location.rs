//! Grid coordinates.

use ndarray::Ix;

/// One grid coordinate. Signed, since rules refer to cells just outside the grid.
pub type Coord = i32;

#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug, Default)]
/// A `(row, col)` pair. The top left corner of a grid is `Location(0, 0)`.
///
/// The same type doubles as a shape offset `(dr, dc)` relative to a shape's root, so it carries no bounds of its own.
pub struct Location(pub Coord, pub Coord);

impl Location {
    /// Translate by `(dr, dc)`.
    pub fn offset_by(self, rhs: (Coord, Coord)) -> Self {
        Self(self.0 + rhs.0, self.1 + rhs.1)
    }

    /// Whether `other` is one orthogonal step away.
    pub fn is_orthogonal_to(&self, other: &Self) -> bool {
        (self.0 - other.0).abs() + (self.1 - other.1).abs() == 1
    }

    /// Whether `other` is one diagonal step away.
    pub fn is_diagonal_to(&self, other: &Self) -> bool {
        (self.0 - other.0).abs() == 1 && (self.1 - other.1).abs() == 1
    }

    /// Index into an [`ndarray::Array2`] laid out in row-major order, if both coordinates are non-negative.
    pub(crate) fn as_index(&self) -> Option<(Ix, Ix)> {
        Some((Ix::try_from(self.0).ok()?, Ix::try_from(self.1).ok()?))
    }
}

impl From<(Coord, Coord)> for Location {
    fn from(value: (Coord, Coord)) -> Self {
        Self(value.0, value.1)
    }
}

impl From<(Ix, Ix)> for Location {
    fn from(value: (Ix, Ix)) -> Self {
        // boards are never large enough to overflow
        Self(value.0 as Coord, value.1 as Coord)
    }
}

#[cfg(test)]
mod tests {
    use super::Location;

    #[test]
    fn neighbors() {
        let origin = Location(2, 2);
        assert!(origin.is_orthogonal_to(&Location(1, 2)));
        assert!(!origin.is_orthogonal_to(&Location(1, 1)));
        assert!(origin.is_diagonal_to(&Location(3, 1)));
        assert!(!origin.is_diagonal_to(&Location(2, 3)));
    }

    #[test]
    fn negative_has_no_index() {
        assert_eq!(Location(-1, 0).as_index(), None);
        assert_eq!(Location(1, 3).as_index(), Some((1, 3)));
    }
}
