//! Cell sides and the letters path facts use for them.

use strum::VariantArray;

use crate::location::Location;

/// The four sides of a square cell, as used by path and loop facts.
///
/// Path facts name the side of the cell the path leaves through, so a path running from `(0, 0)` to `(0, 1)`
/// is `grid_direction(0, 0, "r")` on one end and `grid_direction(0, 1, "l")` on the other.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum Direction {
    /// `"l"`
    Left,
    /// `"u"`
    Up,
    /// `"r"`
    Right,
    /// `"d"`
    Down,
}

impl Direction {
    /// The letter used for this direction in solver facts.
    pub fn letter(&self) -> &'static str {
        match self {
            Self::Left => "l",
            Self::Up => "u",
            Self::Right => "r",
            Self::Down => "d",
        }
    }

    /// Step from `location` through this side.
    pub fn attempt_from(&self, location: Location) -> Location {
        location.offset_by(self.delta())
    }

    /// `(dr, dc)` of a single step in this direction.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Self::Left => (0, -1),
            Self::Up => (-1, 0),
            Self::Right => (0, 1),
            Self::Down => (1, 0),
        }
    }

    /// The opposite side.
    pub fn invert(&self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
        }
    }

    /// Determine the direction from `a` to `b`, if they are orthogonally adjacent.
    pub fn between(a: Location, b: Location) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|dir| dir.attempt_from(a) == b)
    }
}

#[cfg(test)]
mod tests {
    use strum::VariantArray;

    use super::Direction;
    use crate::location::Location;

    #[test]
    fn invert_round_trips() {
        for dir in Direction::VARIANTS {
            assert_ne!(*dir, dir.invert());
            assert_eq!(*dir, dir.invert().invert());
        }
    }

    #[test]
    fn between_neighbors() {
        assert_eq!(Direction::between(Location(1, 1), Location(0, 1)), Some(Direction::Up));
        assert_eq!(Direction::between(Location(1, 1), Location(1, 2)), Some(Direction::Right));
        assert_eq!(Direction::between(Location(1, 1), Location(2, 2)), None);
    }
}
