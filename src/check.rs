//! An imperative evaluator for the closures the rule templates describe.
//!
//! The templates leave the least-fixpoint computation to the external solver. The functions here compute the same
//! relations directly over a fixed shading so that encodings can be cross-checked: reachability is a BFS over a
//! [`petgraph`] graph of matching cells, rectangle recognition scans bounding boxes, and shape detection matches
//! every orientation at every root.

use std::collections::{BTreeSet, HashSet};
use std::fmt::{Display, Formatter};
use std::num::NonZero;

use itertools::Itertools;
use ndarray::Array2;
use petgraph::graphmap::UnGraphMap;
use petgraph::visit::Bfs;
use strum::VariantArray;
use tracing::debug;
use unordered_pair::UnorderedPair;

use crate::adjacency::AdjacencyKind;
use crate::direction::Direction;
use crate::error::{Error, Result};
use crate::location::{Coord, Location};
use crate::shape::VariantSet;

/// A row or column count of a [`Board`].
pub type Dimension = NonZero<usize>;

/// Reasons a builder may become invalid while building.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BoardInvalidReason {
    /// A cell or wall was placed outside the bounds given to [`BoardBuilder::with_dims`].
    OutOfBounds,
    /// Rows of a textual board differ in length.
    RaggedRows,
    /// A textual board contained something other than `#` or `.`.
    UnknownGlyph(char),
}

/// Collects shaded cells and walls for a [`Board`].
///
/// Builders mutate themselves while building but can be [`Clone`]d to save their state at some point.
#[derive(Clone, Debug)]
pub struct BoardBuilder {
    // rows, cols
    dims: (Dimension, Dimension),
    shaded: Array2<bool>,
    walls: HashSet<UnorderedPair<Location>>,
    invalid_reasons: Vec<BoardInvalidReason>,
}

impl BoardBuilder {
    /// An unshaded board of `dims`, in `(rows, cols)` order.
    pub fn with_dims(dims: (Dimension, Dimension)) -> Self {
        Self {
            dims,
            shaded: Array2::from_elem((dims.0.get(), dims.1.get()), false),
            walls: Default::default(),
            invalid_reasons: Default::default(),
        }
    }

    /// Read a board drawn with `#` for shaded and `.` for unshaded cells, one string per row.
    ///
    /// An empty drawing yields a single unshaded cell marked [`OutOfBounds`](BoardInvalidReason::OutOfBounds).
    pub fn from_rows(rows: &[&str]) -> Self {
        let width = rows.first().map_or(0, |row| row.chars().count());
        let (Some(r), Some(c)) = (NonZero::new(rows.len()), NonZero::new(width)) else {
            let mut builder = Self::with_dims((NonZero::<usize>::MIN, NonZero::<usize>::MIN));
            builder.invalid_reasons.push(BoardInvalidReason::OutOfBounds);
            return builder;
        };

        let mut builder = Self::with_dims((r, c));
        for (r, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                builder.invalid_reasons.push(BoardInvalidReason::RaggedRows);
                return builder;
            }

            for (c, glyph) in row.chars().enumerate() {
                match glyph {
                    '#' => builder.shaded[(r, c)] = true,
                    '.' => {}
                    other => {
                        builder.invalid_reasons.push(BoardInvalidReason::UnknownGlyph(other));
                        return builder;
                    }
                }
            }
        }

        builder
    }

    fn in_bounds(&self, location: Location) -> bool {
        location.as_index().is_some_and(|(r, c)| r < self.dims.0.get() && c < self.dims.1.get())
    }

    /// Shade `location`.
    ///
    /// May cause the builder to enter an [`OutOfBounds`](BoardInvalidReason::OutOfBounds) invalid state.
    /// If the builder is already in an invalid state, this function does nothing.
    pub fn shade(&mut self, location: Location) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        match location.as_index().filter(|_| self.in_bounds(location)) {
            Some(index) => self.shaded[index] = true,
            None => self.invalid_reasons.push(BoardInvalidReason::OutOfBounds),
        }

        self
    }

    /// Shorthand for multiple calls to [`Self::shade`], with the same conditions.
    pub fn shade_all(&mut self, locations: impl IntoIterator<Item = Location>) -> &mut Self {
        for location in locations {
            self.shade(location);
        }

        self
    }

    /// Place a wall between the two `locations`.
    ///
    /// If the two locations are not orthogonally adjacent, this function does nothing and does not invalidate the
    /// builder. May cause the builder to enter an [`OutOfBounds`](BoardInvalidReason::OutOfBounds) invalid state if
    /// either location is out of bounds.
    pub fn wall(&mut self, locations: UnorderedPair<Location>) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if !self.in_bounds(locations.0) || !self.in_bounds(locations.1) {
            self.invalid_reasons.push(BoardInvalidReason::OutOfBounds);
            return self;
        }

        if Direction::between(locations.0, locations.1).is_some() {
            self.walls.insert(locations);
        }

        self
    }

    /// Wall off the sides of `location` facing `directions`, skipping sides on the border of the board.
    pub fn wall_around(&mut self, location: Location, directions: &[Direction]) -> &mut Self {
        for direction in directions {
            let neighbor = direction.attempt_from(location);
            if self.in_bounds(neighbor) {
                self.wall(UnorderedPair::from((location, neighbor)));
            }
        }

        self
    }

    /// Returns `None` if the builder is valid, `Some(&Vec<BoardInvalidReason>)` otherwise.
    pub fn is_valid(&self) -> Option<&Vec<BoardInvalidReason>> {
        if self.invalid_reasons.is_empty() {
            None
        } else {
            Some(&self.invalid_reasons)
        }
    }

    /// Convert the state of this builder into a [`Board`].
    pub fn build(&self) -> std::result::Result<Board, &Vec<BoardInvalidReason>> {
        if !self.invalid_reasons.is_empty() {
            return Err(&self.invalid_reasons);
        }

        Ok(Board { shaded: self.shaded.clone(), walls: self.walls.clone() })
    }
}

/// A fixed shading of a rectangular grid, with optional walls between cells.
#[derive(Clone, Debug)]
pub struct Board {
    shaded: Array2<bool>,
    walls: HashSet<UnorderedPair<Location>>,
}

impl Board {
    /// `(rows, cols)`
    pub fn dims(&self) -> (usize, usize) {
        self.shaded.dim()
    }

    /// Whether `location` lies on the board.
    pub fn contains(&self, location: Location) -> bool {
        location.as_index().is_some_and(|index| self.shaded.get(index).is_some())
    }

    /// Whether `location` is on the board and shaded.
    pub fn is_shaded(&self, location: Location) -> bool {
        location.as_index().and_then(|index| self.shaded.get(index).copied()).unwrap_or(false)
    }

    /// Whether a wall separates `a` from `b`.
    pub fn is_walled(&self, a: Location, b: Location) -> bool {
        self.walls.contains(&UnorderedPair::from((a, b)))
    }

    /// Every location on the board, row by row.
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.shaded.indexed_iter().map(|(index, _)| Location::from(index))
    }

    fn shaded_locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.shaded.indexed_iter().filter(|(_, shaded)| **shaded).map(|(index, _)| Location::from(index))
    }

    /// The `adj_<kind>` relation between two cells of this board.
    ///
    /// Path-gated kinds depend on path facts a shading does not carry and are rejected.
    pub fn adjacent(&self, a: Location, b: Location, kind: AdjacencyKind) -> Result<bool> {
        if !self.contains(a) || !self.contains(b) {
            return Ok(false);
        }

        match kind {
            AdjacencyKind::Orthogonal4 | AdjacencyKind::DiagonalX | AdjacencyKind::Combined8 => Ok(kind.geometric(a, b)),
            AdjacencyKind::EdgeGated => Ok(kind.geometric(a, b) && !self.is_walled(a, b)),
            AdjacencyKind::LoopGated | AdjacencyKind::DirectedLoopGated => {
                Err(Error::UnsupportedAdjacency(kind.token().to_owned()))
            }
        }
    }

    /// The shaded cells as graph nodes, joined when adjacent under `kind`.
    fn graph(&self, kind: AdjacencyKind) -> Result<UnGraphMap<Location, ()>> {
        let nodes = self.shaded_locations().collect_vec();
        let mut graph = UnGraphMap::with_capacity(nodes.len(), nodes.len() * 4);
        for node in &nodes {
            graph.add_node(*node);
        }

        let steps = Direction::VARIANTS.iter().map(Direction::delta).chain([(-1, -1), (-1, 1), (1, -1), (1, 1)]).collect_vec();
        for (node, step) in nodes.iter().cartesian_product(&steps) {
            let neighbor = node.offset_by(*step);
            if self.is_shaded(neighbor) && self.adjacent(*node, neighbor, kind)? {
                graph.add_edge(*node, neighbor, ());
            }
        }

        Ok(graph)
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for row in self.shaded.rows() {
            for shaded in row {
                write!(f, "{}", if *shaded { '#' } else { '.' })?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

fn bfs(graph: &UnGraphMap<Location, ()>, src: Location) -> BTreeSet<Location> {
    let mut reached = BTreeSet::new();
    if !graph.contains_node(src) {
        return reached;
    }

    let mut bfs = Bfs::new(graph, src);
    while let Some(node) = bfs.next(graph) {
        reached.insert(node);
    }

    reached
}

/// Shaded cells reachable from `src` through shaded cells under `kind`, `src` included.
///
/// Empty if `src` is not shaded.
pub fn reachable(board: &Board, src: Location, kind: AdjacencyKind) -> Result<BTreeSet<Location>> {
    let graph = board.graph(kind)?;
    Ok(bfs(&graph, src))
}

/// Shaded cells lit from `src` along its row and column, stopping at the first unshaded cell or wall.
pub fn bulb(board: &Board, src: Location, kind: AdjacencyKind) -> Result<BTreeSet<Location>> {
    let mut lit = BTreeSet::new();
    if !board.is_shaded(src) {
        return Ok(lit);
    }

    lit.insert(src);
    for direction in Direction::VARIANTS {
        let mut current = src;
        loop {
            let next = direction.attempt_from(current);
            if !board.is_shaded(next) || !board.adjacent(current, next, kind)? {
                break;
            }
            lit.insert(next);
            current = next;
        }
    }

    Ok(lit)
}

/// The connected groups of shaded cells under `kind`, each ordered, listed by their smallest cell.
pub fn components(board: &Board, kind: AdjacencyKind) -> Result<Vec<BTreeSet<Location>>> {
    let graph = board.graph(kind)?;
    let mut seen = HashSet::new();
    let mut groups = Vec::new();
    for node in graph.nodes().sorted() {
        if seen.contains(&node) {
            continue;
        }

        let group = bfs(&graph, node);
        seen.extend(group.iter().copied());
        groups.push(group);
    }

    debug!(groups = groups.len(), "found components");
    Ok(groups)
}

/// Whether the shaded cells form at most one connected group.
pub fn is_connected(board: &Board, kind: AdjacencyKind) -> Result<bool> {
    Ok(components(board, kind)?.len() <= 1)
}

/// An axis-aligned block of cells.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Rect {
    /// The cell with the smallest row and column.
    pub top_left: Location,
    /// Rows covered.
    pub height: Coord,
    /// Columns covered.
    pub width: Coord,
}

impl Rect {
    /// Whether height and width agree.
    pub fn is_square(&self) -> bool {
        self.height == self.width
    }
}

fn bounding_rect(group: &BTreeSet<Location>) -> Option<Rect> {
    let (top, bottom) = group.iter().map(|cell| cell.0).minmax().into_option()?;
    let (left, right) = group.iter().map(|cell| cell.1).minmax().into_option()?;
    Some(Rect { top_left: Location(top, left), height: bottom - top + 1, width: right - left + 1 })
}

/// The filled rectangle `group` is, if any.
fn as_rect(group: &BTreeSet<Location>) -> Option<Rect> {
    let rect = bounding_rect(group)?;
    let area = usize::try_from(rect.height * rect.width).ok()?;
    (area == group.len()).then_some(rect)
}

/// `Some` with every orthogonally connected group of shaded cells, if each one is a filled rectangle.
pub fn rectangles(board: &Board) -> Result<Option<Vec<Rect>>> {
    Ok(components(board, AdjacencyKind::Orthogonal4)?.iter().map(as_rect).collect())
}

/// Whether every orthogonally connected group of shaded cells is a filled rectangle, or a square if `square` is set.
pub fn all_rect(board: &Board, square: bool) -> Result<bool> {
    Ok(rectangles(board)?.is_some_and(|rects| !square || rects.iter().all(Rect::is_square)))
}

/// Whether some `height` by `width` window is entirely shaded.
pub fn contains_block(board: &Board, height: Coord, width: Coord) -> bool {
    board.locations().any(|Location(r, c)| {
        (0..height).cartesian_product(0..width).all(|(dr, dc)| board.is_shaded(Location(r + dr, c + dc)))
    })
}

/// Whether no orthogonally connected group of shaded cells is a filled rectangle.
pub fn no_rect(board: &Board) -> Result<bool> {
    Ok(components(board, AdjacencyKind::Orthogonal4)?.iter().all(|group| as_rect(group).is_none()))
}

/// Shaded cells seeded by a 2x2 window with exactly one unshaded cell, closed under orthogonal steps through shaded
/// cells.
///
/// The shading has no filled rectangle exactly when this covers every shaded cell.
pub fn l_corner_closure(board: &Board) -> BTreeSet<Location> {
    let mut seeds = BTreeSet::new();
    for Location(r, c) in board.locations() {
        let window = [Location(r, c), Location(r, c + 1), Location(r + 1, c), Location(r + 1, c + 1)];
        if !window.iter().all(|cell| board.contains(*cell)) {
            continue;
        }

        let shaded = window.iter().copied().filter(|cell| board.is_shaded(*cell)).collect_vec();
        if shaded.len() == 3 {
            seeds.extend(shaded);
        }
    }

    let mut closure = BTreeSet::new();
    // orthogonal adjacency never fails
    if let Ok(graph) = board.graph(AdjacencyKind::Orthogonal4) {
        for seed in seeds {
            if !closure.contains(&seed) {
                closure.extend(bfs(&graph, seed));
            }
        }
    }

    closure
}

/// Roots and variant indices at which some orientation in `variants` lies on shaded cells, connected under `kind`.
///
/// Unless `simple` is set, occurrences touched under `kind` by a shaded cell outside the orientation are skipped.
pub fn occurrences(
    board: &Board,
    variants: &VariantSet,
    kind: AdjacencyKind,
    simple: bool,
) -> Result<Vec<(Location, usize)>> {
    let steps = Direction::VARIANTS.iter().map(Direction::delta).chain([(-1, -1), (-1, 1), (1, -1), (1, 1)]).collect_vec();
    let mut found = Vec::new();

    for root in board.locations() {
        'variant: for (index, variant) in variants.iter().enumerate() {
            let cells = variant.cells().iter().map(|offset| root.offset_by((offset.0, offset.1))).collect_vec();
            if !cells.iter().all(|cell| board.is_shaded(*cell)) {
                continue;
            }

            for (a, b) in cells.iter().tuple_combinations() {
                if kind.geometric(*a, *b) && !board.adjacent(*a, *b, kind)? {
                    continue 'variant;
                }
            }

            if !simple {
                for (cell, step) in cells.iter().cartesian_product(&steps) {
                    let neighbor = cell.offset_by(*step);
                    if !cells.contains(&neighbor) && board.is_shaded(neighbor) && board.adjacent(*cell, neighbor, kind)? {
                        continue 'variant;
                    }
                }
            }

            found.push((root, index));
        }
    }

    Ok(found)
}
