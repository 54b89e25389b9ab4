//! Solver grid with copy-on-write row storage
//!
//! Each cell holds a domain of candidate unit indices. Rows are stored as
//! shared segments so that cloning a grid for a checkpoint only bumps one
//! reference count per row; a row is copied the first time a clone writes to it.

use ndarray::Array2;
use std::fmt;
use std::sync::Arc;

use crate::algorithm::bitset::UnitSet;
use crate::spatial::direction::Direction;
use crate::spatial::tiles::Unit;

/// Cell coordinates, `x` indexing rows and `y` indexing columns
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// Row index
    pub x: usize,
    /// Column index
    pub y: usize,
}

impl Position {
    /// Create a position
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// The neighboring position one step away, if it lies inside `width × height`
    pub fn step(self, direction: Direction, width: usize, height: usize) -> Option<Self> {
        let (dx, dy) = direction.offset();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        (x < width && y < height).then_some(Self { x, y })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Fixed-size grid of cell domains
///
/// A cell is collapsed when its domain holds exactly one unit and
/// contradicted when it holds none. Out-of-range positions are answered with
/// `None` or `false` rather than panicking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    units: Arc<[Unit]>,
    rows: Vec<Arc<Vec<UnitSet>>>,
}

impl Grid {
    /// Create a grid where every cell may still become any unit of `units`
    pub fn new(width: usize, height: usize, units: Arc<[Unit]>) -> Self {
        let open = Arc::new(vec![UnitSet::all(units.len()); height]);
        let rows = (0..width).map(|_| Arc::clone(&open)).collect();

        Self {
            width,
            height,
            units,
            rows,
        }
    }

    /// Extent along `x`
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Extent along `y`
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells
    pub const fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Unit table that domain indices refer to
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Check whether a position lies inside the grid
    pub const fn contains(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    /// Iterate every position, rows outer and columns inner
    pub fn positions(&self) -> impl Iterator<Item = Position> + use<> {
        let height = self.height;
        (0..self.width).flat_map(move |x| (0..height).map(move |y| Position::new(x, y)))
    }

    /// Neighbor one step away in `direction`, if inside the grid
    pub fn neighbor(&self, position: Position, direction: Direction) -> Option<Position> {
        position.step(direction, self.width, self.height)
    }

    /// Domain of the cell at `position`
    pub fn domain(&self, position: Position) -> Option<&UnitSet> {
        self.rows.get(position.x)?.get(position.y)
    }

    /// Mutable domain access; copies the row segment if it is shared
    pub fn domain_mut(&mut self, position: Position) -> Option<&mut UnitSet> {
        Arc::make_mut(self.rows.get_mut(position.x)?).get_mut(position.y)
    }

    /// Replace a cell's domain, returning whether the position was valid
    pub fn set_domain(&mut self, position: Position, domain: UnitSet) -> bool {
        if let Some(cell) = self.domain_mut(position) {
            *cell = domain;
            true
        } else {
            false
        }
    }

    /// Reduce a cell to a single unit index
    ///
    /// Returns `false` without touching the grid if the position is outside
    /// the grid or the unit is not part of the cell's domain.
    pub fn collapse(&mut self, position: Position, unit: usize) -> bool {
        if !self.domain(position).is_some_and(|domain| domain.contains(unit)) {
            return false;
        }
        let capacity = self.units.len();
        self.set_domain(position, UnitSet::singleton(capacity, unit))
    }

    /// Domain size of the cell, zero for positions outside the grid
    pub fn domain_size(&self, position: Position) -> usize {
        self.domain(position).map_or(0, UnitSet::count)
    }

    /// Check whether the cell holds exactly one unit
    pub fn is_collapsed(&self, position: Position) -> bool {
        self.domain_size(position) == 1
    }

    /// Check whether the cell has no candidates left
    pub fn is_contradicted(&self, position: Position) -> bool {
        self.domain(position).is_some_and(UnitSet::is_empty)
    }

    /// Unit index of a collapsed cell
    pub fn value(&self, position: Position) -> Option<usize> {
        self.domain(position).and_then(UnitSet::single)
    }

    /// Unit of a collapsed cell
    pub fn unit_at(&self, position: Position) -> Option<Unit> {
        self.value(position)
            .and_then(|index| self.units.get(index).copied())
    }

    /// Number of collapsed cells
    pub fn collapsed_count(&self) -> usize {
        self.positions()
            .filter(|&position| self.is_collapsed(position))
            .count()
    }

    /// Number of contradicted cells
    pub fn contradiction_count(&self) -> usize {
        self.positions()
            .filter(|&position| self.is_contradicted(position))
            .count()
    }

    /// Check whether every cell is collapsed
    pub fn is_resolved(&self) -> bool {
        self.positions().all(|position| self.is_collapsed(position))
    }

    /// Check whether row `x` still shares its storage with `other`
    pub fn shares_row_with(&self, other: &Self, x: usize) -> bool {
        match (self.rows.get(x), other.rows.get(x)) {
            (Some(mine), Some(theirs)) => Arc::ptr_eq(mine, theirs),
            _ => false,
        }
    }

    /// Final unit per cell, `None` marking unresolved cells
    pub fn resolve(&self) -> Array2<Option<Unit>> {
        Array2::from_shape_fn((self.width, self.height), |(x, y)| {
            self.unit_at(Position::new(x, y))
        })
    }
}
