//! Checkpoint stack for backtracking search
//!
//! Each checkpoint pairs a grid snapshot with the values already tried at that
//! depth. Snapshots share row storage with their parent until written.

use std::collections::HashMap;

use crate::algorithm::bitset::UnitSet;
use crate::spatial::grid::{Grid, Position};

/// Values already tried per cell at one search depth
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TestedSets {
    cells: HashMap<Position, UnitSet>,
}

impl TestedSets {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `unit` was tried at `position`
    pub fn record(&mut self, position: Position, unit: usize, unit_count: usize) {
        self.cells
            .entry(position)
            .or_insert_with(|| UnitSet::new(unit_count))
            .insert(unit);
    }

    /// Values tried at `position`
    pub fn tested(&self, position: Position) -> Option<&UnitSet> {
        self.cells.get(&position)
    }

    /// `domain` without the values already tried at `position`
    pub fn untested(&self, position: Position, domain: &UnitSet) -> UnitSet {
        self.cells
            .get(&position)
            .map_or_else(|| domain.clone(), |tested| domain.difference(tested))
    }

    /// Number of cells with at least one tried value
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check whether nothing has been tried yet
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Grid snapshot with its tried values
#[derive(Clone, Debug)]
pub struct Checkpoint {
    /// Grid state at this depth
    pub grid: Grid,
    /// Values already tried from this state
    pub tested: TestedSets,
}

impl Checkpoint {
    /// Checkpoint with nothing tried yet
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            tested: TestedSets::new(),
        }
    }
}

/// Explicit depth-first stack of checkpoints
#[derive(Debug, Default)]
pub struct CheckpointStack {
    checkpoints: Vec<Checkpoint>,
    max_depth: usize,
}

impl CheckpointStack {
    /// Stack seeded with the open grid
    pub fn new(root: Grid) -> Self {
        Self {
            checkpoints: vec![Checkpoint::new(root)],
            max_depth: 1,
        }
    }

    /// Push a consistent state reached from the current top
    pub fn push(&mut self, grid: Grid) {
        self.checkpoints.push(Checkpoint::new(grid));
        self.max_depth = self.max_depth.max(self.checkpoints.len());
    }

    /// Discard the top checkpoint
    pub fn pop(&mut self) -> Option<Checkpoint> {
        self.checkpoints.pop()
    }

    /// Current top checkpoint
    pub fn top(&self) -> Option<&Checkpoint> {
        self.checkpoints.last()
    }

    /// Mutable access to the current top checkpoint
    pub fn top_mut(&mut self) -> Option<&mut Checkpoint> {
        self.checkpoints.last_mut()
    }

    /// Current depth
    pub fn depth(&self) -> usize {
        self.checkpoints.len()
    }

    /// Greatest depth reached so far
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Check whether the search space is exhausted
    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }
}
