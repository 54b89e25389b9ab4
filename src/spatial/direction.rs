//! The ordered adjacency moveset shared by training and solving

use std::fmt;

/// Number of directions in the moveset
pub const DIRECTION_COUNT: usize = 4;

/// One step of the adjacency moveset
///
/// The declaration order is significant: a direction's index is stored in
/// adjacency facts and context keys, so training and solving must agree on it.
/// Offsets are `(dx, dy)` where `x` indexes rows and `y` indexes columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Next row, `(+1, 0)`
    Down,
    /// Next column, `(0, +1)`
    Right,
    /// Previous row, `(-1, 0)`
    Up,
    /// Previous column, `(0, -1)`
    Left,
}

impl Direction {
    /// Every direction in moveset order
    pub const ALL: [Self; DIRECTION_COUNT] = [Self::Down, Self::Right, Self::Up, Self::Left];

    /// Position of this direction within the moveset
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up a direction by its moveset index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Grid offset `(dx, dy)` for one step in this direction
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Self::Down => (1, 0),
            Self::Right => (0, 1),
            Self::Up => (-1, 0),
            Self::Left => (0, -1),
        }
    }

    /// The direction leading back to the starting cell
    pub const fn opposite(self) -> Self {
        match self {
            Self::Down => Self::Up,
            Self::Right => Self::Left,
            Self::Up => Self::Down,
            Self::Left => Self::Right,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Down => "down",
            Self::Right => "right",
            Self::Up => "up",
            Self::Left => "left",
        };
        f.write_str(name)
    }
}
