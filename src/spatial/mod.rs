//! Spatial data structures
//!
//! This module contains spatial-related functionality including:
//! - The ordered adjacency moveset
//! - Grid state with copy-on-write rows
//! - Unit identifiers and tiled source images

/// Adjacency directions and their moveset order
pub mod direction;
/// Grid state management and cell domain access
pub mod grid;
/// Unit identifiers and tiled image rendering
pub mod tiles;

pub use direction::Direction;
pub use grid::{Grid, Position};
pub use tiles::Unit;
