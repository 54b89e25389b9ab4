//! Analysis modules for unit extraction and statistical modelling

/// Decomposition of source images into tile and pattern units
pub mod patterns;
/// Frequency, adjacency and context statistics learned from a unit grid
pub mod statistics;
/// Candidate weighting for the collapse draw
pub mod weights;
