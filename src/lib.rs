//! Context-sensitive wave function collapse over tiles and patterns
//!
//! A statistical model is trained on a fully known grid of units extracted
//! from a sample image. The solver then fills a new grid cell by cell, picking
//! the lowest-entropy cell, drawing a weighted value from a seeded stream and
//! propagating adjacency constraints, optionally backtracking on contradiction.

#![forbid(unsafe_code)]

/// Solver core: bitsets, selection, propagation, checkpoints and the driver
pub mod algorithm;
/// Unit extraction, trained statistics and candidate weighting
pub mod analysis;
/// Input/output operations and error handling
pub mod io;
/// Probability helpers for weighting and entropy
pub mod math;
/// Directions, grids, positions and unit identifiers
pub mod spatial;

pub use algorithm::executor::{
    CancellationToken, Generation, GenerationConfig, GenerationObserver, GenerationStats, Solver,
};
pub use algorithm::propagation::UpdatingMode;
pub use algorithm::selection::EntropyMode;
pub use analysis::statistics::StatisticalModel;
pub use analysis::weights::WeightingMode;
pub use io::error::{AlgorithmError, Result};
