//! Input/output layers around the solver

/// Command-line parsing and batch file processing
pub mod cli;
/// Constants and runtime defaults
pub mod configuration;
/// Error types shared across the crate
pub mod error;
/// PNG export of generated grids
pub mod image;
/// Progress bars and the progress observer
pub mod progress;
/// Frame capture and GIF export
pub mod visualization;
