//! Mathematical utilities for the algorithm

/// Weight normalization and Shannon entropy
pub mod probability;
