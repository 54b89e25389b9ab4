/// Fixed-size bitsets over unit indices
pub mod bitset;
/// Checkpoint stack and tested-value bookkeeping for backtracking
pub mod checkpoint;
/// Generation driver for greedy and backtracking runs
pub mod executor;
/// Breadth-first domain propagation
pub mod propagation;
/// Entropy scoring and cell selection
pub mod selection;
