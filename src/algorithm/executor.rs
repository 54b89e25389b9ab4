//! Generation driver: greedy collapse and checkpointed backtracking
//!
//! Both modes repeat the same step: pick the lowest-entropy open cell, weight
//! its candidates, draw one from the seeded stream, collapse and propagate.
//! Greedy mode absorbs contradictions; backtracking mode rolls back to the last
//! consistent checkpoint and retries with the failed value excluded.

use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::algorithm::bitset::UnitSet;
use crate::algorithm::checkpoint::{CheckpointStack, TestedSets};
use crate::algorithm::propagation::{Propagation, Propagator, UpdatingMode};
use crate::algorithm::selection::{EntropyEvaluator, EntropyMode};
use crate::analysis::statistics::StatisticalModel;
use crate::analysis::weights::{WeightEvaluator, WeightingMode};
use crate::io::configuration::{DEFAULT_OUTPUT_HEIGHT, DEFAULT_OUTPUT_WIDTH, DEFAULT_SEED};
use crate::io::error::{AlgorithmError, Result};
use crate::spatial::grid::{Grid, Position};
use crate::spatial::tiles::Unit;

/// Parameters of a single generation run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Output extent along `x` (rows)
    pub width: usize,
    /// Output extent along `y` (columns)
    pub height: usize,
    /// Candidate weighting for the collapse draw
    pub weighting: WeightingMode,
    /// Propagation reach after each collapse
    pub updating: UpdatingMode,
    /// Cell scoring for selection
    pub entropy: EntropyMode,
    /// Seed of the random stream
    pub seed: u64,
    /// Roll back on contradiction instead of accepting it
    pub backtracking: bool,
    /// Maximum number of collapse attempts when backtracking
    pub attempt_limit: Option<usize>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_OUTPUT_WIDTH,
            height: DEFAULT_OUTPUT_HEIGHT,
            weighting: WeightingMode::default(),
            updating: UpdatingMode::default(),
            entropy: EntropyMode::default(),
            seed: DEFAULT_SEED,
            backtracking: false,
            attempt_limit: None,
        }
    }
}

/// Counters describing how a run went
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Outer loop iterations
    pub iterations: usize,
    /// Cells collapsed by a draw, including attempts later rolled back
    pub collapses: usize,
    /// Propagation passes that ended in a contradiction
    pub contradictions: usize,
    /// Checkpoints popped after exhausting their candidates
    pub backtracks: usize,
    /// Deepest checkpoint stack reached
    pub max_depth: usize,
}

/// Final grid of a run together with its statistics
#[derive(Clone, Debug)]
pub struct Generation {
    /// Final grid state
    pub grid: Grid,
    /// Run statistics
    pub stats: GenerationStats,
}

impl Generation {
    /// Resolved unit per cell, `None` for unresolved cells
    pub fn resolve(&self) -> ndarray::Array2<Option<Unit>> {
        self.grid.resolve()
    }

    /// Check whether every cell ended up collapsed
    pub fn is_complete(&self) -> bool {
        self.grid.is_resolved()
    }
}

/// Hook invoked as generation progresses
///
/// Observers see the grid but cannot influence the run.
pub trait GenerationObserver {
    /// Called right before `position` is collapsed
    fn before_collapse(&mut self, grid: &Grid, position: Position);

    /// Called once with the final grid of a successful run
    fn finished(&mut self, _grid: &Grid) {}
}

struct SilentObserver;

impl GenerationObserver for SilentObserver {
    fn before_collapse(&mut self, _grid: &Grid, _position: Position) {}
}

/// Shared flag that asks a running generation to stop
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Seeded random selector for reproducible stochastic choices
pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    /// Create a deterministic random selector
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Weighted random selection consuming exactly one sample
    ///
    /// Returns an index into `weights` by cumulative distribution. Zero
    /// weights are never chosen unless every weight is zero, in which case
    /// index 0 is returned.
    pub fn weighted_choice(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        // Every call consumes exactly one sample
        let mut rand_val = self.rng.random::<f64>() * total;
        if total <= 0.0 {
            return 0;
        }

        for (i, &weight) in weights.iter().enumerate() {
            rand_val -= weight;
            if rand_val < 0.0 {
                return i;
            }
        }
        // Rounding can leave a tiny remainder past the last bucket
        weights.iter().rposition(|&weight| weight > 0.0).unwrap_or(0)
    }

    /// Pick one member of `candidates`, weighting them with `weigh`
    ///
    /// A single candidate is returned without consuming a sample and without
    /// calling `weigh`; an empty set yields `None`.
    pub fn choose<F>(&mut self, candidates: &UnitSet, weigh: F) -> Option<usize>
    where
        F: FnOnce(&UnitSet) -> Vec<f64>,
    {
        if candidates.is_empty() {
            return None;
        }
        if let Some(only) = candidates.single() {
            return Some(only);
        }

        let choice = self.weighted_choice(&weigh(candidates));
        candidates.iter().nth(choice)
    }
}

#[derive(Clone, Copy)]
struct Heuristics<'a> {
    weights: WeightEvaluator<'a>,
    entropy: EntropyEvaluator<'a>,
    propagator: Propagator<'a>,
}

/// Runs generations against a trained model
pub struct Solver<'a> {
    model: &'a StatisticalModel,
    cancellation: Option<CancellationToken>,
}

impl<'a> Solver<'a> {
    /// Create a solver for a trained model
    pub const fn new(model: &'a StatisticalModel) -> Self {
        Self {
            model,
            cancellation: None,
        }
    }

    /// Poll `token` once per outer iteration and stop when it is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Generate a grid
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The model holds no units
    /// - The cancellation token fires
    /// - Backtracking exhausts the search space or its attempt limit
    pub fn generate(&self, config: &GenerationConfig) -> Result<Generation> {
        self.generate_observed(config, &mut SilentObserver)
    }

    /// Generate a grid, reporting each collapse to `observer`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The model holds no units
    /// - The cancellation token fires
    /// - Backtracking exhausts the search space or its attempt limit
    pub fn generate_observed(
        &self,
        config: &GenerationConfig,
        observer: &mut dyn GenerationObserver,
    ) -> Result<Generation> {
        if self.model.is_empty() {
            return Err(AlgorithmError::EmptyModel);
        }

        let weights = WeightEvaluator::new(self.model, config.weighting);
        let heuristics = Heuristics {
            weights,
            entropy: EntropyEvaluator::new(weights, config.entropy),
            propagator: Propagator::new(self.model, config.updating),
        };
        let units: Arc<[Unit]> = Arc::from(self.model.units());
        let grid = Grid::new(config.width, config.height, units);
        let mut random = RandomSelector::new(config.seed);

        tracing::debug!(
            width = config.width,
            height = config.height,
            weighting = %config.weighting,
            updating = %config.updating,
            entropy = %config.entropy,
            seed = config.seed,
            backtracking = config.backtracking,
            "starting generation"
        );

        let generation = if config.backtracking {
            self.run_backtracking(grid, config, heuristics, &mut random, observer)?
        } else {
            self.run_greedy(grid, heuristics, &mut random, observer)?
        };

        observer.finished(&generation.grid);
        tracing::info!(
            iterations = generation.stats.iterations,
            collapses = generation.stats.collapses,
            contradictions = generation.stats.contradictions,
            backtracks = generation.stats.backtracks,
            "generation finished"
        );
        Ok(generation)
    }

    fn poll_cancellation(&self, iteration: usize) -> Result<()> {
        match &self.cancellation {
            Some(token) if token.is_cancelled() => Err(AlgorithmError::Cancelled { iteration }),
            _ => Ok(()),
        }
    }

    fn run_greedy(
        &self,
        mut grid: Grid,
        heuristics: Heuristics<'_>,
        random: &mut RandomSelector,
        observer: &mut dyn GenerationObserver,
    ) -> Result<Generation> {
        let mut stats = GenerationStats::default();

        loop {
            self.poll_cancellation(stats.iterations)?;
            stats.iterations += 1;

            let Some(position) = heuristics.entropy.select(&grid) else {
                break;
            };
            let Some(unit) = draw(&grid, position, None, heuristics.weights, random) else {
                break;
            };

            observer.before_collapse(&grid, position);
            grid.collapse(position, unit);
            stats.collapses += 1;

            if let Propagation::Contradiction { position: at } =
                heuristics.propagator.propagate(&mut grid, position)
            {
                stats.contradictions += 1;
                tracing::debug!(
                    collapsed = %position,
                    contradiction = %at,
                    "contradiction accepted"
                );
            }
        }

        let unresolved = grid.cell_count() - grid.collapsed_count();
        if unresolved > 0 {
            tracing::warn!(
                unresolved,
                contradictions = stats.contradictions,
                "greedy generation left cells unresolved"
            );
        }

        Ok(Generation { grid, stats })
    }

    fn run_backtracking(
        &self,
        root: Grid,
        config: &GenerationConfig,
        heuristics: Heuristics<'_>,
        random: &mut RandomSelector,
        observer: &mut dyn GenerationObserver,
    ) -> Result<Generation> {
        let unit_count = self.model.unit_count();
        let mut stack = CheckpointStack::new(root);
        let mut stats = GenerationStats::default();

        loop {
            self.poll_cancellation(stats.iterations)?;
            stats.iterations += 1;

            let Some(top) = stack.top() else {
                return Err(AlgorithmError::Unsatisfiable {
                    attempts: stats.collapses,
                    max_depth: stack.max_depth(),
                });
            };
            let mut grid = top.grid.clone();

            let Some(position) = heuristics.entropy.select(&grid) else {
                stats.max_depth = stack.max_depth();
                return Ok(Generation { grid, stats });
            };

            let Some(unit) = draw(
                &grid,
                position,
                Some(&top.tested),
                heuristics.weights,
                random,
            ) else {
                stack.pop();
                stats.backtracks += 1;
                tracing::debug!(
                    position = %position,
                    depth = stack.depth(),
                    "candidates exhausted, backtracking"
                );
                continue;
            };

            if let Some(limit) = config.attempt_limit
                && stats.collapses >= limit
            {
                return Err(AlgorithmError::AttemptLimitExceeded { limit });
            }

            if let Some(top) = stack.top_mut() {
                top.tested.record(position, unit, unit_count);
            }

            observer.before_collapse(&grid, position);
            grid.collapse(position, unit);
            stats.collapses += 1;

            match heuristics.propagator.propagate(&mut grid, position) {
                Propagation::Consistent => {
                    stack.push(grid);
                    tracing::trace!(depth = stack.depth(), "checkpoint pushed");
                }
                Propagation::Contradiction { position: at } => {
                    stats.contradictions += 1;
                    tracing::debug!(
                        collapsed = %position,
                        contradiction = %at,
                        "retrying at same depth"
                    );
                }
            }
        }
    }
}

/// Choose a value for `position` among its untested candidates
fn draw(
    grid: &Grid,
    position: Position,
    tested: Option<&TestedSets>,
    weights: WeightEvaluator<'_>,
    random: &mut RandomSelector,
) -> Option<usize> {
    let domain = grid.domain(position)?;
    let candidates: UnitSet =
        tested.map_or_else(|| domain.clone(), |tested| tested.untested(position, domain));

    random.choose(&candidates, |candidates| weights.weights(grid, position, candidates))
}
