//! Candidate weighting for the collapse draw

use std::fmt;
use std::str::FromStr;

use crate::algorithm::bitset::UnitSet;
use crate::analysis::statistics::{ContextKey, StatisticalModel};
use crate::io::error::{AlgorithmError, invalid_configuration};
use crate::math::probability::normalize;
use crate::spatial::direction::{DIRECTION_COUNT, Direction};
use crate::spatial::grid::{Grid, Position};
use crate::spatial::tiles::Unit;

/// How a cell's candidates are weighted before drawing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WeightingMode {
    /// Every candidate weighs 1
    #[default]
    Uniform,
    /// Candidates weigh their training frequency
    FrequencyWeighted,
    /// Candidates weigh the frequency of the context formed with the
    /// collapsed neighbors, falling back to frequency when nothing matches
    ContextWeighted,
}

impl WeightingMode {
    const NAMES: [&'static str; 3] = ["uniform", "frequency", "context"];

    /// Command line name of the mode
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::FrequencyWeighted => "frequency",
            Self::ContextWeighted => "context",
        }
    }
}

impl fmt::Display for WeightingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WeightingMode {
    type Err = AlgorithmError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "uniform" => Ok(Self::Uniform),
            "frequency" => Ok(Self::FrequencyWeighted),
            "context" => Ok(Self::ContextWeighted),
            _ => Err(invalid_configuration("weighting", &value, &Self::NAMES)),
        }
    }
}

impl TryFrom<u8> for WeightingMode {
    type Error = AlgorithmError;

    /// Numeric codes `1..=3` in declaration order
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Uniform),
            2 => Ok(Self::FrequencyWeighted),
            3 => Ok(Self::ContextWeighted),
            _ => Err(invalid_configuration("weighting", &code, &["1", "2", "3"])),
        }
    }
}

/// Computes candidate weights for one cell under a weighting mode
#[derive(Clone, Copy, Debug)]
pub struct WeightEvaluator<'a> {
    model: &'a StatisticalModel,
    mode: WeightingMode,
}

impl<'a> WeightEvaluator<'a> {
    /// Create an evaluator over a trained model
    pub const fn new(model: &'a StatisticalModel, mode: WeightingMode) -> Self {
        Self { model, mode }
    }

    /// Active weighting mode
    pub const fn mode(&self) -> WeightingMode {
        self.mode
    }

    /// One weight per candidate, in ascending domain order
    ///
    /// For candidates drawn from the model, the weights always sum to a
    /// positive value.
    pub fn weights(&self, grid: &Grid, position: Position, candidates: &UnitSet) -> Vec<f64> {
        match self.mode {
            WeightingMode::Uniform => vec![1.0; candidates.count()],
            WeightingMode::FrequencyWeighted => self.frequency_weights(candidates),
            WeightingMode::ContextWeighted => self.context_weights(grid, position, candidates),
        }
    }

    /// Weights scaled to sum to one
    pub fn probabilities(&self, grid: &Grid, position: Position, candidates: &UnitSet) -> Vec<f64> {
        normalize(&self.weights(grid, position, candidates))
    }

    fn frequency_weights(&self, candidates: &UnitSet) -> Vec<f64> {
        candidates
            .iter()
            .map(|index| {
                self.model
                    .unit(index)
                    .map_or(0, |unit| self.model.frequency(unit)) as f64
            })
            .collect()
    }

    fn context_weights(&self, grid: &Grid, position: Position, candidates: &UnitSet) -> Vec<f64> {
        let neighbors = collapsed_neighbors(grid, position);

        let weights: Vec<f64> = candidates
            .iter()
            .map(|index| {
                self.model.unit(index).map_or(0, |center| {
                    self.model.context_frequency(&ContextKey { center, neighbors })
                }) as f64
            })
            .collect();

        if weights.iter().sum::<f64>() > 0.0 {
            weights
        } else {
            self.frequency_weights(candidates)
        }
    }
}

/// Units of the collapsed neighbors around `position`, in moveset order
///
/// Out-of-bounds, open and contradicted neighbors are unknown.
pub fn collapsed_neighbors(grid: &Grid, position: Position) -> [Option<Unit>; DIRECTION_COUNT] {
    Direction::ALL.map(|direction| {
        grid.neighbor(position, direction)
            .and_then(|next| grid.unit_at(next))
    })
}
