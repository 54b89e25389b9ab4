//! Entropy scoring and next-cell selection

use std::fmt;
use std::str::FromStr;

use crate::analysis::weights::WeightEvaluator;
use crate::io::error::{AlgorithmError, invalid_configuration};
use crate::math::probability::shannon_entropy;
use crate::spatial::grid::{Grid, Position};

/// How open cells are scored when choosing the next one to collapse
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EntropyMode {
    /// Number of remaining candidates
    DomainSize,
    /// Shannon entropy of the active weights
    ShannonWeighted,
    /// Fixed row-major scan starting at the top-left corner
    #[default]
    ScanOrderA,
    /// Fixed row-major scan with columns reversed, starting top-right
    ScanOrderB,
}

impl EntropyMode {
    const NAMES: [&'static str; 4] = ["domain-size", "shannon", "scan-a", "scan-b"];

    /// Command line name of the mode
    pub const fn name(self) -> &'static str {
        match self {
            Self::DomainSize => "domain-size",
            Self::ShannonWeighted => "shannon",
            Self::ScanOrderA => "scan-a",
            Self::ScanOrderB => "scan-b",
        }
    }
}

impl fmt::Display for EntropyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntropyMode {
    type Err = AlgorithmError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "domain-size" => Ok(Self::DomainSize),
            "shannon" => Ok(Self::ShannonWeighted),
            "scan-a" => Ok(Self::ScanOrderA),
            "scan-b" => Ok(Self::ScanOrderB),
            _ => Err(invalid_configuration("entropy", &value, &Self::NAMES)),
        }
    }
}

impl TryFrom<u8> for EntropyMode {
    type Error = AlgorithmError;

    /// Numeric codes `1..=4` in declaration order
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::DomainSize),
            2 => Ok(Self::ShannonWeighted),
            3 => Ok(Self::ScanOrderA),
            4 => Ok(Self::ScanOrderB),
            _ => Err(invalid_configuration("entropy", &code, &["1", "2", "3", "4"])),
        }
    }
}

/// Scores cells and picks the lowest-entropy open cell
#[derive(Clone, Copy, Debug)]
pub struct EntropyEvaluator<'a> {
    weights: WeightEvaluator<'a>,
    mode: EntropyMode,
}

impl<'a> EntropyEvaluator<'a> {
    /// Create an evaluator; `ShannonWeighted` scores with `weights`
    pub const fn new(weights: WeightEvaluator<'a>, mode: EntropyMode) -> Self {
        Self { weights, mode }
    }

    /// Active entropy mode
    pub const fn mode(&self) -> EntropyMode {
        self.mode
    }

    /// Score of a cell; collapsed, contradicted and outside cells are `+inf`
    pub fn entropy(&self, grid: &Grid, position: Position) -> f64 {
        let Some(domain) = grid.domain(position) else {
            return f64::INFINITY;
        };
        if domain.count() <= 1 {
            return f64::INFINITY;
        }

        match self.mode {
            EntropyMode::DomainSize => domain.count() as f64,
            EntropyMode::ShannonWeighted => {
                shannon_entropy(&self.weights.weights(grid, position, domain))
            }
            EntropyMode::ScanOrderA => (position.x * grid.height() + position.y) as f64,
            EntropyMode::ScanOrderB => {
                (position.x * grid.height() + (grid.height() - 1 - position.y)) as f64
            }
        }
    }

    /// First cell, rows outer and columns inner, reaching the strict minimum
    ///
    /// Returns `None` once every cell is collapsed or contradicted.
    pub fn select(&self, grid: &Grid) -> Option<Position> {
        let mut best: Option<(Position, f64)> = None;

        for position in grid.positions() {
            let score = self.entropy(grid, position);
            if score.is_infinite() {
                continue;
            }
            if best.is_none_or(|(_, lowest)| score < lowest) {
                best = Some((position, score));
            }
        }

        best.map(|(position, _)| position)
    }
}
