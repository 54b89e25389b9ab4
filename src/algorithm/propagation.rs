//! Domain filtering after a cell changes

use bitvec::prelude::*;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use crate::analysis::statistics::StatisticalModel;
use crate::io::error::{AlgorithmError, invalid_configuration};
use crate::spatial::direction::Direction;
use crate::spatial::grid::{Grid, Position};

/// How far a change reaches through the grid
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UpdatingMode {
    /// Filter only the direct neighbors of the changed cell
    Neighbor,
    /// Keep propagating from neighbors that became collapsed
    #[default]
    Chain,
}

impl UpdatingMode {
    const NAMES: [&'static str; 2] = ["neighbor", "chain"];

    /// Command line name of the mode
    pub const fn name(self) -> &'static str {
        match self {
            Self::Neighbor => "neighbor",
            Self::Chain => "chain",
        }
    }
}

impl fmt::Display for UpdatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UpdatingMode {
    type Err = AlgorithmError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "neighbor" => Ok(Self::Neighbor),
            "chain" => Ok(Self::Chain),
            _ => Err(invalid_configuration("updating", &value, &Self::NAMES)),
        }
    }
}

impl TryFrom<u8> for UpdatingMode {
    type Error = AlgorithmError;

    /// Numeric codes `1..=2` in declaration order
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Neighbor),
            2 => Ok(Self::Chain),
            _ => Err(invalid_configuration("updating", &code, &["1", "2"])),
        }
    }
}

/// Outcome of one propagation pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Propagation {
    /// Every examined neighbor kept at least one candidate
    Consistent,
    /// A neighbor was left without a valid candidate
    Contradiction {
        /// First cell found contradicted during the pass
        position: Position,
    },
}

impl Propagation {
    /// Check whether the pass found no contradiction
    pub const fn is_consistent(self) -> bool {
        matches!(self, Self::Consistent)
    }
}

/// Breadth-first domain filter driven by the model's adjacency facts
#[derive(Clone, Copy, Debug)]
pub struct Propagator<'a> {
    model: &'a StatisticalModel,
    mode: UpdatingMode,
}

impl<'a> Propagator<'a> {
    /// Create a propagator over a trained model
    pub const fn new(model: &'a StatisticalModel, mode: UpdatingMode) -> Self {
        Self { model, mode }
    }

    /// Active updating mode
    pub const fn mode(&self) -> UpdatingMode {
        self.mode
    }

    /// Filter neighbor domains outward from `changed`
    ///
    /// Open neighbors are intersected with the units allowed next to the
    /// dequeued cell's value. A neighbor emptied by filtering keeps its empty
    /// domain and the pass continues. A collapsed neighbor whose value is not
    /// allowed is reported without being modified. `Chain` mode enqueues
    /// neighbors that became collapsed, each at most once per pass; `Neighbor`
    /// mode only checks them against their own collapsed neighbors.
    pub fn propagate(&self, grid: &mut Grid, changed: Position) -> Propagation {
        let mut queued = bitvec![0; grid.cell_count()];
        let mut queue = VecDeque::new();
        let mut contradiction = None;

        mark(&mut queued, grid.height(), changed);
        queue.push_back(changed);

        while let Some(current) = queue.pop_front() {
            let Some(value) = grid.value(current) else {
                continue;
            };

            for direction in Direction::ALL {
                let Some(next) = grid.neighbor(current, direction) else {
                    continue;
                };
                let Some(allowed) = self.model.compatible(value, direction) else {
                    continue;
                };
                let Some(domain) = grid.domain(next) else {
                    continue;
                };

                let before = domain.count();
                if before == 0 {
                    continue;
                }
                if before == 1 {
                    if !domain.single().is_some_and(|unit| allowed.contains(unit)) {
                        tracing::debug!(
                            from = %current,
                            to = %next,
                            "collapsed neighbors disagree"
                        );
                        contradiction.get_or_insert(next);
                    }
                    continue;
                }

                let filtered = domain.intersection(allowed);
                let after = filtered.count();
                if after == before {
                    continue;
                }
                grid.set_domain(next, filtered);

                if after == 0 {
                    tracing::debug!(position = %next, "domain emptied by propagation");
                    contradiction.get_or_insert(next);
                } else if after == 1 {
                    match self.mode {
                        UpdatingMode::Chain => {
                            if mark(&mut queued, grid.height(), next) {
                                queue.push_back(next);
                            }
                        }
                        UpdatingMode::Neighbor => {
                            if let Some(other) = self.disagreeing_neighbor(grid, next) {
                                tracing::debug!(
                                    from = %next,
                                    to = %other,
                                    "collapsed neighbors disagree"
                                );
                                contradiction.get_or_insert(other);
                            }
                        }
                    }
                }
            }
        }

        contradiction.map_or(Propagation::Consistent, |position| {
            Propagation::Contradiction { position }
        })
    }

    /// First collapsed neighbor whose value may not sit next to the collapsed `position`
    ///
    /// Checks without filtering, so a cell collapsed by a non-chaining pass
    /// still agrees with every neighbor that was collapsed before it.
    fn disagreeing_neighbor(&self, grid: &Grid, position: Position) -> Option<Position> {
        let value = grid.value(position)?;
        Direction::ALL.into_iter().find_map(|direction| {
            let next = grid.neighbor(position, direction)?;
            let neighbor = grid.value(next)?;
            let allowed = self.model.compatible(value, direction)?;
            (!allowed.contains(neighbor)).then_some(next)
        })
    }
}

/// Set the queued bit for `position`, returning whether it was newly set
fn mark(queued: &mut BitVec, height: usize, position: Position) -> bool {
    match queued.get_mut(position.x * height + position.y) {
        Some(mut bit) if !*bit => {
            *bit = true;
            true
        }
        _ => false,
    }
}
