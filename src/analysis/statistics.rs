//! Trained frequency and adjacency statistics over a fully known unit grid

use ndarray::Array2;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use crate::algorithm::bitset::UnitSet;
use crate::spatial::direction::{DIRECTION_COUNT, Direction};
use crate::spatial::grid::Position;
use crate::spatial::tiles::Unit;

/// Observed fact that `to` may occupy the cell reached from `from` by `direction`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AdjacencyFact {
    /// Unit at the starting cell
    pub from: Unit,
    /// Unit at the neighboring cell
    pub to: Unit,
    /// Step leading from `from` to `to`
    pub direction: Direction,
}

/// A center unit together with a partially known neighborhood
///
/// Neighbors are indexed by moveset order; `None` marks an unknown neighbor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContextKey {
    /// Unit at the center cell
    pub center: Unit,
    /// Known neighbor per direction
    pub neighbors: [Option<Unit>; DIRECTION_COUNT],
}

impl ContextKey {
    /// Context with every neighbor unknown
    pub const fn isolated(center: Unit) -> Self {
        Self {
            center,
            neighbors: [None; DIRECTION_COUNT],
        }
    }

    /// Same neighborhood around a different center
    #[must_use]
    pub const fn with_center(self, center: Unit) -> Self {
        Self {
            center,
            neighbors: self.neighbors,
        }
    }

    /// Number of known neighbors
    pub fn known_count(&self) -> usize {
        self.neighbors.iter().flatten().count()
    }
}

/// Read-only statistics learned from a training grid
///
/// Units are indexed in first-seen order (rows outer, columns inner); solver
/// domains refer to units by that index.
#[derive(Clone, Debug, Default)]
pub struct StatisticalModel {
    units: Vec<Unit>,
    indices: HashMap<Unit, usize>,
    frequencies: Vec<usize>,
    pair_frequencies: [HashMap<(Unit, Unit), usize>; DIRECTION_COUNT],
    facts: HashSet<AdjacencyFact>,
    contexts: HashMap<ContextKey, usize>,
    compatibility: Vec<[UnitSet; DIRECTION_COUNT]>,
}

impl StatisticalModel {
    /// Learn unit, pair and context statistics from a fully populated grid
    ///
    /// Every subset of a cell's in-bounds neighbors is counted as its own
    /// context, so a cell with `k` neighbors contributes `2^k` context keys.
    pub fn train(source: &Array2<Unit>) -> Self {
        let mut model = Self::default();

        for &unit in source {
            if let Some(&index) = model.indices.get(&unit) {
                if let Some(count) = model.frequencies.get_mut(index) {
                    *count += 1;
                }
            } else {
                model.indices.insert(unit, model.units.len());
                model.units.push(unit);
                model.frequencies.push(1);
            }
        }

        let unit_count = model.units.len();
        model.compatibility = (0..unit_count)
            .map(|_| std::array::from_fn(|_| UnitSet::new(unit_count)))
            .collect();

        let (width, height) = source.dim();
        for ((x, y), &center) in source.indexed_iter() {
            let position = Position::new(x, y);
            let mut neighbors = [None; DIRECTION_COUNT];

            for direction in Direction::ALL {
                let Some(next) = position.step(direction, width, height) else {
                    continue;
                };
                let Some(&neighbor) = source.get([next.x, next.y]) else {
                    continue;
                };
                model.record_pair(center, neighbor, direction);
                if let Some(slot) = neighbors.get_mut(direction.index()) {
                    *slot = Some(neighbor);
                }
            }

            model.record_contexts(center, &neighbors);
        }

        tracing::info!(
            units = model.unit_count(),
            facts = model.fact_count(),
            contexts = model.contexts.len(),
            "trained statistical model on {width}x{height} grid"
        );

        model
    }

    fn record_pair(&mut self, from: Unit, to: Unit, direction: Direction) {
        if let Some(pairs) = self.pair_frequencies.get_mut(direction.index()) {
            *pairs.entry((from, to)).or_insert(0) += 1;
        }
        self.facts.insert(AdjacencyFact {
            from,
            to,
            direction,
        });

        if let (Some(&from_index), Some(&to_index)) =
            (self.indices.get(&from), self.indices.get(&to))
            && let Some(allowed) = self
                .compatibility
                .get_mut(from_index)
                .and_then(|sets| sets.get_mut(direction.index()))
        {
            allowed.insert(to_index);
        }
    }

    fn record_contexts(&mut self, center: Unit, neighbors: &[Option<Unit>; DIRECTION_COUNT]) {
        let known = neighbors
            .iter()
            .enumerate()
            .filter(|(_, neighbor)| neighbor.is_some())
            .fold(0_usize, |mask, (slot, _)| mask | (1 << slot));

        for mask in 0..(1_usize << DIRECTION_COUNT) {
            if mask & !known != 0 {
                continue;
            }
            let mut key = ContextKey::isolated(center);
            for (slot, (target, &neighbor)) in key.neighbors.iter_mut().zip(neighbors).enumerate() {
                if mask & (1 << slot) != 0 {
                    *target = neighbor;
                }
            }
            *self.contexts.entry(key).or_insert(0) += 1;
        }
    }

    /// Number of training cells holding `unit`, zero if unseen
    pub fn frequency(&self, unit: Unit) -> usize {
        self.unit_index(unit)
            .and_then(|index| self.frequencies.get(index))
            .copied()
            .unwrap_or(0)
    }

    /// Check whether `to` was observed one step from `from` in `direction`
    pub fn adjacency_allowed(&self, from: Unit, to: Unit, direction: Direction) -> bool {
        self.facts.contains(&AdjacencyFact {
            from,
            to,
            direction,
        })
    }

    /// Occurrences of a context, zero if never observed
    pub fn context_frequency(&self, key: &ContextKey) -> usize {
        self.contexts.get(key).copied().unwrap_or(0)
    }

    /// Occurrences of the ordered pair `(from, to)` along `direction`
    pub fn pair_frequency(&self, from: Unit, to: Unit, direction: Direction) -> usize {
        self.pair_frequencies
            .get(direction.index())
            .and_then(|pairs| pairs.get(&(from, to)))
            .copied()
            .unwrap_or(0)
    }

    /// Known units in first-seen order
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Domain index of a unit
    pub fn unit_index(&self, unit: Unit) -> Option<usize> {
        self.indices.get(&unit).copied()
    }

    /// Unit stored at a domain index
    pub fn unit(&self, index: usize) -> Option<Unit> {
        self.units.get(index).copied()
    }

    /// Domain containing every known unit
    pub fn full_domain(&self) -> UnitSet {
        UnitSet::all(self.units.len())
    }

    /// Units permitted one step from unit `index` in `direction`
    pub fn compatible(&self, index: usize, direction: Direction) -> Option<&UnitSet> {
        self.compatibility.get(index)?.get(direction.index())
    }

    /// Units ordered by descending frequency, ties kept in first-seen order
    pub fn units_by_frequency(&self) -> Vec<(Unit, usize)> {
        let mut ranked: Vec<(Unit, usize)> = self
            .units
            .iter()
            .copied()
            .zip(self.frequencies.iter().copied())
            .collect();
        ranked.sort_by_key(|&(_, count)| Reverse(count));
        ranked
    }

    /// Number of distinct adjacency facts
    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    /// Number of distinct units
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Check whether the model has seen no units at all
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
