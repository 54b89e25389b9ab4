use bitvec::prelude::*;
use std::fmt;

/// Fixed-size bitset over unit indices
///
/// Backs cell domains, tested-value exclusions and per-direction
/// compatibility sets. Bit `i` refers to the model's `i`-th unit, so
/// iteration yields candidates in first-seen training order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnitSet {
    bits: BitVec,
}

impl UnitSet {
    /// Create a set with no units present
    pub fn new(unit_count: usize) -> Self {
        Self {
            bits: bitvec![0; unit_count],
        }
    }

    /// Create a set containing every unit
    pub fn all(unit_count: usize) -> Self {
        Self {
            bits: bitvec![1; unit_count],
        }
    }

    /// Create a set holding exactly one unit
    pub fn singleton(unit_count: usize, unit: usize) -> Self {
        let mut set = Self::new(unit_count);
        set.insert(unit);
        set
    }

    /// Number of units the set can address
    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// Insert a unit index, ignoring indices beyond capacity
    pub fn insert(&mut self, unit: usize) {
        if unit < self.bits.len() {
            self.bits.set(unit, true);
        }
    }

    /// Remove a unit index
    pub fn remove(&mut self, unit: usize) {
        if unit < self.bits.len() {
            self.bits.set(unit, false);
        }
    }

    /// Test unit membership
    pub fn contains(&self, unit: usize) -> bool {
        self.bits.get(unit).as_deref() == Some(&true)
    }

    /// Intersect this set with another in-place
    pub fn intersect_with(&mut self, other: &Self) {
        self.bits &= &other.bits;
    }

    /// Create a new set containing the intersection
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.intersect_with(other);
        result
    }

    /// Create a new set with every unit of `other` removed
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for unit in other.bits.iter_ones() {
            result.remove(unit);
        }
        result
    }

    /// Test if no units are present
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Count units in the set
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// The only member, if the set holds exactly one unit
    pub fn single(&self) -> Option<usize> {
        let mut ones = self.bits.iter_ones();
        match (ones.next(), ones.next()) {
            (Some(unit), None) => Some(unit),
            _ => None,
        }
    }

    /// Iterate members in ascending index order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    /// Extract all unit indices as a vector
    pub fn to_vec(&self) -> Vec<usize> {
        self.bits.iter_ones().collect()
    }
}

impl fmt::Display for UnitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitSet({} units: {:?})", self.count(), self.to_vec())
    }
}
