//! Weighted bag.
//!
//! A bag maps each item to a non-negative integer weight. Drawing from the bag
//! picks item `i` with probability `w_i / W`, where `W` is the sum of all
//! weights. Draws do not consume anything: the distribution only changes
//! through [`WeightedBag::add`] and [`WeightedBag::remove`].
//!
//! Sampling walks the entries once, accumulating weights, and returns the first
//! item whose running sum exceeds a uniform draw from `[0, W)`, so a draw is
//! O(n) in the number of distinct items while `add`/`remove` stay O(1).
//!
//! Notes:
//! - `pull_with_rng` exists for deterministic testing/benchmarking.
//! - Items whose weight drops to zero stay in the bag (and in `items`/`entries`)
//!   until [`WeightedBag::prune`] is called.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use rand::prelude::*;

use crate::error::WeightOverflow;

/// Weight of a single item, and of the bag as a whole.
pub type Weight = u64;

/// A multiset that supports weighted random draws.
#[derive(Debug, Clone)]
pub struct WeightedBag<T> {
    data: HashMap<T, Weight>,
    // Always equal to `data.values().sum()`.
    total: Weight,
}

impl<T> Default for WeightedBag<T> {
    fn default() -> Self {
        Self {
            data: HashMap::new(),
            total: 0,
        }
    }
}

impl<T> WeightedBag<T> {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all weights.
    #[inline]
    pub fn count_contents(&self) -> Weight {
        self.total
    }

    /// Number of distinct items, including those at weight zero.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if no items are tracked at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// All tracked items, including those at weight zero.
    pub fn items(&self) -> impl Iterator<Item = &T> + '_ {
        self.data.keys()
    }

    /// All tracked items with their current weights.
    pub fn entries(&self) -> impl Iterator<Item = (&T, Weight)> + '_ {
        self.data.iter().map(|(item, &weight)| (item, weight))
    }

    /// Read-only view of the underlying map.
    pub fn as_map(&self) -> &HashMap<T, Weight> {
        &self.data
    }

    /// Remove every item and reset the total.
    pub fn clear(&mut self) {
        self.data.clear();
        self.total = 0;
    }

    /// Remove items whose weight has dropped to zero.
    ///
    /// Returns the number of entries removed.
    pub fn prune(&mut self) -> usize {
        let before = self.data.len();
        self.data.retain(|_, weight| *weight > 0);
        before - self.data.len()
    }

    /// Draw an item with probability proportional to its weight.
    ///
    /// Returns `None` when the total weight is zero.
    pub fn pull(&self) -> Option<&T> {
        let mut rng = rand::rng();
        self.pull_with_rng(&mut rng)
    }

    /// Draw an item using a caller-supplied RNG.
    pub fn pull_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&T> {
        if self.total == 0 {
            return None;
        }

        let threshold = rng.random_range(0..self.total);
        let mut cumulative: Weight = 0;
        for (item, &weight) in &self.data {
            cumulative += weight;
            if cumulative > threshold {
                return Some(item);
            }
        }

        // Unreachable while `total` matches the map.
        None
    }

    pub(crate) fn map_mut(&mut self) -> &mut HashMap<T, Weight> {
        &mut self.data
    }

    pub(crate) fn set_total(&mut self, total: Weight) {
        self.total = total;
    }
}

impl<T: Eq + Hash> WeightedBag<T> {
    /// Create a bag from `(item, weight)` pairs.
    ///
    /// A repeated item keeps the last weight given for it.
    ///
    /// # Panics
    ///
    /// Panics if the weights sum past `u64::MAX`; see [`Self::try_from_entries`].
    pub fn from_entries<I: IntoIterator<Item = (T, Weight)>>(entries: I) -> Self {
        Self::from(entries.into_iter().collect::<HashMap<_, _>>())
    }

    /// Create a bag from `(item, weight)` pairs, failing if the total overflows.
    pub fn try_from_entries<I: IntoIterator<Item = (T, Weight)>>(
        entries: I,
    ) -> Result<Self, WeightOverflow> {
        Self::try_from_map(entries.into_iter().collect())
    }

    /// Wrap an existing map, failing if its weights sum past `u64::MAX`.
    pub fn try_from_map(data: HashMap<T, Weight>) -> Result<Self, WeightOverflow> {
        let total = data
            .values()
            .try_fold(0 as Weight, |acc, &weight| acc.checked_add(weight))
            .ok_or(WeightOverflow)?;
        Ok(Self { data, total })
    }

    /// Add one unit of weight to `item`, inserting it if absent.
    ///
    /// # Panics
    ///
    /// Panics if the total weight is already `u64::MAX`; see [`Self::try_add`].
    pub fn add(&mut self, item: T) {
        if self.try_add(item).is_err() {
            panic!("WeightedBag::add: total weight overflows u64");
        }
    }

    /// Add one unit of weight to `item`, or leave the bag untouched if the
    /// total is already `u64::MAX`.
    pub fn try_add(&mut self, item: T) -> Result<(), WeightOverflow> {
        // Every item weight is bounded by the total, so this also covers the entry.
        let total = self.total.checked_add(1).ok_or(WeightOverflow)?;
        *self.data.entry(item).or_insert(0) += 1;
        self.total = total;
        Ok(())
    }

    /// Take one unit of weight from `item`.
    ///
    /// Returns `false` if `item` is absent or already at weight zero. The entry
    /// itself is kept even when its weight reaches zero.
    pub fn remove<Q>(&mut self, item: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.data.get_mut(item) {
            Some(weight) if *weight > 0 => {
                *weight -= 1;
                self.total -= 1;
                true
            }
            _ => false,
        }
    }

    /// Current weight of `item` (zero if absent).
    pub fn weight<Q>(&self, item: &Q) -> Weight
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.data.get(item).copied().unwrap_or(0)
    }

    /// True if `item` is tracked, whatever its weight.
    pub fn contains<Q>(&self, item: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.data.contains_key(item)
    }
}

/// # Panics
///
/// Panics if the weights sum past `u64::MAX`; see [`WeightedBag::try_from_map`].
impl<T: Eq + Hash> From<HashMap<T, Weight>> for WeightedBag<T> {
    fn from(data: HashMap<T, Weight>) -> Self {
        match Self::try_from_map(data) {
            Ok(bag) => bag,
            Err(_) => panic!("WeightedBag::from: total weight overflows u64"),
        }
    }
}

impl<T: Eq + Hash> FromIterator<(T, Weight)> for WeightedBag<T> {
    fn from_iter<I: IntoIterator<Item = (T, Weight)>>(iter: I) -> Self {
        Self::from_entries(iter)
    }
}

impl<T: Eq + Hash> Extend<T> for WeightedBag<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.add(item);
        }
    }
}

impl<T: Eq + Hash> PartialEq for WeightedBag<T> {
    fn eq(&self, other: &Self) -> bool {
        // Same length plus one-way containment gives containment both ways.
        self.total == other.total
            && self.data.len() == other.data.len()
            && self
                .data
                .iter()
                .all(|(item, weight)| other.data.get(item) == Some(weight))
    }
}

impl<T: Eq + Hash> Eq for WeightedBag<T> {}
