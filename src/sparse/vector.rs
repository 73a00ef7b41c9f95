//! Sparse vectors: partial functions from `i64` keys to `f64` values.
//!
//! Keys are kept in ascending order so that binary operations merge in
//! `O(n + m)`. An absent key is unset, which is different from zero.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Immutable sparse vector.
///
/// Cloning shares storage; [`SparseVector::into_mutable`] copies only when
/// the storage is shared with another clone.
///
/// # Examples
///
/// ```
/// use mfkit::sparse::{SparseRead, SparseVector};
///
/// let a = SparseVector::from_pairs([(1, 2.0), (3, 4.0)]);
/// let b = SparseVector::from_pairs([(3, 0.5), (9, 1.0)]);
/// assert_eq!(a.dot(&b), 2.0);
/// assert!(a.get(2).is_nan());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<(i64, f64)>", into = "Vec<(i64, f64)>")]
pub struct SparseVector {
    keys: Arc<Vec<i64>>,
    values: Arc<Vec<f64>>,
}

/// Read access shared by [`SparseVector`] and [`MutableSparseVector`].
pub trait SparseRead {
    /// Ascending keys with a value.
    fn keys(&self) -> &[i64];

    /// Values parallel to [`SparseRead::keys`].
    fn values(&self) -> &[f64];

    /// Number of set entries.
    fn len(&self) -> usize {
        self.keys().len()
    }

    /// Returns true if no entry is set.
    fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    /// Returns true if `key` has a value.
    fn contains_key(&self, key: i64) -> bool {
        self.keys().binary_search(&key).is_ok()
    }

    /// Value for `key`, or `default` if the key is unset.
    fn get_or(&self, key: i64, default: f64) -> f64 {
        match self.keys().binary_search(&key) {
            Ok(pos) => self.values()[pos],
            Err(_) => default,
        }
    }

    /// Value for `key`, or NaN if the key is unset.
    fn get(&self, key: i64) -> f64 {
        self.get_or(key, f64::NAN)
    }

    /// Iterates `(key, value)` pairs in ascending key order.
    fn iter(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.keys()
            .iter()
            .copied()
            .zip(self.values().iter().copied())
    }

    /// Sum over keys present in both vectors of the product of values.
    fn dot<V: SparseRead + ?Sized>(&self, other: &V) -> f64 {
        let (ak, av) = (self.keys(), self.values());
        let (bk, bv) = (other.keys(), other.values());
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < ak.len() && j < bk.len() {
            match ak[i].cmp(&bk[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += av[i] * bv[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Sum of set values.
    fn sum(&self) -> f64 {
        self.values().iter().sum()
    }

    /// Sum of squares of set values.
    fn sum_of_squares(&self) -> f64 {
        self.values().iter().map(|v| v * v).sum()
    }

    /// Euclidean norm over set values.
    fn norm(&self) -> f64 {
        self.sum_of_squares().sqrt()
    }

    /// Mean over set values; NaN when empty.
    fn mean(&self) -> f64 {
        if self.is_empty() {
            f64::NAN
        } else {
            self.sum() / self.len() as f64
        }
    }
}

impl SparseVector {
    /// Creates an empty vector.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a vector from pairs in any order; the last value for a
    /// repeated key wins.
    pub fn from_pairs<I: IntoIterator<Item = (i64, f64)>>(pairs: I) -> Self {
        let mut pairs: Vec<(i64, f64)> = pairs.into_iter().collect();
        pairs.sort_by_key(|&(k, _)| k);
        let mut keys: Vec<i64> = Vec::with_capacity(pairs.len());
        let mut values: Vec<f64> = Vec::with_capacity(pairs.len());
        for (k, x) in pairs {
            if keys.last() == Some(&k) {
                // stable sort keeps input order, so this is the later value
                if let Some(last) = values.last_mut() {
                    *last = x;
                }
            } else {
                keys.push(k);
                values.push(x);
            }
        }
        MutableSparseVector { keys, values }.freeze()
    }

    /// Converts into a mutable vector, copying only if storage is shared.
    #[must_use]
    pub fn into_mutable(self) -> MutableSparseVector {
        MutableSparseVector {
            keys: Arc::try_unwrap(self.keys).unwrap_or_else(|shared| (*shared).clone()),
            values: Arc::try_unwrap(self.values).unwrap_or_else(|shared| (*shared).clone()),
        }
    }
}

impl SparseRead for SparseVector {
    fn keys(&self) -> &[i64] {
        &self.keys
    }

    fn values(&self) -> &[f64] {
        &self.values
    }
}

impl From<Vec<(i64, f64)>> for SparseVector {
    fn from(pairs: Vec<(i64, f64)>) -> Self {
        Self::from_pairs(pairs)
    }
}

impl From<SparseVector> for Vec<(i64, f64)> {
    fn from(v: SparseVector) -> Self {
        v.iter().collect()
    }
}

impl FromIterator<(i64, f64)> for SparseVector {
    fn from_iter<I: IntoIterator<Item = (i64, f64)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

/// Mutable sparse vector supporting in-place `set` and `unset`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MutableSparseVector {
    keys: Vec<i64>,
    values: Vec<f64>,
}

impl MutableSparseVector {
    /// Creates an empty vector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a vector with every key in `keys` set to `value`.
    pub fn with_keys<I: IntoIterator<Item = i64>>(keys: I, value: f64) -> Self {
        let mut keys: Vec<i64> = keys.into_iter().collect();
        keys.sort_unstable();
        keys.dedup();
        let values = vec![value; keys.len()];
        Self { keys, values }
    }

    /// Sets `key` to `value`, returning the previous value if any.
    pub fn set(&mut self, key: i64, value: f64) -> Option<f64> {
        match self.keys.binary_search(&key) {
            Ok(pos) => Some(std::mem::replace(&mut self.values[pos], value)),
            Err(pos) => {
                self.keys.insert(pos, key);
                self.values.insert(pos, value);
                None
            }
        }
    }

    /// Adds `delta` to the value at `key`, treating an unset key as zero.
    pub fn add(&mut self, key: i64, delta: f64) -> f64 {
        match self.keys.binary_search(&key) {
            Ok(pos) => {
                self.values[pos] += delta;
                self.values[pos]
            }
            Err(pos) => {
                self.keys.insert(pos, key);
                self.values.insert(pos, delta);
                delta
            }
        }
    }

    /// Removes `key`, returning its value if it was set.
    pub fn unset(&mut self, key: i64) -> Option<f64> {
        let pos = self.keys.binary_search(&key).ok()?;
        self.keys.remove(pos);
        Some(self.values.remove(pos))
    }

    /// Moves the storage into an immutable vector without copying.
    #[must_use]
    pub fn freeze(self) -> SparseVector {
        SparseVector {
            keys: Arc::new(self.keys),
            values: Arc::new(self.values),
        }
    }
}

impl SparseRead for MutableSparseVector {
    fn keys(&self) -> &[i64] {
        &self.keys
    }

    fn values(&self) -> &[f64] {
        &self.values
    }
}

#[cfg(test)]
#[path = "vector_tests.rs"]
mod tests;
