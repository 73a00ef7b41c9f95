//! Bidirectional mapping between sparse entity ids and dense indices.
//!
//! A [`KeyIndexBuilder`] interns ids during a single scan over the data; the
//! frozen [`KeyIndex`] is then shared read-only by training and scoring.
//! Indices are always the dense range `0..len()`.

use crate::error::{MfError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Immutable id ↔ index mapping.
///
/// # Examples
///
/// ```
/// use mfkit::index::KeyIndex;
///
/// let index = KeyIndex::from_ids([42, 7, 42, 19]);
/// assert_eq!(index.len(), 3);
/// assert_eq!(index.index_of(7).expect("interned"), 1);
/// assert_eq!(index.id_at(2).expect("in range"), 19);
/// assert_eq!(index.try_index_of(1000), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<i64>")]
pub struct KeyIndex {
    ids: Vec<i64>,
    index_of: HashMap<i64, usize>,
}

impl KeyIndex {
    /// Builds an index over `ids` in first-seen order; repeats are ignored.
    pub fn from_ids<I: IntoIterator<Item = i64>>(ids: I) -> Self {
        let mut builder = KeyIndexBuilder::new();
        for id in ids {
            builder.intern(id);
        }
        builder.build()
    }

    /// Builds an index over `ids` sorted ascending, duplicates removed.
    pub fn sorted<I: IntoIterator<Item = i64>>(ids: I) -> Self {
        let mut ids: Vec<i64> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self::from_ids(ids)
    }

    /// Number of interned ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if no ids are interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Strict lookup of the index for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`MfError::KeyNotFound`] if `id` is not interned.
    pub fn index_of(&self, id: i64) -> Result<usize> {
        self.try_index_of(id)
            .ok_or(MfError::KeyNotFound { key: id })
    }

    /// Lenient lookup; `None` for ids that are not interned.
    #[must_use]
    pub fn try_index_of(&self, id: i64) -> Option<usize> {
        self.index_of.get(&id).copied()
    }

    /// Returns true if `id` is interned.
    #[must_use]
    pub fn contains(&self, id: i64) -> bool {
        self.index_of.contains_key(&id)
    }

    /// The id stored at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`MfError::IndexOutOfBounds`] if `index >= len()`.
    pub fn id_at(&self, index: usize) -> Result<i64> {
        self.ids
            .get(index)
            .copied()
            .ok_or_else(|| MfError::index_out_of_bounds(index, self.ids.len()))
    }

    /// All ids in index order.
    #[must_use]
    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    /// Iterates `(index, id)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, i64)> + '_ {
        self.ids.iter().copied().enumerate()
    }
}

impl TryFrom<Vec<i64>> for KeyIndex {
    type Error = MfError;

    fn try_from(ids: Vec<i64>) -> Result<Self> {
        let n = ids.len();
        let index = Self::from_ids(ids);
        if index.len() != n {
            return Err(MfError::FormatError {
                message: format!(
                    "key index holds duplicate ids ({} unique of {n})",
                    index.len()
                ),
            });
        }
        Ok(index)
    }
}

impl From<KeyIndex> for Vec<i64> {
    fn from(index: KeyIndex) -> Self {
        index.ids
    }
}

/// Incremental builder that interns ids as they are encountered.
#[derive(Debug, Clone, Default)]
pub struct KeyIndexBuilder {
    ids: Vec<i64>,
    index_of: HashMap<i64, usize>,
}

impl KeyIndexBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of `id`, allocating the next index if it is new.
    pub fn intern(&mut self, id: i64) -> usize {
        let next = self.ids.len();
        let idx = *self.index_of.entry(id).or_insert(next);
        if idx == next {
            self.ids.push(id);
        }
        idx
    }

    /// Number of ids interned so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if nothing has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Lenient lookup against the ids interned so far.
    #[must_use]
    pub fn try_index_of(&self, id: i64) -> Option<usize> {
        self.index_of.get(&id).copied()
    }

    /// Snapshots the current state into an immutable index.
    ///
    /// The builder remains usable; later interning does not affect the copy.
    #[must_use]
    pub fn freeze(&self) -> KeyIndex {
        KeyIndex {
            ids: self.ids.clone(),
            index_of: self.index_of.clone(),
        }
    }

    /// Consumes the builder into an immutable index without copying.
    #[must_use]
    pub fn build(self) -> KeyIndex {
        KeyIndex {
            ids: self.ids,
            index_of: self.index_of,
        }
    }
}

#[cfg(test)]
#[path = "keys_tests.rs"]
mod tests;
