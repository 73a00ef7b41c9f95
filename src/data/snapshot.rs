//! Indexed, immutable snapshot of rating data.
//!
//! The snapshot interns user and item ids into dense indices once, so the
//! training loop can address factor matrix rows directly. It is read-only
//! after construction and can be shared behind an `Arc` across repeated
//! training runs.

use crate::error::{MfError, Result};
use crate::index::{KeyIndex, KeyIndexBuilder};
use crate::sparse::SparseVector;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// A single user-item rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// User id
    pub user: i64,
    /// Item id
    pub item: i64,
    /// Rating value
    pub value: f64,
}

impl Rating {
    /// Creates a rating.
    #[must_use]
    pub fn new(user: i64, item: i64, value: f64) -> Self {
        Self { user, item, value }
    }
}

impl From<(i64, i64, f64)> for Rating {
    fn from((user, item, value): (i64, i64, f64)) -> Self {
        Self::new(user, item, value)
    }
}

/// A rating resolved against the snapshot's key indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedRating {
    /// Position of this rating in [`RatingSnapshot::ratings`]
    pub index: usize,
    /// Dense user index
    pub user_index: usize,
    /// Dense item index
    pub item_index: usize,
    /// User id
    pub user: i64,
    /// Item id
    pub item: i64,
    /// Rating value
    pub value: f64,
}

/// Immutable, indexed view over all ratings used for training.
///
/// Ratings are grouped by user (in user-index order). When the same
/// (user, item) pair occurs more than once, the last value wins.
///
/// # Examples
///
/// ```
/// use mfkit::data::{Rating, RatingSnapshot};
///
/// let snapshot = RatingSnapshot::from_ratings([
///     Rating::new(1, 10, 5.0),
///     Rating::new(2, 10, 3.0),
///     Rating::new(1, 20, 4.0),
/// ]);
/// assert_eq!(snapshot.len(), 3);
/// assert_eq!(snapshot.user_index().len(), 2);
/// assert_eq!(snapshot.user_ratings(1).len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RatingSnapshot {
    ratings: Vec<IndexedRating>,
    user_offsets: Vec<usize>,
    users: KeyIndex,
    items: KeyIndex,
}

impl RatingSnapshot {
    /// Builds a snapshot, interning ids in first-seen order.
    ///
    /// Ratings whose value is NaN or infinite are dropped with a warning;
    /// use [`RatingSnapshot::try_from_ratings`] to reject them instead.
    pub fn from_ratings<I, R>(ratings: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Rating>,
    {
        let finite = ratings.into_iter().map(Into::into).filter(|r: &Rating| {
            if r.value.is_finite() {
                true
            } else {
                warn!(
                    user = r.user,
                    item = r.item,
                    value = r.value,
                    "dropping non-finite rating"
                );
                false
            }
        });
        Self::build(finite)
    }

    /// Builds a snapshot, failing on the first NaN or infinite value.
    ///
    /// # Errors
    ///
    /// Returns [`MfError::NonFiniteRating`] naming the offending rating.
    pub fn try_from_ratings<I, R>(ratings: I) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: Into<Rating>,
    {
        let checked = ratings
            .into_iter()
            .map(|r| {
                let r: Rating = r.into();
                if r.value.is_finite() {
                    Ok(r)
                } else {
                    Err(MfError::NonFiniteRating {
                        user: r.user,
                        item: r.item,
                        value: r.value,
                    })
                }
            })
            .collect::<Result<Vec<Rating>>>()?;
        Ok(Self::build(checked))
    }

    fn build<I: IntoIterator<Item = Rating>>(ratings: I) -> Self {
        let mut users = KeyIndexBuilder::new();
        let mut items = KeyIndexBuilder::new();
        let mut latest: HashMap<(usize, usize), f64> = HashMap::new();

        for r in ratings {
            let u = users.intern(r.user);
            let i = items.intern(r.item);
            latest.insert((u, i), r.value);
        }

        let users = users.build();
        let items = items.build();

        let mut triples: Vec<((usize, usize), f64)> = latest.into_iter().collect();
        triples.sort_unstable_by_key(|&(key, _)| key);

        let mut user_offsets = vec![0; users.len() + 1];
        let mut indexed = Vec::with_capacity(triples.len());
        for (pos, ((u, i), value)) in triples.into_iter().enumerate() {
            user_offsets[u + 1] += 1;
            indexed.push(IndexedRating {
                index: pos,
                user_index: u,
                item_index: i,
                user: users.ids()[u],
                item: items.ids()[i],
                value,
            });
        }
        for u in 0..users.len() {
            user_offsets[u + 1] += user_offsets[u];
        }

        Self {
            ratings: indexed,
            user_offsets,
            users,
            items,
        }
    }

    /// All ratings, grouped by user index.
    #[must_use]
    pub fn ratings(&self) -> &[IndexedRating] {
        &self.ratings
    }

    /// Number of distinct (user, item) ratings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    /// Returns true if there are no ratings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// User id ↔ index mapping.
    #[must_use]
    pub fn user_index(&self) -> &KeyIndex {
        &self.users
    }

    /// Item id ↔ index mapping.
    #[must_use]
    pub fn item_index(&self) -> &KeyIndex {
        &self.items
    }

    /// Ratings by `user`; empty for unknown users.
    #[must_use]
    pub fn user_ratings(&self, user: i64) -> &[IndexedRating] {
        match self.users.try_index_of(user) {
            Some(u) => &self.ratings[self.user_offsets[u]..self.user_offsets[u + 1]],
            None => &[],
        }
    }

    /// Ratings by `user` keyed by item id.
    #[must_use]
    pub fn user_rating_vector(&self, user: i64) -> SparseVector {
        self.user_ratings(user)
            .iter()
            .map(|r| (r.item, r.value))
            .collect()
    }
}
