//! Core traits shared by scoring components.

use crate::sparse::{SparseRead, SparseVector};

/// Scores items for a user.
///
/// Unknown users and items are a normal case: they are simply left out of
/// the result rather than reported as errors.
///
/// # Examples
///
/// ```
/// use mfkit::sparse::{SparseRead, SparseVector};
/// use mfkit::traits::ItemScorer;
///
/// struct Popularity;
///
/// impl ItemScorer for Popularity {
///     fn score(&self, _user: i64, items: &[i64]) -> SparseVector {
///         items.iter().map(|&i| (i, -(i as f64))).collect()
///     }
/// }
///
/// let top = Popularity.recommend(1, &[3, 1, 2], 2);
/// assert_eq!(top, vec![(1, -1.0), (2, -2.0)]);
/// assert_eq!(Popularity.score_one(1, 5), Some(-5.0));
/// ```
pub trait ItemScorer: Send + Sync {
    /// Scores `items` for `user`; items that cannot be scored are absent.
    fn score(&self, user: i64, items: &[i64]) -> SparseVector;

    /// Score of a single item, if it can be scored.
    fn score_one(&self, user: i64, item: i64) -> Option<f64> {
        let scores = self.score(user, &[item]);
        scores
            .contains_key(item)
            .then(|| scores.get(item))
    }

    /// Up to `n` of `candidates`, best first. Ties go to the lower item id.
    fn recommend(&self, user: i64, candidates: &[i64], n: usize) -> Vec<(i64, f64)> {
        let mut ranked: Vec<(i64, f64)> = self.score(user, candidates).iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(n);
        ranked
    }
}
