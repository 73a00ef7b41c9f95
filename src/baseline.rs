//! Bias terms that biased matrix factorization trains residuals against.
//!
//! Fitting baselines (global, user, or item means) is outside this crate;
//! the trainer only needs the [`BiasModel`] interface.

use crate::sparse::SparseVector;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Source of the bias part of a prediction:
/// `intercept + user_bias(u) + item_bias(i)`.
pub trait BiasModel: Send + Sync {
    /// Global offset.
    fn intercept(&self) -> f64;

    /// Offset for `user`; 0.0 when unknown.
    fn user_bias(&self, user: i64) -> f64;

    /// Offset for `item`; 0.0 when unknown.
    fn item_bias(&self, item: i64) -> f64;

    /// Offsets for several items at once.
    fn item_biases(&self, items: &[i64]) -> SparseVector {
        items
            .iter()
            .map(|&item| (item, self.item_bias(item)))
            .collect()
    }

    /// Complete bias prediction for a user-item pair.
    fn prediction(&self, user: i64, item: i64) -> f64 {
        self.intercept() + self.user_bias(user) + self.item_bias(item)
    }
}

/// Explicit bias terms: an intercept plus optional per-user/per-item offsets.
///
/// # Examples
///
/// ```
/// use mfkit::baseline::{BiasModel, BiasTerms};
///
/// let bias = BiasTerms::new(3.5)
///     .with_user_bias(1, 0.25)
///     .with_item_bias(10, -0.5);
/// assert_eq!(bias.prediction(1, 10), 3.25);
/// assert_eq!(bias.prediction(2, 99), 3.5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BiasTerms {
    intercept: f64,
    users: HashMap<i64, f64>,
    items: HashMap<i64, f64>,
}

impl BiasTerms {
    /// Bias terms with only an intercept.
    #[must_use]
    pub fn new(intercept: f64) -> Self {
        Self {
            intercept,
            ..Self::default()
        }
    }

    /// No bias at all; the factors model raw ratings.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Sets the offset for `user`.
    #[must_use]
    pub fn with_user_bias(mut self, user: i64, bias: f64) -> Self {
        self.users.insert(user, bias);
        self
    }

    /// Sets the offset for `item`.
    #[must_use]
    pub fn with_item_bias(mut self, item: i64, bias: f64) -> Self {
        self.items.insert(item, bias);
        self
    }
}

impl BiasModel for BiasTerms {
    fn intercept(&self) -> f64 {
        self.intercept
    }

    fn user_bias(&self, user: i64) -> f64 {
        self.users.get(&user).copied().unwrap_or(0.0)
    }

    fn item_bias(&self, item: i64) -> f64 {
        self.items.get(&item).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::SparseRead;

    #[test]
    fn test_zero_bias() {
        let b = BiasTerms::zero();
        assert_eq!(b.prediction(1, 2), 0.0);
    }

    #[test]
    fn test_item_biases_covers_requested_items() {
        let b = BiasTerms::new(1.0).with_item_bias(5, 0.5);
        let v = b.item_biases(&[5, 6]);
        assert_eq!(v.len(), 2);
        assert_eq!(v.get(5), 0.5);
        assert_eq!(v.get(6), 0.0);
    }

    #[test]
    fn test_user_bias_applies() {
        let b = BiasTerms::new(2.0).with_user_bias(7, -1.0);
        assert_eq!(b.user_bias(7), -1.0);
        assert_eq!(b.prediction(7, 1), 1.0);
    }
}
