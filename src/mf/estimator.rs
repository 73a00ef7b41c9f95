//! Running per-rating estimates during feature-by-feature training.

use crate::baseline::BiasModel;
use crate::data::{IndexedRating, PreferenceDomain};

/// Current prediction for every training rating, built from the bias model
/// and every feature trained so far.
///
/// Values are indexed by [`IndexedRating::index`].
#[derive(Debug, Clone)]
pub struct TrainingEstimator<'a> {
    ratings: &'a [IndexedRating],
    estimates: Vec<f64>,
    domain: Option<PreferenceDomain>,
}

impl<'a> TrainingEstimator<'a> {
    /// Seeds estimates with the (clamped) bias prediction of each rating.
    pub fn new(
        ratings: &'a [IndexedRating],
        baseline: &dyn BiasModel,
        domain: Option<PreferenceDomain>,
    ) -> Self {
        let estimates = ratings
            .iter()
            .map(|r| clamp(domain.as_ref(), baseline.prediction(r.user, r.item)))
            .collect();
        Self {
            ratings,
            estimates,
            domain,
        }
    }

    /// Estimate for `rating`.
    #[must_use]
    pub fn get(&self, rating: &IndexedRating) -> f64 {
        self.estimates[rating.index]
    }

    /// All estimates in rating order.
    #[must_use]
    pub fn estimates(&self) -> &[f64] {
        &self.estimates
    }

    /// Folds a converged feature into every estimate.
    ///
    /// `user_column` and `item_column` are indexed by dense user and item
    /// index respectively.
    pub fn update<U, I>(&mut self, user_column: &U, item_column: &I)
    where
        U: std::ops::Index<usize, Output = f64> + ?Sized,
        I: std::ops::Index<usize, Output = f64> + ?Sized,
    {
        for r in self.ratings {
            let est = self.estimates[r.index]
                + user_column[r.user_index] * item_column[r.item_index];
            self.estimates[r.index] = clamp(self.domain.as_ref(), est);
        }
    }
}

fn clamp(domain: Option<&PreferenceDomain>, value: f64) -> f64 {
    domain.map_or(value, |d| d.clamp_value(value))
}
