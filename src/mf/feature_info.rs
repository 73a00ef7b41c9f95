//! Per-feature training summaries.

use serde::{Deserialize, Serialize};

/// Summary of how one latent feature was trained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureInfo {
    feature: usize,
    user_average: f64,
    item_average: f64,
    singular_value: f64,
    iteration_count: usize,
    training_errors: Vec<f64>,
    last_delta: f64,
}

impl FeatureInfo {
    /// Starts a summary for `feature`.
    #[must_use]
    pub fn builder(feature: usize) -> FeatureInfoBuilder {
        FeatureInfoBuilder {
            info: Self {
                feature,
                user_average: 0.0,
                item_average: 0.0,
                singular_value: 0.0,
                iteration_count: 0,
                training_errors: Vec::new(),
                last_delta: f64::NAN,
            },
        }
    }

    /// Feature position.
    #[must_use]
    pub fn feature(&self) -> usize {
        self.feature
    }

    /// Mean of the user column.
    #[must_use]
    pub fn user_average(&self) -> f64 {
        self.user_average
    }

    /// Mean of the item column.
    #[must_use]
    pub fn item_average(&self) -> f64 {
        self.item_average
    }

    /// Product of the user and item column norms.
    #[must_use]
    pub fn singular_value(&self) -> f64 {
        self.singular_value
    }

    /// Iterations the stopping condition allowed.
    #[must_use]
    pub fn iteration_count(&self) -> usize {
        self.iteration_count
    }

    /// RMSE after each training round.
    #[must_use]
    pub fn training_errors(&self) -> &[f64] {
        &self.training_errors
    }

    /// RMSE of the final round; NaN if no round ran.
    #[must_use]
    pub fn last_rmse(&self) -> f64 {
        self.training_errors.last().copied().unwrap_or(f64::NAN)
    }

    /// Error change reported by the controller when training stopped.
    #[must_use]
    pub fn last_delta(&self) -> f64 {
        self.last_delta
    }
}

/// Accumulates a [`FeatureInfo`] while a feature trains.
#[derive(Debug, Clone)]
pub struct FeatureInfoBuilder {
    info: FeatureInfo,
}

impl FeatureInfoBuilder {
    /// Records one round's RMSE.
    pub fn add_training_round(&mut self, rmse: f64) -> &mut Self {
        self.info.training_errors.push(rmse);
        self
    }

    /// Sets the column means.
    pub fn averages(&mut self, user: f64, item: f64) -> &mut Self {
        self.info.user_average = user;
        self.info.item_average = item;
        self
    }

    /// Sets the singular value.
    pub fn singular_value(&mut self, value: f64) -> &mut Self {
        self.info.singular_value = value;
        self
    }

    /// Sets the final controller statistics.
    pub fn controller_state(&mut self, iterations: usize, last_delta: f64) -> &mut Self {
        self.info.iteration_count = iterations;
        self.info.last_delta = last_delta;
        self
    }

    /// Finishes the summary.
    #[must_use]
    pub fn build(self) -> FeatureInfo {
        self.info
    }
}
