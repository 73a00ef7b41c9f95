//! Feature-by-feature FunkSVD training.

use super::config::FeatureInit;
use super::estimator::TrainingEstimator;
use super::feature_info::{FeatureInfo, FeatureInfoBuilder};
use super::funksvd::FunkSvdModel;
use super::model::MfModel;
use super::update::{ErrorAccumulator, FunkSvdUpdateRule};
use crate::baseline::BiasModel;
use crate::data::RatingSnapshot;
use crate::error::{MfError, Result};
use crate::primitives::{dot, ColumnMut, Matrix, MatrixRead};
use crate::stopping::CancellationToken;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Builds [`FunkSvdModel`]s from rating snapshots.
///
/// Features are trained strictly in order: each one fits the residual left
/// by the bias model and every earlier feature. Within a feature, every
/// rating is visited once per iteration until the update rule's stopping
/// condition says stop.
///
/// The trainer holds no per-run state, so one trainer can build any number
/// of models, including concurrently from several threads.
///
/// # Examples
///
/// ```
/// use mfkit::baseline::BiasTerms;
/// use mfkit::data::RatingSnapshot;
/// use mfkit::mf::{FunkSvdTrainer, FunkSvdUpdateRule};
/// use mfkit::stopping::IterationCountStoppingCondition;
///
/// let snapshot = RatingSnapshot::from_ratings([
///     (1_i64, 1_i64, 5.0),
///     (1, 2, 3.0),
///     (2, 1, 4.0),
///     (2, 2, 2.0),
/// ]);
/// let stop = IterationCountStoppingCondition::new(20).expect("positive");
/// let rule = FunkSvdUpdateRule::new(0.05, 0.0, stop).expect("valid");
/// let trainer = FunkSvdTrainer::new(2, rule).expect("valid");
///
/// let model = trainer
///     .train(&snapshot, &BiasTerms::new(3.5))
///     .expect("training succeeds");
/// assert_eq!(model.feature_count(), 2);
/// assert_eq!(model.features()[0].iteration_count(), 20);
/// ```
#[derive(Debug, Clone)]
pub struct FunkSvdTrainer {
    feature_count: usize,
    initial_value: f64,
    init: FeatureInit,
    rule: FunkSvdUpdateRule,
    cancellation: Option<CancellationToken>,
}

impl FunkSvdTrainer {
    /// Creates a trainer with constant initialization at 0.1.
    ///
    /// # Errors
    ///
    /// Returns an error if `feature_count` is zero.
    pub fn new(feature_count: usize, rule: FunkSvdUpdateRule) -> Result<Self> {
        if feature_count == 0 {
            return Err(MfError::invalid_hyperparameter("feature_count", 0, ">= 1"));
        }
        Ok(Self {
            feature_count,
            initial_value: 0.1,
            init: FeatureInit::Constant,
            rule,
            cancellation: None,
        })
    }

    /// Sets the value every feature entry starts from.
    #[must_use]
    pub fn with_initial_value(mut self, initial_value: f64) -> Self {
        self.initial_value = initial_value;
        self
    }

    /// Sets the column initialization.
    #[must_use]
    pub fn with_init(mut self, init: FeatureInit) -> Self {
        self.init = init;
        self
    }

    /// Checks `token` once per training iteration.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Number of features trained.
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    /// The update rule.
    #[must_use]
    pub fn rule(&self) -> &FunkSvdUpdateRule {
        &self.rule
    }

    /// Trains a model on `snapshot`, fitting residuals of `baseline`.
    ///
    /// # Errors
    ///
    /// Returns [`MfError::Cancelled`] if the cancellation token trips; no
    /// partial model is produced.
    pub fn train(&self, snapshot: &RatingSnapshot, baseline: &dyn BiasModel) -> Result<FunkSvdModel> {
        let started = Instant::now();
        debug!(
            features = self.feature_count,
            learning_rate = self.rule.learning_rate(),
            regularization = self.rule.regularization(),
            ratings = snapshot.len(),
            users = snapshot.user_index().len(),
            items = snapshot.item_index().len(),
            "setting up FunkSVD build"
        );

        let (mut user_features, mut item_features) = self.initial_matrices(
            snapshot.user_index().len(),
            snapshot.item_index().len(),
        )?;
        let mut estimator = self.rule.make_estimator(snapshot, baseline);
        let mut features = Vec::with_capacity(self.feature_count);

        for f in 0..self.feature_count {
            trace!(feature = f, "training feature");
            let feature_started = Instant::now();
            let trail = self.trailing_values(snapshot, &user_features, &item_features, f)?;

            let mut summary = FeatureInfo::builder(f);
            let mut ufv = user_features.column_mut(f)?;
            let mut ifv = item_features.column_mut(f)?;
            self.train_feature(f, snapshot, &estimator, &trail, &mut ufv, &mut ifv, &mut summary)?;

            let (uvec, ivec) = (ufv.to_vector(), ifv.to_vector());
            summary
                .averages(mean_or_zero(uvec.as_slice()), mean_or_zero(ivec.as_slice()))
                .singular_value(uvec.norm() * ivec.norm());
            estimator.update(&ufv, &ifv);

            let summary = summary.build();
            debug!(
                feature = f,
                iterations = summary.iteration_count(),
                rmse = summary.last_rmse(),
                elapsed = ?feature_started.elapsed(),
                "finished feature"
            );
            features.push(summary);
        }

        let mf = MfModel::new(
            user_features.freeze(),
            item_features.freeze(),
            snapshot.user_index().clone(),
            snapshot.item_index().clone(),
        )?;
        let model = FunkSvdModel::new(mf, features, self.rule.domain().copied())?;
        info!(
            features = self.feature_count,
            users = model.mf().user_count(),
            items = model.mf().item_count(),
            elapsed = ?started.elapsed(),
            "built FunkSVD model"
        );
        Ok(model)
    }

    #[allow(clippy::too_many_arguments)]
    fn train_feature(
        &self,
        feature: usize,
        snapshot: &RatingSnapshot,
        estimator: &TrainingEstimator<'_>,
        trail: &[f64],
        ufv: &mut ColumnMut<'_>,
        ifv: &mut ColumnMut<'_>,
        summary: &mut FeatureInfoBuilder,
    ) -> Result<()> {
        let mut controller = self.rule.new_loop();
        let mut rmse = f64::MAX;
        loop {
            self.check_cancelled(feature, controller.iteration_count())?;
            if !controller.keep_training(rmse) {
                break;
            }

            let mut errors = ErrorAccumulator::new();
            for r in snapshot.ratings() {
                let (ouf, oif) = (ufv[r.user_index], ifv[r.item_index]);
                let err = self
                    .rule
                    .compute_error(r.value, estimator.get(r), trail[r.index], ouf, oif);
                ufv[r.user_index] += self.rule.user_update(err, ouf, oif);
                ifv[r.item_index] += self.rule.item_update(err, ouf, oif);
                errors.add(err);
            }
            rmse = errors.rmse();
            summary.add_training_round(rmse);
            trace!(
                feature,
                iteration = controller.iteration_count(),
                rmse,
                "iteration finished"
            );
        }
        summary.controller_state(controller.iteration_count(), controller.last_delta());
        Ok(())
    }

    fn check_cancelled(&self, feature: usize, iterations: usize) -> Result<()> {
        match &self.cancellation {
            Some(token) if token.is_cancelled() => {
                warn!(feature, iterations, "FunkSVD training cancelled");
                Err(MfError::Cancelled {
                    feature,
                    iterations,
                })
            }
            _ => Ok(()),
        }
    }

    /// Contribution of the not-yet-trained features to each rating.
    fn trailing_values(
        &self,
        snapshot: &RatingSnapshot,
        users: &Matrix,
        items: &Matrix,
        feature: usize,
    ) -> Result<Vec<f64>> {
        let mut trail = vec![0.0; snapshot.len()];
        if !self.rule.use_trailing_estimate() || feature + 1 == self.feature_count {
            return Ok(trail);
        }
        for r in snapshot.ratings() {
            let urow = users.row_slice(r.user_index)?;
            let irow = items.row_slice(r.item_index)?;
            trail[r.index] = dot(&urow[feature + 1..], &irow[feature + 1..]);
        }
        Ok(trail)
    }

    fn initial_matrices(&self, users: usize, items: usize) -> Result<(Matrix, Matrix)> {
        let k = self.feature_count;
        match self.init {
            FeatureInit::Constant => Ok((
                Matrix::filled(users, k, self.initial_value),
                Matrix::filled(items, k, self.initial_value),
            )),
            FeatureInit::Random { seed, scale } => {
                if !(scale >= 0.0 && scale.is_finite()) {
                    return Err(MfError::invalid_hyperparameter("init.scale", scale, ">= 0"));
                }
                let mut rng = match seed {
                    Some(s) => StdRng::seed_from_u64(s),
                    None => StdRng::from_entropy(),
                };
                let mut draw = |rows: usize| {
                    let data = (0..rows * k)
                        .map(|_| self.initial_value + rng.gen_range(-scale..=scale))
                        .collect();
                    Matrix::from_vec(rows, k, data)
                };
                let user_matrix = draw(users)?;
                let item_matrix = draw(items)?;
                Ok((user_matrix, item_matrix))
            }
        }
    }
}

fn mean_or_zero(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
#[path = "trainer_tests.rs"]
mod tests;
