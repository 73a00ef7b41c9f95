//! The FunkSVD gradient-descent update rule.

use super::estimator::TrainingEstimator;
use crate::baseline::BiasModel;
use crate::data::{PreferenceDomain, RatingSnapshot};
use crate::error::{MfError, Result};
use crate::stopping::{StoppingCondition, TrainingLoopController};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Regularized SGD update for one feature of one (user, item) pair.
///
/// For a rating `r` with running estimate `e`, trailing value `t` and
/// current feature values `u`, `i`:
///
/// ```text
/// prediction = clamp(clamp(e + u * i) + t)     (t only with trailing estimate)
/// error      = r - prediction
/// Δu         = lr * (error * i - reg * u)
/// Δi         = lr * (error * u - reg * i)
/// ```
///
/// The rule also owns the stopping condition, so a fresh training-loop
/// controller can be requested for every feature.
///
/// # Examples
///
/// ```
/// use mfkit::mf::FunkSvdUpdateRule;
/// use mfkit::stopping::IterationCountStoppingCondition;
///
/// let stop = IterationCountStoppingCondition::new(10).expect("positive");
/// let rule = FunkSvdUpdateRule::new(0.01, 0.0, stop)
///     .expect("valid")
///     .with_trailing_estimate(false);
///
/// let err = rule.compute_error(4.0, 3.0, 0.0, 1.0, 0.5);
/// assert!((err - 0.5).abs() < 1e-12);
/// assert!((rule.user_update(err, 1.0, 0.5) - 0.0025).abs() < 1e-12);
/// ```
#[derive(Clone)]
pub struct FunkSvdUpdateRule {
    learning_rate: f64,
    regularization: f64,
    use_trailing_estimate: bool,
    domain: Option<PreferenceDomain>,
    stopping: Arc<dyn StoppingCondition>,
}

impl fmt::Debug for FunkSvdUpdateRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunkSvdUpdateRule")
            .field("learning_rate", &self.learning_rate)
            .field("regularization", &self.regularization)
            .field("use_trailing_estimate", &self.use_trailing_estimate)
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}

impl FunkSvdUpdateRule {
    /// Creates an update rule with trailing estimates enabled and no domain.
    ///
    /// # Errors
    ///
    /// Returns an error if `learning_rate` is not positive or
    /// `regularization` is negative.
    pub fn new<S>(learning_rate: f64, regularization: f64, stopping: S) -> Result<Self>
    where
        S: StoppingCondition + 'static,
    {
        Self::with_shared_stopping(learning_rate, regularization, Arc::new(stopping))
    }

    /// Like [`FunkSvdUpdateRule::new`], for an already shared stopping condition.
    ///
    /// # Errors
    ///
    /// Same as [`FunkSvdUpdateRule::new`].
    pub fn with_shared_stopping(
        learning_rate: f64,
        regularization: f64,
        stopping: Arc<dyn StoppingCondition>,
    ) -> Result<Self> {
        if !(learning_rate > 0.0 && learning_rate.is_finite()) {
            return Err(MfError::invalid_hyperparameter(
                "learning_rate",
                learning_rate,
                "> 0",
            ));
        }
        if !(regularization >= 0.0 && regularization.is_finite()) {
            return Err(MfError::invalid_hyperparameter(
                "regularization",
                regularization,
                ">= 0",
            ));
        }
        Ok(Self {
            learning_rate,
            regularization,
            use_trailing_estimate: true,
            domain: None,
            stopping,
        })
    }

    /// Clamps predictions into `domain`.
    #[must_use]
    pub fn with_domain(mut self, domain: PreferenceDomain) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Enables or disables the trailing-feature correction.
    #[must_use]
    pub fn with_trailing_estimate(mut self, enabled: bool) -> Self {
        self.use_trailing_estimate = enabled;
        self
    }

    /// Learning rate.
    #[must_use]
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Regularization factor.
    #[must_use]
    pub fn regularization(&self) -> f64 {
        self.regularization
    }

    /// Whether the trailing-feature correction is applied.
    #[must_use]
    pub fn use_trailing_estimate(&self) -> bool {
        self.use_trailing_estimate
    }

    /// Clamping domain, if any.
    #[must_use]
    pub fn domain(&self) -> Option<&PreferenceDomain> {
        self.domain.as_ref()
    }

    /// Clamps `value` into the domain, or returns it unchanged.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        self.domain.map_or(value, |d| d.clamp_value(value))
    }

    /// Fresh controller for one feature's training run.
    #[must_use]
    pub fn new_loop(&self) -> Box<dyn TrainingLoopController> {
        self.stopping.new_loop()
    }

    /// Running estimates for `snapshot`, seeded from `baseline`.
    #[must_use]
    pub fn make_estimator<'a>(
        &self,
        snapshot: &'a RatingSnapshot,
        baseline: &dyn BiasModel,
    ) -> TrainingEstimator<'a> {
        TrainingEstimator::new(snapshot.ratings(), baseline, self.domain)
    }

    /// Error of the current prediction against `rating`.
    #[must_use]
    pub fn compute_error(
        &self,
        rating: f64,
        estimate: f64,
        trail: f64,
        user_value: f64,
        item_value: f64,
    ) -> f64 {
        let mut prediction = self.clamp(estimate + user_value * item_value);
        if self.use_trailing_estimate {
            prediction = self.clamp(prediction + trail);
        }
        rating - prediction
    }

    /// Change to apply to the user feature value.
    #[must_use]
    pub fn user_update(&self, error: f64, user_value: f64, item_value: f64) -> f64 {
        self.learning_rate * (error * item_value - self.regularization * user_value)
    }

    /// Change to apply to the item feature value.
    #[must_use]
    pub fn item_update(&self, error: f64, user_value: f64, item_value: f64) -> f64 {
        self.learning_rate * (error * user_value - self.regularization * item_value)
    }
}

/// Squared-error accumulator for one pass over the ratings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorAccumulator {
    sse: f64,
    n: usize,
}

impl ErrorAccumulator {
    /// Empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one error.
    pub fn add(&mut self, error: f64) {
        self.sse += error * error;
        self.n += 1;
    }

    /// Number of errors added.
    #[must_use]
    pub fn count(&self) -> usize {
        self.n
    }

    /// Root mean squared error; 0.0 when nothing was added.
    #[must_use]
    pub fn rmse(&self) -> f64 {
        if self.n == 0 {
            debug!("no data in training pass, reporting RMSE 0");
            return 0.0;
        }
        (self.sse / self.n as f64).sqrt()
    }
}
