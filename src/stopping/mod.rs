//! Stopping conditions for iterative training.
//!
//! A [`StoppingCondition`] is a factory: every independent training run
//! (one per latent feature in FunkSVD) asks it for a fresh
//! [`TrainingLoopController`], then calls
//! [`keep_training`](TrainingLoopController::keep_training) once per
//! iteration with that iteration's error. Controllers hold per-run state and
//! are never reused across runs.
//!
//! # Policies
//!
//! - [`IterationCountStoppingCondition`] - a fixed number of iterations
//! - [`ThresholdStoppingCondition`] - stop once the error change is small
//! - [`ErrorThresholdStoppingCondition`] - minimum-iteration gate with
//!   good-iteration bookkeeping
//! - [`StopPolicy`] - serializable form of the three above
//!
//! # Example
//!
//! ```
//! use mfkit::stopping::{IterationCountStoppingCondition, StoppingCondition};
//!
//! let stop = IterationCountStoppingCondition::new(3).expect("positive count");
//! let mut controller = stop.new_loop();
//! let mut rounds = 0;
//! while controller.keep_training(1.0) {
//!     rounds += 1;
//! }
//! assert_eq!(rounds, 3);
//! assert_eq!(controller.iteration_count(), 3);
//! ```

mod cancel;

pub use cancel::CancellationToken;

use crate::error::{MfError, Result};
use serde::{Deserialize, Serialize};

/// Per-run loop state deciding whether training continues.
pub trait TrainingLoopController: Send {
    /// Reports the error of the iteration just finished (or a sentinel such
    /// as `f64::MAX` before the first one). Returns `true` to continue.
    fn keep_training(&mut self, error: f64) -> bool;

    /// Number of calls to `keep_training` that returned `true`.
    fn iteration_count(&self) -> usize;

    /// Difference between the previous and latest reported error.
    fn last_delta(&self) -> f64;
}

/// Factory for fresh [`TrainingLoopController`]s.
pub trait StoppingCondition: Send + Sync {
    /// Starts a new, independent training run.
    fn new_loop(&self) -> Box<dyn TrainingLoopController>;
}

impl<F> StoppingCondition for F
where
    F: Fn() -> Box<dyn TrainingLoopController> + Send + Sync,
{
    fn new_loop(&self) -> Box<dyn TrainingLoopController> {
        self()
    }
}

/// Tracks the previous error and the latest delta.
#[derive(Debug, Clone, Copy)]
struct ErrorTrace {
    previous: f64,
    delta: f64,
}

impl ErrorTrace {
    fn new() -> Self {
        Self {
            previous: f64::INFINITY,
            delta: f64::NAN,
        }
    }

    fn observe(&mut self, error: f64) -> f64 {
        self.delta = self.previous - error;
        self.delta
    }

    fn accept(&mut self, error: f64) {
        self.previous = error;
    }
}

fn check_threshold(threshold: f64) -> Result<()> {
    if threshold > 0.0 && threshold.is_finite() {
        Ok(())
    } else {
        Err(MfError::invalid_hyperparameter("threshold", threshold, "> 0"))
    }
}

/// Train for exactly `iterations` iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationCountStoppingCondition {
    iterations: usize,
}

impl IterationCountStoppingCondition {
    /// Creates the condition.
    ///
    /// # Errors
    ///
    /// Returns an error if `iterations` is zero.
    pub fn new(iterations: usize) -> Result<Self> {
        if iterations == 0 {
            return Err(MfError::invalid_hyperparameter("iterations", 0, ">= 1"));
        }
        Ok(Self { iterations })
    }

    /// Configured iteration count.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

impl StoppingCondition for IterationCountStoppingCondition {
    fn new_loop(&self) -> Box<dyn TrainingLoopController> {
        Box::new(IterationCountController {
            limit: self.iterations,
            iterations: 0,
            trace: ErrorTrace::new(),
        })
    }
}

#[derive(Debug)]
struct IterationCountController {
    limit: usize,
    iterations: usize,
    trace: ErrorTrace,
}

impl TrainingLoopController for IterationCountController {
    fn keep_training(&mut self, error: f64) -> bool {
        self.trace.observe(error);
        self.trace.accept(error);
        if self.iterations < self.limit {
            self.iterations += 1;
            true
        } else {
            false
        }
    }

    fn iteration_count(&self) -> usize {
        self.iterations
    }

    fn last_delta(&self) -> f64 {
        self.trace.delta
    }
}

/// Stop once `|previous - error| < threshold`, after at least
/// `min_iterations` iterations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdStoppingCondition {
    threshold: f64,
    min_iterations: usize,
}

impl ThresholdStoppingCondition {
    /// Creates the condition.
    ///
    /// # Errors
    ///
    /// Returns an error if `threshold` is not positive.
    pub fn new(threshold: f64, min_iterations: usize) -> Result<Self> {
        check_threshold(threshold)?;
        Ok(Self {
            threshold,
            min_iterations,
        })
    }

    /// Delta threshold.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Iterations that always run before the threshold is consulted.
    #[must_use]
    pub fn min_iterations(&self) -> usize {
        self.min_iterations
    }
}

impl StoppingCondition for ThresholdStoppingCondition {
    fn new_loop(&self) -> Box<dyn TrainingLoopController> {
        Box::new(ThresholdController {
            threshold: self.threshold,
            min_iterations: self.min_iterations,
            iterations: 0,
            trace: ErrorTrace::new(),
        })
    }
}

#[derive(Debug)]
struct ThresholdController {
    threshold: f64,
    min_iterations: usize,
    iterations: usize,
    trace: ErrorTrace,
}

impl TrainingLoopController for ThresholdController {
    fn keep_training(&mut self, error: f64) -> bool {
        let delta = self.trace.observe(error);
        if self.iterations >= self.min_iterations && delta.abs() < self.threshold {
            return false;
        }
        self.iterations += 1;
        self.trace.accept(error);
        true
    }

    fn iteration_count(&self) -> usize {
        self.iterations
    }

    fn last_delta(&self) -> f64 {
        self.trace.delta
    }
}

/// Error-threshold condition.
///
/// Counts consecutive iterations with `|error| < threshold`, but stopping is
/// decided only by `iterations >= min_iterations`. The streak is exposed via
/// [`ErrorThresholdStoppingCondition::new_tracked_loop`] for callers that
/// want to act on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorThresholdStoppingCondition {
    threshold: f64,
    min_iterations: usize,
}

impl ErrorThresholdStoppingCondition {
    /// Creates the condition.
    ///
    /// # Errors
    ///
    /// Returns an error if `threshold` is not positive.
    pub fn new(threshold: f64, min_iterations: usize) -> Result<Self> {
        check_threshold(threshold)?;
        Ok(Self {
            threshold,
            min_iterations,
        })
    }

    /// Error threshold.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Iteration count after which training stops.
    #[must_use]
    pub fn min_iterations(&self) -> usize {
        self.min_iterations
    }

    /// Concrete controller, giving access to the good-iteration streak.
    #[must_use]
    pub fn new_tracked_loop(&self) -> ErrorThresholdController {
        ErrorThresholdController {
            threshold: self.threshold,
            min_iterations: self.min_iterations,
            iterations: 0,
            good_iterations: 0,
            trace: ErrorTrace::new(),
        }
    }
}

impl StoppingCondition for ErrorThresholdStoppingCondition {
    fn new_loop(&self) -> Box<dyn TrainingLoopController> {
        Box::new(self.new_tracked_loop())
    }
}

/// Controller produced by [`ErrorThresholdStoppingCondition`].
#[derive(Debug)]
pub struct ErrorThresholdController {
    threshold: f64,
    min_iterations: usize,
    iterations: usize,
    good_iterations: usize,
    trace: ErrorTrace,
}

impl ErrorThresholdController {
    /// Current streak of consecutive iterations under the threshold.
    #[must_use]
    pub fn good_iterations(&self) -> usize {
        self.good_iterations
    }
}

impl TrainingLoopController for ErrorThresholdController {
    fn keep_training(&mut self, error: f64) -> bool {
        self.trace.observe(error);
        if error.abs() < self.threshold {
            self.good_iterations += 1;
        } else {
            self.good_iterations = 0;
        }
        if self.iterations >= self.min_iterations {
            return false;
        }
        self.iterations += 1;
        self.trace.accept(error);
        true
    }

    fn iteration_count(&self) -> usize {
        self.iterations
    }

    fn last_delta(&self) -> f64 {
        self.trace.delta
    }
}

/// Serializable choice of stopping condition, used in configuration.
///
/// ```
/// use mfkit::stopping::StopPolicy;
///
/// let policy: StopPolicy =
///     serde_json::from_str(r#"{"type":"threshold","threshold":0.0001,"min_iterations":10}"#)
///         .expect("valid policy");
/// assert!(policy.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StopPolicy {
    /// Fixed number of iterations
    Iterations {
        /// Iterations per run
        count: usize,
    },
    /// Error-delta threshold
    Threshold {
        /// Delta threshold
        threshold: f64,
        /// Minimum iterations before the threshold applies
        min_iterations: usize,
    },
    /// Absolute-error threshold
    ErrorThreshold {
        /// Error threshold
        threshold: f64,
        /// Iterations after which training stops
        min_iterations: usize,
    },
}

impl Default for StopPolicy {
    fn default() -> Self {
        Self::Iterations { count: 100 }
    }
}

impl StopPolicy {
    /// Checks the policy parameters.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero iteration count or a non-positive
    /// threshold.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Iterations { count } => IterationCountStoppingCondition::new(count).map(|_| ()),
            Self::Threshold {
                threshold,
                min_iterations,
            } => ThresholdStoppingCondition::new(threshold, min_iterations).map(|_| ()),
            Self::ErrorThreshold {
                threshold,
                min_iterations,
            } => ErrorThresholdStoppingCondition::new(threshold, min_iterations).map(|_| ()),
        }
    }
}

impl StoppingCondition for StopPolicy {
    fn new_loop(&self) -> Box<dyn TrainingLoopController> {
        match *self {
            Self::Iterations { count } => {
                IterationCountStoppingCondition { iterations: count }.new_loop()
            }
            Self::Threshold {
                threshold,
                min_iterations,
            } => ThresholdStoppingCondition {
                threshold,
                min_iterations,
            }
            .new_loop(),
            Self::ErrorThreshold {
                threshold,
                min_iterations,
            } => ErrorThresholdStoppingCondition {
                threshold,
                min_iterations,
            }
            .new_loop(),
        }
    }
}
