//! Matrix factorization: FunkSVD training and scoring.
//!
//! FunkSVD learns one latent feature at a time with stochastic gradient
//! descent. Each feature is trained against the residual left by the bias
//! model and the features before it, until the stopping condition carried by
//! the [`FunkSvdUpdateRule`] says stop.
//!
//! # Quick Start
//!
//! ```
//! use mfkit::baseline::BiasTerms;
//! use mfkit::data::RatingSnapshot;
//! use mfkit::mf::{FunkSvdConfig, FunkSvdScorer};
//! use mfkit::stopping::StopPolicy;
//! use mfkit::traits::ItemScorer;
//! use std::sync::Arc;
//!
//! let snapshot = RatingSnapshot::from_ratings([
//!     (1_i64, 10_i64, 5.0),
//!     (1, 20, 3.0),
//!     (2, 10, 4.0),
//!     (2, 20, 2.0),
//! ]);
//! let baseline = Arc::new(BiasTerms::new(3.5));
//!
//! let config = FunkSvdConfig::default()
//!     .with_feature_count(1)
//!     .with_learning_rate(0.05)
//!     .with_stopping(StopPolicy::Iterations { count: 50 });
//! let model = config
//!     .trainer()
//!     .expect("valid config")
//!     .train(&snapshot, baseline.as_ref())
//!     .expect("trained");
//!
//! let scorer = FunkSvdScorer::new(Arc::new(model), baseline);
//! let best = scorer.recommend(1, &[10, 20], 1);
//! assert_eq!(best[0].0, 10);
//! ```

mod config;
mod estimator;
mod feature_info;
mod funksvd;
mod model;
mod scorer;
mod trainer;
mod update;

pub use config::{FeatureInit, FunkSvdConfig};
pub use estimator::TrainingEstimator;
pub use feature_info::{FeatureInfo, FeatureInfoBuilder};
pub use funksvd::FunkSvdModel;
pub use model::MfModel;
pub use scorer::FunkSvdScorer;
pub use trainer::FunkSvdTrainer;
pub use update::{ErrorAccumulator, FunkSvdUpdateRule};
