//! mfkit: FunkSVD matrix factorization for recommender systems in pure Rust.
//!
//! mfkit learns latent user and item feature vectors from sparse rating
//! data with per-feature stochastic gradient descent, and scores items from
//! the trained factors.
//!
//! # Quick Start
//!
//! ```
//! use mfkit::prelude::*;
//! use std::sync::Arc;
//!
//! let snapshot = RatingSnapshot::from_ratings([
//!     (1_i64, 10_i64, 5.0),
//!     (1, 20, 3.0),
//!     (2, 10, 4.0),
//!     (2, 20, 2.0),
//! ]);
//! let baseline = Arc::new(BiasTerms::zero());
//!
//! let model = FunkSvdConfig::default()
//!     .with_feature_count(1)
//!     .with_learning_rate(0.05)
//!     .with_stopping(StopPolicy::Iterations { count: 50 })
//!     .trainer()
//!     .expect("valid config")
//!     .train(&snapshot, baseline.as_ref())
//!     .expect("training succeeds");
//!
//! let scorer = FunkSvdScorer::new(Arc::new(model), baseline);
//! let scores = scorer.score(1, &[10, 20]);
//! assert!((scores.get(10) - 5.0).abs() < 0.5);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Dense Vector and Matrix types
//! - [`sparse`]: Sparse vectors keyed by entity id
//! - [`index`]: Id-to-index mappings and symbol interning
//! - [`data`]: Ratings, rating snapshots, preference domains
//! - [`baseline`]: Bias model interface
//! - [`stopping`]: Stopping conditions and cancellation
//! - [`mf`]: FunkSVD training, models, and scoring
//! - [`quantize`]: Quantization onto discrete rating values
//! - [`traits`]: Scoring traits

pub mod baseline;
pub mod data;
pub mod error;
pub mod index;
pub mod mf;
pub mod prelude;
pub mod primitives;
pub mod quantize;
pub mod sparse;
pub mod stopping;
pub mod traits;

pub use error::{MfError, Result};
pub use primitives::{Matrix, Vector};
pub use traits::ItemScorer;
