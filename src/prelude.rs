//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use mfkit::prelude::*;
//! ```

pub use crate::baseline::{BiasModel, BiasTerms};
pub use crate::data::{PreferenceDomain, Rating, RatingSnapshot};
pub use crate::error::MfError;
pub use crate::index::{KeyIndex, KeyIndexBuilder};
pub use crate::mf::{FunkSvdConfig, FunkSvdModel, FunkSvdScorer, FunkSvdTrainer, MfModel};
pub use crate::primitives::{ImmutableMatrix, Matrix, MatrixRead, Vector};
pub use crate::sparse::{MutableSparseVector, SparseRead, SparseVector};
pub use crate::stopping::{StopPolicy, StoppingCondition, TrainingLoopController};
pub use crate::traits::ItemScorer;
