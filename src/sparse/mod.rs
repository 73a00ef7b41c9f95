//! Sparse numeric vectors keyed by entity id.
//!
//! Rating rows, bias lookups, and scoring results are all partial maps from
//! ids to values. Reading goes through [`SparseRead`], which both the
//! immutable [`SparseVector`] and the [`MutableSparseVector`] implement.
//!
//! # Quick Start
//!
//! ```
//! use mfkit::sparse::{MutableSparseVector, SparseRead};
//!
//! let mut ratings = MutableSparseVector::new();
//! ratings.set(10, 4.0);
//! ratings.set(20, 3.0);
//! ratings.unset(10);
//!
//! let ratings = ratings.freeze();
//! assert_eq!(ratings.len(), 1);
//! assert_eq!(ratings.norm(), 3.0);
//! ```

mod vector;

pub use vector::{MutableSparseVector, SparseRead, SparseVector};
