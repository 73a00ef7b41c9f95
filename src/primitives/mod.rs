//! Dense compute primitives (Vector, Matrix).
//!
//! Factor matrices are stored row-major; training mutates a [`Matrix`] and
//! the finished model holds [`ImmutableMatrix`] snapshots.

mod matrix;
mod vector;

pub use matrix::{address, ColumnMut, ImmutableMatrix, Matrix, MatrixRead};
pub(crate) use vector::dot;
pub use vector::Vector;
