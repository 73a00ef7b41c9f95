//! Dense row-major matrices for factor storage.
//!
//! [`Matrix`] is the mutable form used while training: row and column views
//! borrow the backing store, so writes through a view are writes to the
//! matrix. [`Matrix::freeze`] moves that store into an [`ImmutableMatrix`],
//! whose accessors hand out copies. Both implement [`MatrixRead`].

use super::Vector;
use crate::error::{MfError, Result};
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Row-major address of `(row, col)` in a matrix with `cols` columns.
#[inline]
#[must_use]
pub fn address(row: usize, col: usize, cols: usize) -> usize {
    row * cols + col
}

/// Read-only access shared by mutable and immutable matrices.
pub trait MatrixRead {
    /// Number of rows.
    fn n_rows(&self) -> usize;

    /// Number of columns.
    fn n_cols(&self) -> usize;

    /// Backing store in row-major order.
    fn as_slice(&self) -> &[f64];

    /// Returns the shape as (rows, cols).
    fn shape(&self) -> (usize, usize) {
        (self.n_rows(), self.n_cols())
    }

    /// Gets element at (row, col).
    ///
    /// # Errors
    ///
    /// Returns [`MfError::IndexOutOfBounds`] if either index is out of range.
    fn get(&self, row: usize, col: usize) -> Result<f64> {
        check_bounds(row, col, self.n_rows(), self.n_cols())?;
        Ok(self.as_slice()[address(row, col, self.n_cols())])
    }

    /// Borrows a row as a slice.
    ///
    /// # Errors
    ///
    /// Returns [`MfError::IndexOutOfBounds`] if `row` is out of range.
    fn row_slice(&self, row: usize) -> Result<&[f64]> {
        if row >= self.n_rows() {
            return Err(MfError::index_out_of_bounds(row, self.n_rows()));
        }
        let start = row * self.n_cols();
        Ok(&self.as_slice()[start..start + self.n_cols()])
    }

    /// Copies a column out into a fresh vector.
    ///
    /// # Errors
    ///
    /// Returns [`MfError::IndexOutOfBounds`] if `col` is out of range.
    fn column_copy(&self, col: usize) -> Result<Vector> {
        if col >= self.n_cols() {
            return Err(MfError::index_out_of_bounds(col, self.n_cols()));
        }
        let cols = self.n_cols();
        let data = self.as_slice();
        Ok(Vector::from_vec(
            (0..self.n_rows())
                .map(|r| data[address(r, col, cols)])
                .collect(),
        ))
    }
}

fn check_bounds(row: usize, col: usize, rows: usize, cols: usize) -> Result<()> {
    if row >= rows {
        return Err(MfError::index_out_of_bounds(row, rows));
    }
    if col >= cols {
        return Err(MfError::index_out_of_bounds(col, cols));
    }
    Ok(())
}

/// A mutable 2D matrix of `f64` values (row-major storage).
///
/// # Examples
///
/// ```
/// use mfkit::primitives::{Matrix, MatrixRead};
///
/// let mut m = Matrix::zeros(2, 3);
/// m.set(1, 2, 4.0).expect("in bounds");
/// assert_eq!(m.get(1, 2).expect("in bounds"), 4.0);
/// assert_eq!(m.shape(), (2, 3));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    /// Creates a new matrix from a vector of data.
    ///
    /// # Errors
    ///
    /// Returns an error if data length doesn't match rows * cols.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(MfError::DimensionMismatch {
                expected: format!("{rows}x{cols}={} elements", rows * cols),
                actual: format!("{} elements", data.len()),
            });
        }
        Ok(Self { data, rows, cols })
    }

    /// Creates a matrix of zeros.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    /// Creates a matrix with every element set to `value`.
    #[must_use]
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            data: vec![value; rows * cols],
            rows,
            cols,
        }
    }

    /// Sets element at (row, col).
    ///
    /// # Errors
    ///
    /// Returns [`MfError::IndexOutOfBounds`] if either index is out of range.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        check_bounds(row, col, self.rows, self.cols)?;
        self.data[address(row, col, self.cols)] = value;
        Ok(())
    }

    /// Mutable view of a row; writes alias the matrix.
    ///
    /// # Errors
    ///
    /// Returns [`MfError::IndexOutOfBounds`] if `row` is out of range.
    pub fn row_mut(&mut self, row: usize) -> Result<&mut [f64]> {
        if row >= self.rows {
            return Err(MfError::index_out_of_bounds(row, self.rows));
        }
        let start = row * self.cols;
        Ok(&mut self.data[start..start + self.cols])
    }

    /// Strided view of a column; writes alias the matrix.
    ///
    /// # Errors
    ///
    /// Returns [`MfError::IndexOutOfBounds`] if `col` is out of range.
    pub fn column_mut(&mut self, col: usize) -> Result<ColumnMut<'_>> {
        if col >= self.cols {
            return Err(MfError::index_out_of_bounds(col, self.cols));
        }
        Ok(ColumnMut {
            data: &mut self.data,
            rows: self.rows,
            cols: self.cols,
            col,
        })
    }

    /// Copies a row out into a fresh vector that does not alias the matrix.
    ///
    /// For aliasing views use [`MatrixRead::row_slice`] or
    /// [`Matrix::row_mut`].
    ///
    /// # Errors
    ///
    /// Returns [`MfError::IndexOutOfBounds`] if `row` is out of range.
    pub fn row_copy(&self, row: usize) -> Result<Vector> {
        self.row_slice(row).map(Vector::from_slice)
    }

    /// Converts into an immutable matrix, reusing the backing store.
    #[must_use]
    pub fn freeze(self) -> ImmutableMatrix {
        ImmutableMatrix {
            data: self.data,
            rows: self.rows,
            cols: self.cols,
        }
    }
}

impl MatrixRead for Matrix {
    fn n_rows(&self) -> usize {
        self.rows
    }

    fn n_cols(&self) -> usize {
        self.cols
    }

    fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// Mutable strided view over one column of a [`Matrix`].
///
/// Indexing is by row and panics out of range, like slice indexing.
#[derive(Debug)]
pub struct ColumnMut<'a> {
    data: &'a mut [f64],
    rows: usize,
    cols: usize,
    col: usize,
}

impl ColumnMut<'_> {
    /// Number of rows in the column.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Returns true if the column has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Sets every entry of the column.
    pub fn fill(&mut self, value: f64) {
        for r in 0..self.rows {
            self.data[address(r, self.col, self.cols)] = value;
        }
    }

    /// Iterates over the column values.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.rows).map(move |r| self.data[address(r, self.col, self.cols)])
    }

    /// Copies the column into a dense vector.
    #[must_use]
    pub fn to_vector(&self) -> Vector {
        Vector::from_vec(self.iter().collect())
    }
}

impl Index<usize> for ColumnMut<'_> {
    type Output = f64;

    fn index(&self, row: usize) -> &f64 {
        assert!(row < self.rows, "row {row} out of bounds (len={})", self.rows);
        &self.data[address(row, self.col, self.cols)]
    }
}

impl IndexMut<usize> for ColumnMut<'_> {
    fn index_mut(&mut self, row: usize) -> &mut f64 {
        assert!(row < self.rows, "row {row} out of bounds (len={})", self.rows);
        &mut self.data[address(row, self.col, self.cols)]
    }
}

/// A frozen 2D matrix; accessors return copies or shared borrows.
///
/// Safe for concurrent read-only use once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix", into = "RawMatrix")]
pub struct ImmutableMatrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl ImmutableMatrix {
    /// Creates an immutable matrix from row-major data.
    ///
    /// # Errors
    ///
    /// Returns an error if data length doesn't match rows * cols.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        Matrix::from_vec(rows, cols, data).map(Matrix::freeze)
    }

    /// Copies a row out into a fresh vector.
    ///
    /// # Errors
    ///
    /// Returns [`MfError::IndexOutOfBounds`] if `row` is out of range.
    pub fn row(&self, row: usize) -> Result<Vector> {
        self.row_slice(row).map(Vector::from_slice)
    }

    /// Copies a column out into a fresh vector.
    ///
    /// # Errors
    ///
    /// Returns [`MfError::IndexOutOfBounds`] if `col` is out of range.
    pub fn column(&self, col: usize) -> Result<Vector> {
        self.column_copy(col)
    }

    /// Makes a mutable copy of this matrix.
    #[must_use]
    pub fn to_mutable(&self) -> Matrix {
        Matrix {
            data: self.data.clone(),
            rows: self.rows,
            cols: self.cols,
        }
    }
}

impl MatrixRead for ImmutableMatrix {
    fn n_rows(&self) -> usize {
        self.rows
    }

    fn n_cols(&self) -> usize {
        self.cols
    }

    fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

#[derive(Serialize, Deserialize)]
struct RawMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl TryFrom<RawMatrix> for ImmutableMatrix {
    type Error = MfError;

    fn try_from(raw: RawMatrix) -> Result<Self> {
        Self::from_vec(raw.rows, raw.cols, raw.data)
    }
}

impl From<ImmutableMatrix> for RawMatrix {
    fn from(m: ImmutableMatrix) -> Self {
        Self {
            rows: m.rows,
            cols: m.cols,
            data: m.data,
        }
    }
}

#[cfg(test)]
#[path = "matrix_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests_matrix_contract.rs"]
mod tests_matrix_contract;
