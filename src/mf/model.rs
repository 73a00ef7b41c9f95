//! Trained factor matrices and their key indices.

use crate::error::{MfError, Result};
use crate::index::KeyIndex;
use crate::primitives::{dot, ImmutableMatrix, MatrixRead, Vector};
use serde::{Deserialize, Serialize};

/// Matrix factorization model: `users × features` and `items × features`
/// factor matrices plus the id mappings for their rows.
///
/// Immutable once constructed and safe to share across scoring threads.
///
/// # Examples
///
/// ```
/// use mfkit::index::KeyIndex;
/// use mfkit::mf::MfModel;
/// use mfkit::primitives::ImmutableMatrix;
///
/// let users = ImmutableMatrix::from_vec(1, 2, vec![1.0, 2.0]).expect("1x2");
/// let items = ImmutableMatrix::from_vec(1, 2, vec![0.5, 0.25]).expect("1x2");
/// let model = MfModel::new(
///     users,
///     items,
///     KeyIndex::from_ids([42]),
///     KeyIndex::from_ids([7]),
/// )
/// .expect("consistent shapes");
///
/// assert_eq!(model.feature_count(), 2);
/// assert_eq!(model.predict(42, 7), Some(1.0));
/// assert!(model.user_vector(99).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMfModel", into = "RawMfModel")]
pub struct MfModel {
    user_matrix: ImmutableMatrix,
    item_matrix: ImmutableMatrix,
    user_index: KeyIndex,
    item_index: KeyIndex,
}

impl MfModel {
    /// Creates a model after checking that matrix shapes match the indices.
    ///
    /// # Errors
    ///
    /// Returns [`MfError::DimensionMismatch`] if a matrix row count differs
    /// from its index size, or the two matrices disagree on feature count.
    pub fn new(
        user_matrix: ImmutableMatrix,
        item_matrix: ImmutableMatrix,
        user_index: KeyIndex,
        item_index: KeyIndex,
    ) -> Result<Self> {
        if user_matrix.n_rows() != user_index.len() {
            return Err(MfError::dimension_mismatch(
                "user rows",
                user_index.len(),
                user_matrix.n_rows(),
            ));
        }
        if item_matrix.n_rows() != item_index.len() {
            return Err(MfError::dimension_mismatch(
                "item rows",
                item_index.len(),
                item_matrix.n_rows(),
            ));
        }
        if user_matrix.n_cols() != item_matrix.n_cols() {
            return Err(MfError::dimension_mismatch(
                "feature count",
                user_matrix.n_cols(),
                item_matrix.n_cols(),
            ));
        }
        Ok(Self {
            user_matrix,
            item_matrix,
            user_index,
            item_index,
        })
    }

    /// Number of latent features.
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.user_matrix.n_cols()
    }

    /// Number of users with a factor row.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.user_index.len()
    }

    /// Number of items with a factor row.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.item_index.len()
    }

    /// User id mapping.
    #[must_use]
    pub fn user_index(&self) -> &KeyIndex {
        &self.user_index
    }

    /// Item id mapping.
    #[must_use]
    pub fn item_index(&self) -> &KeyIndex {
        &self.item_index
    }

    /// User factor matrix.
    #[must_use]
    pub fn user_matrix(&self) -> &ImmutableMatrix {
        &self.user_matrix
    }

    /// Item factor matrix.
    #[must_use]
    pub fn item_matrix(&self) -> &ImmutableMatrix {
        &self.item_matrix
    }

    /// Factor row of `user`, or `None` for an unknown user.
    #[must_use]
    pub fn user_vector(&self, user: i64) -> Option<Vector> {
        self.user_slice(user).map(Vector::from_slice)
    }

    /// Factor row of `item`, or `None` for an unknown item.
    #[must_use]
    pub fn item_vector(&self, item: i64) -> Option<Vector> {
        self.item_slice(item).map(Vector::from_slice)
    }

    /// Value of `feature` for `user`; 0.0 for an unknown user.
    ///
    /// # Panics
    ///
    /// Panics if `feature >= feature_count()` for a known user.
    #[must_use]
    pub fn get_user_feature(&self, user: i64, feature: usize) -> f64 {
        self.user_slice(user).map_or(0.0, |row| row[feature])
    }

    /// Value of `feature` for `item`; 0.0 for an unknown item.
    ///
    /// # Panics
    ///
    /// Panics if `feature >= feature_count()` for a known item.
    #[must_use]
    pub fn get_item_feature(&self, item: i64, feature: usize) -> f64 {
        self.item_slice(item).map_or(0.0, |row| row[feature])
    }

    /// Dot product of the user and item factors, if both are known.
    #[must_use]
    pub fn predict(&self, user: i64, item: i64) -> Option<f64> {
        Some(dot(self.user_slice(user)?, self.item_slice(item)?))
    }

    pub(crate) fn user_slice(&self, user: i64) -> Option<&[f64]> {
        let row = self.user_index.try_index_of(user)?;
        self.user_matrix.row_slice(row).ok()
    }

    pub(crate) fn item_slice(&self, item: i64) -> Option<&[f64]> {
        let row = self.item_index.try_index_of(item)?;
        self.item_matrix.row_slice(row).ok()
    }
}

#[derive(Serialize, Deserialize)]
struct RawMfModel {
    user_matrix: ImmutableMatrix,
    item_matrix: ImmutableMatrix,
    user_index: KeyIndex,
    item_index: KeyIndex,
}

impl TryFrom<RawMfModel> for MfModel {
    type Error = MfError;

    fn try_from(raw: RawMfModel) -> Result<Self> {
        Self::new(raw.user_matrix, raw.item_matrix, raw.user_index, raw.item_index).map_err(
            |e| MfError::FormatError {
                message: e.to_string(),
            },
        )
    }
}

impl From<MfModel> for RawMfModel {
    fn from(m: MfModel) -> Self {
        Self {
            user_matrix: m.user_matrix,
            item_matrix: m.item_matrix,
            user_index: m.user_index,
            item_index: m.item_index,
        }
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
