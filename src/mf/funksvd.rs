//! The trained FunkSVD model and its persistence.

use super::feature_info::FeatureInfo;
use super::model::MfModel;
use crate::data::PreferenceDomain;
use crate::error::{MfError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Factor model plus per-feature training summaries and the clamping domain
/// used while training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFunkSvdModel", into = "RawFunkSvdModel")]
pub struct FunkSvdModel {
    mf: MfModel,
    features: Vec<FeatureInfo>,
    domain: Option<PreferenceDomain>,
}

impl FunkSvdModel {
    /// Creates a model.
    ///
    /// # Errors
    ///
    /// Returns [`MfError::DimensionMismatch`] unless there is exactly one
    /// summary per feature.
    pub fn new(
        mf: MfModel,
        features: Vec<FeatureInfo>,
        domain: Option<PreferenceDomain>,
    ) -> Result<Self> {
        if features.len() != mf.feature_count() {
            return Err(MfError::dimension_mismatch(
                "feature summaries",
                mf.feature_count(),
                features.len(),
            ));
        }
        Ok(Self {
            mf,
            features,
            domain,
        })
    }

    /// Underlying factor model.
    #[must_use]
    pub fn mf(&self) -> &MfModel {
        &self.mf
    }

    /// Number of latent features.
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.mf.feature_count()
    }

    /// Training summaries, one per feature.
    #[must_use]
    pub fn features(&self) -> &[FeatureInfo] {
        &self.features
    }

    /// Summary for `feature`.
    #[must_use]
    pub fn feature_info(&self, feature: usize) -> Option<&FeatureInfo> {
        self.features.get(feature)
    }

    /// Clamping domain used in training.
    #[must_use]
    pub fn domain(&self) -> Option<&PreferenceDomain> {
        self.domain.as_ref()
    }

    /// Clamps `value` into the domain, if there is one.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        self.domain.map_or(value, |d| d.clamp_value(value))
    }

    /// Mean user value of each feature; the starting point for folding in
    /// users the model has never seen.
    #[must_use]
    pub fn user_averages(&self) -> Vec<f64> {
        self.features.iter().map(FeatureInfo::user_average).collect()
    }

    /// Saves the model to a binary file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the file write fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Loads a model from a binary file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a serialized
    /// model, or describes a model with inconsistent dimensions.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path)?;
        bincode::deserialize(&bytes).map_err(|e| match *e {
            bincode::ErrorKind::Custom(message) => MfError::FormatError { message },
            other => MfError::Serialization(other.to_string()),
        })
    }
}

#[derive(Serialize, Deserialize)]
struct RawFunkSvdModel {
    mf: MfModel,
    features: Vec<FeatureInfo>,
    domain: Option<PreferenceDomain>,
}

impl TryFrom<RawFunkSvdModel> for FunkSvdModel {
    type Error = MfError;

    fn try_from(raw: RawFunkSvdModel) -> Result<Self> {
        Self::new(raw.mf, raw.features, raw.domain).map_err(|e| MfError::FormatError {
            message: e.to_string(),
        })
    }
}

impl From<FunkSvdModel> for RawFunkSvdModel {
    fn from(m: FunkSvdModel) -> Self {
        Self {
            mf: m.mf,
            features: m.features,
            domain: m.domain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::KeyIndex;
    use crate::primitives::ImmutableMatrix;
    use tempfile::TempDir;

    fn tiny() -> FunkSvdModel {
        let users = ImmutableMatrix::from_vec(1, 1, vec![2.0]).expect("1x1");
        let items = ImmutableMatrix::from_vec(2, 1, vec![0.5, -1.0]).expect("2x1");
        let mf = MfModel::new(users, items, KeyIndex::from_ids([1]), KeyIndex::from_ids([10, 20]))
            .expect("consistent");
        let mut info = FeatureInfo::builder(0);
        info.averages(2.0, -0.25)
            .add_training_round(0.4)
            .controller_state(1, 0.1);
        let domain = PreferenceDomain::new(1.0, 5.0).expect("valid");
        FunkSvdModel::new(mf, vec![info.build()], Some(domain)).expect("one summary")
    }

    #[test]
    fn test_rejects_summary_count_mismatch() {
        let m = tiny();
        let result = FunkSvdModel::new(m.mf().clone(), Vec::new(), None);
        assert!(matches!(result, Err(MfError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("model.bin");
        let model = tiny();
        model.save(&path).expect("save");
        let loaded = FunkSvdModel::load(&path).expect("load");
        assert_eq!(loaded, model);
        assert_eq!(loaded.user_averages(), vec![2.0]);
        assert_eq!(loaded.clamp(9.0), 5.0);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().expect("temp dir");
        let result = FunkSvdModel::load(dir.path().join("absent.bin"));
        assert!(matches!(result, Err(MfError::Io(_))));
    }

    #[test]
    fn test_load_rejects_inconsistent_model() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("bad.bin");
        let model = tiny();
        let mut raw = RawFunkSvdModel::from(model);
        raw.features.clear();
        fs::write(&path, bincode::serialize(&raw).expect("serialize")).expect("write");
        let result = FunkSvdModel::load(&path);
        assert!(matches!(result, Err(MfError::FormatError { .. })));
    }

    #[test]
    fn test_load_rejects_inverted_domain() {
        #[derive(Serialize)]
        struct Unchecked {
            mf: MfModel,
            features: Vec<FeatureInfo>,
            domain: Option<(f64, f64, Option<f64>)>,
        }
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("inverted.bin");
        let model = tiny();
        let bytes = bincode::serialize(&Unchecked {
            mf: model.mf().clone(),
            features: model.features().to_vec(),
            domain: Some((5.0, 1.0, Some(0.0))),
        })
        .expect("serialize");
        fs::write(&path, bytes).expect("write");
        let result = FunkSvdModel::load(&path);
        assert!(matches!(result, Err(MfError::FormatError { .. })));
    }

    #[test]
    fn test_load_garbage() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("junk.bin");
        fs::write(&path, [1_u8, 2, 3]).expect("write");
        assert!(FunkSvdModel::load(&path).is_err());
    }
}
