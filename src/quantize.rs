//! Quantization of continuous scores onto a discrete value set.

use crate::data::PreferenceDomain;
use crate::error::{MfError, Result};
use serde::{Deserialize, Serialize};

/// Upper bound on the number of representatives derived from a domain.
pub const MAX_DOMAIN_LEVELS: usize = 1 << 20;

/// Maps a value to the nearest member of an ascending set of representatives.
///
/// On an exact midpoint the higher representative is chosen.
///
/// # Examples
///
/// ```
/// use mfkit::quantize::Quantizer;
///
/// let q = Quantizer::new(vec![1.0, 2.0, 3.0]).expect("ascending values");
/// assert_eq!(q.index(2.4), 1);
/// assert_eq!(q.index(2.5), 2);
/// assert_eq!(q.quantize(-7.0), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Quantizer {
    values: Vec<f64>,
}

impl TryFrom<Vec<f64>> for Quantizer {
    type Error = MfError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::new(values)
    }
}

impl From<Quantizer> for Vec<f64> {
    fn from(q: Quantizer) -> Self {
        q.values
    }
}

impl Quantizer {
    /// Creates a quantizer over `values`.
    ///
    /// # Errors
    ///
    /// Returns an error if `values` is empty, contains NaN, or is not
    /// strictly ascending.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(MfError::invalid_hyperparameter(
                "values",
                "[]",
                "at least one representative value",
            ));
        }
        if values.iter().any(|v| v.is_nan()) || values.windows(2).any(|w| w[0] >= w[1]) {
            return Err(MfError::invalid_hyperparameter(
                "values",
                format!("{values:?}"),
                "strictly ascending, no NaN",
            ));
        }
        Ok(Self { values })
    }

    /// Quantizer over the discrete values of a preference domain.
    ///
    /// A domain without precision yields its two bounds as representatives
    /// (one value if they coincide).
    ///
    /// # Errors
    ///
    /// Returns an error if the precision would produce more than
    /// [`MAX_DOMAIN_LEVELS`] values, and propagates [`Quantizer::new`]
    /// validation failures.
    pub fn from_domain(domain: &PreferenceDomain) -> Result<Self> {
        let (min, max) = (domain.min(), domain.max());
        let values = match domain.precision() {
            Some(step) => {
                let steps = ((max - min) / step + 1e-9).floor();
                if !(steps.is_finite() && steps < MAX_DOMAIN_LEVELS as f64) {
                    return Err(MfError::invalid_hyperparameter(
                        "precision",
                        step,
                        &format!("at most {MAX_DOMAIN_LEVELS} levels over [{min},{max}]"),
                    ));
                }
                let n = steps as usize;
                (0..=n).map(|i| min + step * i as f64).collect()
            }
            None if min < max => vec![min, max],
            None => vec![min],
        };
        Self::new(values)
    }

    /// Number of representative values.
    #[must_use]
    pub fn count(&self) -> usize {
        self.values.len()
    }

    /// Representative values, ascending.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Index of the representative closest to `value`.
    ///
    /// NaN maps to index 0.
    #[must_use]
    pub fn index(&self, value: f64) -> usize {
        let above = self.values.partition_point(|&v| v < value);
        if above == 0 {
            return 0;
        }
        if above == self.values.len() {
            return above - 1;
        }
        let lower = value - self.values[above - 1];
        let upper = self.values[above] - value;
        if upper <= lower {
            above
        } else {
            above - 1
        }
    }

    /// Representative value at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`MfError::IndexOutOfBounds`] if `index >= count()`.
    pub fn value(&self, index: usize) -> Result<f64> {
        self.values
            .get(index)
            .copied()
            .ok_or_else(|| MfError::index_out_of_bounds(index, self.values.len()))
    }

    /// Closest representative value to `value`.
    #[must_use]
    pub fn quantize(&self, value: f64) -> f64 {
        self.values[self.index(value)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_and_unsorted() {
        assert!(Quantizer::new(vec![]).is_err());
        assert!(Quantizer::new(vec![2.0, 1.0]).is_err());
        assert!(Quantizer::new(vec![1.0, 1.0]).is_err());
        assert!(Quantizer::new(vec![f64::NAN]).is_err());
    }

    #[test]
    fn test_midpoint_rounds_up() {
        let q = Quantizer::new(vec![0.0, 1.0, 2.0]).unwrap();
        assert_eq!(q.index(0.5), 1);
        assert_eq!(q.index(1.5), 2);
        assert_eq!(q.index(0.49), 0);
    }

    #[test]
    fn test_outside_range_clamps_to_ends() {
        let q = Quantizer::new(vec![1.0, 5.0]).unwrap();
        assert_eq!(q.index(-100.0), 0);
        assert_eq!(q.index(100.0), 1);
    }

    #[test]
    fn test_exact_hit() {
        let q = Quantizer::new(vec![1.0, 2.0, 3.0]).unwrap();
        for (i, v) in [1.0, 2.0, 3.0].into_iter().enumerate() {
            assert_eq!(q.index(v), i);
        }
    }

    #[test]
    fn test_single_value() {
        let q = Quantizer::new(vec![4.0]).unwrap();
        assert_eq!(q.index(-1.0), 0);
        assert_eq!(q.quantize(10.0), 4.0);
    }

    #[test]
    fn test_from_domain_with_precision() {
        let d = PreferenceDomain::with_precision(1.0, 5.0, 0.5).unwrap();
        let q = Quantizer::from_domain(&d).unwrap();
        assert_eq!(q.count(), 9);
        assert_eq!(q.value(8).unwrap(), 5.0);
        assert_eq!(q.quantize(3.3), 3.5);
        assert_eq!(q.quantize(3.2), 3.0);
    }

    #[test]
    fn test_from_domain_without_precision() {
        let d = PreferenceDomain::new(0.0, 1.0).unwrap();
        let q = Quantizer::from_domain(&d).unwrap();
        assert_eq!(q.values(), &[0.0, 1.0]);
    }

    #[test]
    fn test_value_out_of_range() {
        let q = Quantizer::new(vec![1.0]).unwrap();
        assert!(matches!(
            q.value(1),
            Err(MfError::IndexOutOfBounds { index: 1, len: 1 })
        ));
    }

    #[test]
    fn test_nan_maps_to_first() {
        let q = Quantizer::new(vec![1.0, 2.0]).unwrap();
        assert_eq!(q.index(f64::NAN), 0);
    }

    #[test]
    fn test_from_domain_rejects_excessive_levels() {
        let d = PreferenceDomain::with_precision(0.0, 1e6, 1e-9).unwrap();
        assert!(matches!(
            Quantizer::from_domain(&d),
            Err(MfError::InvalidHyperparameter { .. })
        ));
    }

    #[test]
    fn test_from_domain_zero_precision_json_rejected_before_quantizing() {
        let parsed =
            serde_json::from_str::<PreferenceDomain>(r#"{"min":1.0,"max":5.0,"precision":0.0}"#);
        assert!(parsed.is_err());
    }
}
