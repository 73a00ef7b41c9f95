//! Serializable FunkSVD hyperparameters.

use super::trainer::FunkSvdTrainer;
use super::update::FunkSvdUpdateRule;
use crate::data::PreferenceDomain;
use crate::error::{MfError, Result};
use crate::stopping::StopPolicy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How feature columns are initialized before training.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeatureInit {
    /// Every entry set to the initial value.
    #[default]
    Constant,
    /// Initial value plus uniform noise in `[-scale, scale]`.
    Random {
        /// RNG seed; `None` seeds from entropy
        seed: Option<u64>,
        /// Half-width of the noise interval
        scale: f64,
    },
}

/// FunkSVD training configuration.
///
/// # Examples
///
/// ```
/// use mfkit::mf::FunkSvdConfig;
/// use mfkit::stopping::StopPolicy;
///
/// let config = FunkSvdConfig::default()
///     .with_feature_count(10)
///     .with_learning_rate(0.005)
///     .with_stopping(StopPolicy::Iterations { count: 40 });
/// assert!(config.validate().is_ok());
///
/// let json = config.to_json().expect("serializable");
/// let back = FunkSvdConfig::from_json(&json).expect("valid json");
/// assert_eq!(back, config);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunkSvdConfig {
    /// Number of latent features
    pub feature_count: usize,
    /// SGD learning rate
    pub learning_rate: f64,
    /// Regularization factor
    pub regularization: f64,
    /// Starting value of every feature entry
    pub initial_value: f64,
    /// Add the untrained features' contribution to each prediction
    pub use_trailing_estimate: bool,
    /// When each feature stops training
    pub stopping: StopPolicy,
    /// Optional clamping range for predictions
    pub domain: Option<PreferenceDomain>,
    /// Column initialization
    pub init: FeatureInit,
}

impl Default for FunkSvdConfig {
    fn default() -> Self {
        Self {
            feature_count: 25,
            learning_rate: 0.001,
            regularization: 0.015,
            initial_value: 0.1,
            use_trailing_estimate: true,
            stopping: StopPolicy::default(),
            domain: None,
            init: FeatureInit::Constant,
        }
    }
}

impl FunkSvdConfig {
    /// Sets the feature count.
    #[must_use]
    pub fn with_feature_count(mut self, feature_count: usize) -> Self {
        self.feature_count = feature_count;
        self
    }

    /// Sets the learning rate.
    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Sets the regularization factor.
    #[must_use]
    pub fn with_regularization(mut self, regularization: f64) -> Self {
        self.regularization = regularization;
        self
    }

    /// Sets the initial feature value.
    #[must_use]
    pub fn with_initial_value(mut self, initial_value: f64) -> Self {
        self.initial_value = initial_value;
        self
    }

    /// Enables or disables the trailing estimate.
    #[must_use]
    pub fn with_trailing_estimate(mut self, enabled: bool) -> Self {
        self.use_trailing_estimate = enabled;
        self
    }

    /// Sets the stopping policy.
    #[must_use]
    pub fn with_stopping(mut self, stopping: StopPolicy) -> Self {
        self.stopping = stopping;
        self
    }

    /// Sets the clamping domain.
    #[must_use]
    pub fn with_domain(mut self, domain: PreferenceDomain) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Sets the column initialization.
    #[must_use]
    pub fn with_init(mut self, init: FeatureInit) -> Self {
        self.init = init;
        self
    }

    /// Checks every hyperparameter.
    ///
    /// # Errors
    ///
    /// Returns [`MfError::InvalidHyperparameter`] for a zero feature count,
    /// a non-positive learning rate, negative regularization, a non-finite
    /// initial value, a bad random scale, or an invalid stopping policy.
    pub fn validate(&self) -> Result<()> {
        if self.feature_count == 0 {
            return Err(MfError::invalid_hyperparameter("feature_count", 0, ">= 1"));
        }
        if !self.initial_value.is_finite() {
            return Err(MfError::invalid_hyperparameter(
                "initial_value",
                self.initial_value,
                "finite",
            ));
        }
        if let FeatureInit::Random { scale, .. } = self.init {
            if !(scale >= 0.0 && scale.is_finite()) {
                return Err(MfError::invalid_hyperparameter("init.scale", scale, ">= 0"));
            }
        }
        self.stopping.validate()?;
        self.update_rule().map(|_| ())
    }

    /// Update rule described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid learning rate or regularization.
    pub fn update_rule(&self) -> Result<FunkSvdUpdateRule> {
        let mut rule = FunkSvdUpdateRule::with_shared_stopping(
            self.learning_rate,
            self.regularization,
            Arc::new(self.stopping),
        )?
        .with_trailing_estimate(self.use_trailing_estimate);
        if let Some(domain) = self.domain {
            rule = rule.with_domain(domain);
        }
        Ok(rule)
    }

    /// Validates the configuration and builds a trainer from it.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn trainer(&self) -> Result<FunkSvdTrainer> {
        self.validate()?;
        Ok(FunkSvdTrainer::new(self.feature_count, self.update_rule()?)?
            .with_initial_value(self.initial_value)
            .with_init(self.init))
    }

    /// Parses a configuration from JSON; missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`MfError::Serialization`] for malformed JSON or a validation
    /// error for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`MfError::Serialization`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = FunkSvdConfig::default();
        assert_eq!(c.feature_count, 25);
        assert_eq!(c.learning_rate, 0.001);
        assert_eq!(c.regularization, 0.015);
        assert_eq!(c.initial_value, 0.1);
        assert!(c.use_trailing_estimate);
        assert_eq!(c.stopping, StopPolicy::Iterations { count: 100 });
        assert!(c.domain.is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let c = FunkSvdConfig::from_json(r#"{"feature_count": 3, "learning_rate": 0.01}"#)
            .expect("valid");
        assert_eq!(c.feature_count, 3);
        assert_eq!(c.learning_rate, 0.01);
        assert_eq!(c.regularization, 0.015);
    }

    #[test]
    fn test_json_with_domain_and_policy() {
        let json = r#"{
            "domain": {"min": 1.0, "max": 5.0, "precision": 0.5},
            "stopping": {"type": "threshold", "threshold": 0.001, "min_iterations": 5},
            "init": {"type": "random", "seed": 7, "scale": 0.01}
        }"#;
        let c = FunkSvdConfig::from_json(json).expect("valid");
        assert_eq!(c.domain.map(|d| d.max()), Some(5.0));
        assert_eq!(
            c.init,
            FeatureInit::Random {
                seed: Some(7),
                scale: 0.01
            }
        );
    }

    #[test]
    fn test_validate_rejects() {
        let base = FunkSvdConfig::default();
        assert!(base.clone().with_feature_count(0).validate().is_err());
        assert!(base.clone().with_learning_rate(0.0).validate().is_err());
        assert!(base.clone().with_regularization(-1.0).validate().is_err());
        assert!(base
            .clone()
            .with_stopping(StopPolicy::Threshold {
                threshold: 0.0,
                min_iterations: 1
            })
            .validate()
            .is_err());
        assert!(base
            .with_init(FeatureInit::Random {
                seed: None,
                scale: -1.0
            })
            .validate()
            .is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            FunkSvdConfig::from_json("{not json"),
            Err(MfError::Serialization(_))
        ));
        assert!(matches!(
            FunkSvdConfig::from_json(r#"{"feature_count": 0}"#),
            Err(MfError::InvalidHyperparameter { .. })
        ));
    }

    #[test]
    fn test_json_rejects_invalid_domain() {
        for bad in [
            r#"{"domain":{"min":5.0,"max":1.0,"precision":0.0}}"#,
            r#"{"domain":{"min":5.0,"max":1.0}}"#,
            r#"{"domain":{"min":1.0,"max":5.0,"precision":-1.0}}"#,
        ] {
            assert!(FunkSvdConfig::from_json(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_update_rule_carries_settings() {
        let domain = PreferenceDomain::new(0.0, 1.0).expect("valid");
        let rule = FunkSvdConfig::default()
            .with_trailing_estimate(false)
            .with_domain(domain)
            .update_rule()
            .expect("valid");
        assert!(!rule.use_trailing_estimate());
        assert_eq!(rule.domain(), Some(&domain));
        assert_eq!(rule.learning_rate(), 0.001);
    }
}
