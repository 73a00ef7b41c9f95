//! Error types for mfkit operations.
//!
//! Configuration problems fail fast; bounds violations are reported rather
//! than clamped. Cold-start lookups are not errors and return `Option`.

use thiserror::Error;

/// Main error type for mfkit operations.
///
/// # Examples
///
/// ```
/// use mfkit::error::MfError;
///
/// let err = MfError::DimensionMismatch {
///     expected: "user rows=10".to_string(),
///     actual: "7".to_string(),
/// };
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Error, Debug)]
pub enum MfError {
    /// Matrix, index, or feature dimensions disagree.
    #[error("Matrix dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Invalid hyperparameter value provided.
    #[error("Invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Row, column, or position outside the valid range.
    #[error("index {index} out of bounds (len={len})")]
    IndexOutOfBounds {
        /// Requested position
        index: usize,
        /// Number of valid positions
        len: usize,
    },

    /// Strict id lookup on a key index that does not contain the id.
    #[error("key {key} is not in the key index")]
    KeyNotFound {
        /// Missing id
        key: i64,
    },

    /// Training was cancelled or ran past its deadline.
    #[error("training cancelled during feature {feature} after {iterations} iterations")]
    Cancelled {
        /// Feature being trained when cancellation was observed
        feature: usize,
        /// Iterations completed on that feature
        iterations: usize,
    },

    /// A rating value that is NaN or infinite.
    #[error("rating ({user}, {item}) has non-finite value {value}")]
    NonFiniteRating {
        /// User id
        user: i64,
        /// Item id
        item: i64,
        /// Offending value
        value: f64,
    },

    /// Textual specification could not be parsed.
    #[error("cannot parse {input:?}: {reason}")]
    Parse {
        /// Offending input
        input: String,
        /// What was wrong with it
        reason: String,
    },

    /// I/O error (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Stored model violates the model invariants.
    #[error("Invalid model format: {message}")]
    FormatError {
        /// Error description
        message: String,
    },
}

impl MfError {
    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create an index out of bounds error
    #[must_use]
    pub fn index_out_of_bounds(index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds { index, len }
    }

    /// Create an invalid hyperparameter error
    #[must_use]
    pub fn invalid_hyperparameter(param: &str, value: impl ToString, constraint: &str) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }
}

impl From<bincode::Error> for MfError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for MfError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, MfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_display() {
        let err = MfError::DimensionMismatch {
            expected: "10x4".to_string(),
            actual: "10x3".to_string(),
        };
        assert!(err.to_string().contains("dimension mismatch"));
        assert!(err.to_string().contains("10x4"));
        assert!(err.to_string().contains("10x3"));
    }

    #[test]
    fn test_invalid_hyperparameter_display() {
        let err = MfError::invalid_hyperparameter("learning_rate", -0.1, ">0");
        let msg = err.to_string();
        assert!(msg.contains("Invalid hyperparameter"));
        assert!(msg.contains("learning_rate"));
        assert!(msg.contains("-0.1"));
        assert!(msg.contains(">0"));
    }

    #[test]
    fn test_index_out_of_bounds_helper() {
        let err = MfError::index_out_of_bounds(10, 5);
        let msg = err.to_string();
        assert!(msg.contains("index 10"));
        assert!(msg.contains("len=5"));
    }

    #[test]
    fn test_dimension_mismatch_helper() {
        let err = MfError::dimension_mismatch("rows", 100, 50);
        let msg = err.to_string();
        assert!(msg.contains("rows=100"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn test_key_not_found_display() {
        let err = MfError::KeyNotFound { key: 42 };
        assert!(err.to_string().contains("key 42"));
    }

    #[test]
    fn test_cancelled_display() {
        let err = MfError::Cancelled {
            feature: 3,
            iterations: 17,
        };
        let msg = err.to_string();
        assert!(msg.contains("feature 3"));
        assert!(msg.contains("17 iterations"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: MfError = io_err.into();
        assert!(matches!(err, MfError::Io(_)));
    }

    #[test]
    fn test_error_source_io() {
        use std::error::Error;
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = MfError::Io(io_err);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_source_other() {
        use std::error::Error;
        let err = MfError::Serialization("bad bytes".to_string());
        assert!(err.source().is_none());
    }
}
