//! Preference domains: the valid range (and optional precision) of ratings.

use crate::error::{MfError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Range of valid preference values, e.g. `[1.0, 5.0]` in steps of `0.5`.
///
/// # Examples
///
/// ```
/// use mfkit::data::PreferenceDomain;
///
/// let domain: PreferenceDomain = "[1.0,5.0]/0.5".parse().expect("valid domain");
/// assert_eq!(domain.clamp_value(7.2), 5.0);
/// assert_eq!(domain.clamp_value(0.3), 1.0);
/// assert_eq!(domain.precision(), Some(0.5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDomain", into = "RawDomain")]
pub struct PreferenceDomain {
    min: f64,
    max: f64,
    precision: Option<f64>,
}

impl PreferenceDomain {
    /// Creates a domain without a precision.
    ///
    /// # Errors
    ///
    /// Returns an error if `min > max` or either bound is not finite.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(MfError::invalid_hyperparameter(
                "domain",
                format!("[{min},{max}]"),
                "finite bounds with min <= max",
            ));
        }
        Ok(Self {
            min,
            max,
            precision: None,
        })
    }

    /// Creates a domain whose values are multiples of `precision` from `min`.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid bounds or a non-positive precision.
    pub fn with_precision(min: f64, max: f64, precision: f64) -> Result<Self> {
        let mut domain = Self::new(min, max)?;
        if !(precision > 0.0 && precision.is_finite()) {
            return Err(MfError::invalid_hyperparameter(
                "precision",
                precision,
                "> 0",
            ));
        }
        domain.precision = Some(precision);
        Ok(domain)
    }

    /// Lower bound.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Step between valid values, if the domain is discrete.
    #[must_use]
    pub fn precision(&self) -> Option<f64> {
        self.precision
    }

    /// Clamps `value` into `[min, max]`. NaN passes through unchanged.
    #[must_use]
    pub fn clamp_value(&self, value: f64) -> f64 {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawDomain {
    min: f64,
    max: f64,
    #[serde(default)]
    precision: Option<f64>,
}

impl TryFrom<RawDomain> for PreferenceDomain {
    type Error = MfError;

    fn try_from(raw: RawDomain) -> Result<Self> {
        match raw.precision {
            Some(p) => Self::with_precision(raw.min, raw.max, p),
            None => Self::new(raw.min, raw.max),
        }
    }
}

impl From<PreferenceDomain> for RawDomain {
    fn from(d: PreferenceDomain) -> Self {
        Self {
            min: d.min,
            max: d.max,
            precision: d.precision,
        }
    }
}

impl fmt::Display for PreferenceDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?},{:?}]", self.min, self.max)?;
        if let Some(p) = self.precision {
            write!(f, "/{p:?}")?;
        }
        Ok(())
    }
}

impl FromStr for PreferenceDomain {
    type Err = MfError;

    /// Parses `"[min,max]"` or `"[min,max]/precision"`, whitespace allowed.
    fn from_str(text: &str) -> Result<Self> {
        let fail = |reason: &str| MfError::Parse {
            input: text.to_string(),
            reason: reason.to_string(),
        };
        let number = |part: &str| -> Result<f64> {
            part.trim()
                .parse::<f64>()
                .map_err(|e| fail(&format!("bad number {:?}: {e}", part.trim())))
        };

        let trimmed = text.trim();
        let body = trimmed
            .strip_prefix('[')
            .ok_or_else(|| fail("expected '['"))?;
        let (range, rest) = body.split_once(']').ok_or_else(|| fail("expected ']'"))?;
        let (lo, hi) = range.split_once(',').ok_or_else(|| fail("expected ','"))?;
        let (min, max) = (number(lo)?, number(hi)?);

        let rest = rest.trim();
        if rest.is_empty() {
            Self::new(min, max)
        } else {
            let prec = rest
                .strip_prefix('/')
                .ok_or_else(|| fail("expected '/' before precision"))?;
            Self::with_precision(min, max, number(prec)?)
        }
    }
}
