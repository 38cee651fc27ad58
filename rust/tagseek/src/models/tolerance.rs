use serde::{
    Deserialize,
    Serialize,
};

use crate::errors::ConfigError;

/// Mass tolerance used to match peak mass gaps against residue masses.
///
/// Example:
/// ```
/// use tagseek::MassTolerance;
///
/// let tolerance = MassTolerance::default();
/// assert!((tolerance.tolerance_at(1000.0) - 0.01).abs() < 1e-12);
/// ```
///
/// Convention:
/// Like the rest of the crate, the tolerance is defined as a positive value
/// applied on both sides. A tolerance of 0.01 Da around 100.0 means the
/// range (99.99, 100.01).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum MassTolerance {
    #[serde(rename = "da")]
    Absolute(f64),
    #[serde(rename = "ppm")]
    Ppm(f64),
}

impl Default for MassTolerance {
    fn default() -> Self {
        MassTolerance::Ppm(10.0)
    }
}

impl MassTolerance {
    /// Absolute tolerance (in daltons) at a given mass.
    ///
    /// # Example
    ///
    /// ```
    /// use tagseek::MassTolerance;
    ///
    /// let tol = MassTolerance::Ppm(20.0);
    /// // For 500 Da at 20 ppm: 0.01 Da
    /// assert!((tol.tolerance_at(500.0) - 0.01).abs() < 1e-12);
    ///
    /// let tol = MassTolerance::Absolute(0.02);
    /// assert_eq!(tol.tolerance_at(500.0), 0.02);
    /// ```
    pub fn tolerance_at(&self, mass: f64) -> f64 {
        match self {
            MassTolerance::Absolute(x) => *x,
            MassTolerance::Ppm(x) => mass.abs() * x / 1e6,
        }
    }

    /// Whether `observed` falls within tolerance of `expected`.
    pub fn matches(&self, expected: f64, observed: f64) -> bool {
        (observed - expected).abs() <= self.tolerance_at(expected)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let val = match self {
            MassTolerance::Absolute(x) => *x,
            MassTolerance::Ppm(x) => *x,
        };
        if !val.is_finite() || val <= 0.0 {
            return Err(ConfigError::InvalidTolerance(val));
        }
        Ok(())
    }
}
