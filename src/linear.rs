//! Fitted linear regressor over the encoded feature representation.

use crate::error::{NarxError, Result};
use serde::{Deserialize, Serialize};

/// Linear model with fitted coefficients and intercept.
///
/// Operates on the dense encoded row produced by
/// [`crate::preprocessing::TabularEncoder`]; one coefficient per encoded
/// column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    coefficients: Vec<f32>,
    intercept: f32,
}

impl LinearRegressor {
    /// Wraps fitted coefficients and intercept.
    ///
    /// # Errors
    ///
    /// Returns an error if the coefficient vector is empty or any fitted
    /// parameter is non-finite.
    pub fn from_params(coefficients: Vec<f32>, intercept: f32) -> Result<Self> {
        if coefficients.is_empty() {
            return Err(NarxError::artifact("linear", "no coefficients"));
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(NarxError::artifact(
                "linear",
                "non-finite fitted parameter",
            ));
        }
        Ok(Self {
            coefficients,
            intercept,
        })
    }

    /// Number of encoded input columns this model expects.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Fitted coefficients.
    #[must_use]
    pub fn coefficients(&self) -> &[f32] {
        &self.coefficients
    }

    /// Fitted intercept.
    #[must_use]
    pub fn intercept(&self) -> f32 {
        self.intercept
    }

    /// Predicts the target for one encoded row.
    ///
    /// # Errors
    ///
    /// Returns an error on row-width mismatch.
    pub fn predict_one(&self, x: &[f32]) -> Result<f32> {
        if x.len() != self.coefficients.len() {
            return Err(NarxError::DimensionMismatch {
                expected: format!("{} encoded columns", self.coefficients.len()),
                actual: format!("{}", x.len()),
            });
        }
        let dot: f32 = self
            .coefficients
            .iter()
            .zip(x.iter())
            .map(|(c, v)| c * v)
            .sum();
        Ok(self.intercept + dot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_is_affine() {
        let model = LinearRegressor::from_params(vec![2.0, -1.0], 10.0).expect("valid params");
        assert_eq!(model.predict_one(&[3.0, 4.0]).expect("valid row"), 12.0);
        assert_eq!(model.n_features(), 2);
        assert_eq!(model.intercept(), 10.0);
    }

    #[test]
    fn test_rejects_width_mismatch() {
        let model = LinearRegressor::from_params(vec![1.0, 1.0], 0.0).expect("valid params");
        assert!(model.predict_one(&[1.0]).is_err());
        assert!(model.predict_one(&[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_rejects_bad_params() {
        assert!(LinearRegressor::from_params(vec![], 0.0).is_err());
        assert!(LinearRegressor::from_params(vec![f32::INFINITY], 0.0).is_err());
        assert!(LinearRegressor::from_params(vec![1.0], f32::NAN).is_err());
    }
}
