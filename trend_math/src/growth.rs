//! Saturating (logistic) growth fitted through a logit transform

use crate::regression::LinearFit;
use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

// Ratios are clamped away from 0 and 1 before taking the logit.
const RATIO_EPSILON: f64 = 1e-6;

/// Logistic curve `cap / (1 + exp(-(k * t + m)))` fitted by least squares on
/// `logit(y / cap)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticFit {
    line: LinearFit,
}

impl LogisticFit {
    /// Fit against observations `y` bounded above by `cap`
    pub fn fit(t: &[f64], y: &[f64], cap: &[f64]) -> Result<Self> {
        if t.len() != y.len() || t.len() != cap.len() {
            return Err(MathError::InvalidInput(
                "t, y and cap must have the same length".to_string(),
            ));
        }
        if let Some(bad) = cap.iter().find(|c| **c <= 0.0 || !c.is_finite()) {
            return Err(MathError::InvalidInput(format!(
                "Capacity must be positive and finite, got {}",
                bad
            )));
        }

        let transformed: Vec<f64> = y
            .iter()
            .zip(cap.iter())
            .map(|(&v, &c)| logit((v / c).clamp(RATIO_EPSILON, 1.0 - RATIO_EPSILON)))
            .collect();

        Ok(Self {
            line: LinearFit::fit(t, &transformed)?,
        })
    }

    /// Evaluate the curve at `t` for capacity `cap`
    pub fn predict(&self, t: f64, cap: f64) -> f64 {
        cap * sigmoid(self.line.predict(t))
    }

    /// Growth rate on the logit scale
    pub fn rate(&self) -> f64 {
        self.line.slope()
    }
}

pub fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_logit_sigmoid_inverse() {
        for p in [0.1, 0.5, 0.9] {
            assert_relative_eq!(sigmoid(logit(p)), p, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_recovers_logistic_curve() {
        let t: Vec<f64> = (0..50).map(|i| i as f64 / 49.0).collect();
        let cap = vec![100.0; t.len()];
        let y: Vec<f64> = t.iter().map(|&ti| 100.0 * sigmoid(6.0 * ti - 3.0)).collect();

        let fit = LogisticFit::fit(&t, &y, &cap).unwrap();

        assert_relative_eq!(fit.rate(), 6.0, epsilon = 1e-6);
        assert_relative_eq!(fit.predict(0.5, 100.0), 50.0, epsilon = 1e-6);
        assert!(fit.predict(10.0, 100.0) <= 100.0);
    }

    #[test]
    fn test_rejects_non_positive_cap() {
        let result = LogisticFit::fit(&[0.0, 1.0], &[1.0, 2.0], &[0.0, 5.0]);
        assert!(result.is_err());
    }
}
