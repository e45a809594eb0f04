//! Ordinary least-squares line fitting

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// A fitted straight line `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    slope: f64,
    intercept: f64,
}

impl LinearFit {
    /// Create a line from known coefficients
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    /// Fit a line through `(x, y)` pairs by least squares
    pub fn fit(x: &[f64], y: &[f64]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(MathError::InvalidInput(format!(
                "x length ({}) doesn't match y length ({})",
                x.len(),
                y.len()
            )));
        }
        if x.len() < 2 {
            return Err(MathError::InsufficientData(
                "Need at least 2 points for a linear fit".to_string(),
            ));
        }

        let n = x.len() as f64;
        let x_mean = x.iter().sum::<f64>() / n;
        let y_mean = y.iter().sum::<f64>() / n;

        let mut numerator = 0.0;
        let mut denominator = 0.0;

        for (&xi, &yi) in x.iter().zip(y.iter()) {
            numerator += (xi - x_mean) * (yi - y_mean);
            denominator += (xi - x_mean) * (xi - x_mean);
        }

        if denominator.abs() < 1e-12 {
            return Err(MathError::CalculationError(
                "Cannot calculate slope: x values are too similar".to_string(),
            ));
        }

        let slope = numerator / denominator;
        let intercept = y_mean - slope * x_mean;

        Ok(Self { slope, intercept })
    }

    /// Evaluate the line at `x`
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Coefficient of determination of this line against `(x, y)`
    pub fn r_squared(&self, x: &[f64], y: &[f64]) -> Result<f64> {
        if x.len() != y.len() || x.is_empty() {
            return Err(MathError::InvalidInput(
                "x and y must have the same non-zero length".to_string(),
            ));
        }

        let y_mean = y.iter().sum::<f64>() / y.len() as f64;
        let mut ss_total = 0.0;
        let mut ss_residual = 0.0;

        for (&xi, &yi) in x.iter().zip(y.iter()) {
            ss_total += (yi - y_mean).powi(2);
            ss_residual += (yi - self.predict(xi)).powi(2);
        }

        if ss_total.abs() < 1e-12 {
            return Err(MathError::CalculationError(
                "Cannot calculate R-squared: total sum of squares is too small".to_string(),
            ));
        }

        Ok(1.0 - ss_residual / ss_total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perfect_line() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [10.0, 20.0, 30.0, 40.0];
        let fit = LinearFit::fit(&x, &y).unwrap();

        assert_relative_eq!(fit.slope(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(fit.intercept(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(fit.predict(4.0), 50.0, epsilon = 1e-9);
        assert!(fit.r_squared(&x, &y).unwrap() > 0.999);
    }

    #[test]
    fn test_rejects_degenerate_input() {
        assert!(LinearFit::fit(&[1.0], &[1.0]).is_err());
        assert!(LinearFit::fit(&[1.0, 2.0], &[1.0]).is_err());
        assert!(LinearFit::fit(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]).is_err());
    }
}
