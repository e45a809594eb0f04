//! Residual spread and normal-quantile helpers for uncertainty intervals

use crate::{MathError, Result};
use statrs::distribution::{ContinuousCDF, Normal};

/// Population standard deviation, `None` when empty
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let mean = crate::mean(values)?;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Two-sided standard normal quantile for an interval covering `width` of the mass
pub fn normal_quantile(width: f64) -> Result<f64> {
    if width <= 0.0 || width >= 1.0 || width.is_nan() {
        return Err(MathError::InvalidInput(format!(
            "Interval width must be between 0 and 1, got {}",
            width
        )));
    }

    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| MathError::CalculationError(format!("Standard normal: {}", e)))?;

    Ok(normal.inverse_cdf((1.0 + width) / 2.0))
}

/// Half width of the interval `steps_ahead` steps past a history of `history_len` points
pub fn interval_half_width(z: f64, sigma: f64, steps_ahead: usize, history_len: usize) -> f64 {
    let growth = if history_len == 0 {
        1.0
    } else {
        1.0 + steps_ahead as f64 / history_len as f64
    };
    z * sigma * growth.sqrt()
}
