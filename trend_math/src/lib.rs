//! # Trend Math
//!
//! Numeric kernels used by the baseline forecasting engine.
//! This crate provides least-squares trend fits, saturating growth transforms,
//! phase-bucket seasonal profiles and interval helpers.

use thiserror::Error;

pub mod growth;
pub mod intervals;
pub mod regression;
pub mod seasonal;

pub use growth::LogisticFit;
pub use intervals::{interval_half_width, normal_quantile, std_dev};
pub use regression::LinearFit;
pub use seasonal::PhaseProfile;

/// Errors that can occur in trend and seasonal calculations
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for trend math operations
pub type Result<T> = std::result::Result<T, MathError>;

/// Arithmetic mean of a slice, `None` when empty
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
