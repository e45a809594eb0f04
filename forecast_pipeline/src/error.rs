//! Error types for the forecast_pipeline crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised anywhere in the forecasting pipeline
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error related to observation or holiday data
    #[error("Data error: {0}")]
    DataError(String),

    /// A configuration value the engine does not accept
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Prediction or date extension requested from a model that was never fitted
    #[error("Model is not fitted: {0}")]
    NotFitted(String),

    /// Augmentation attempted after fitting closed the configuration
    #[error("Configuration is closed: {0}")]
    ConfigurationClosed(String),

    /// Regional holiday set the engine does not know
    #[error("Unknown holiday region: {0}")]
    UnknownRegion(String),

    /// Cross-validation or metric computation could not proceed
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from the numeric kernels
    #[error("Math error: {0}")]
    MathError(#[from] trend_math::MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV output
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from JSON (de)serialization
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}
