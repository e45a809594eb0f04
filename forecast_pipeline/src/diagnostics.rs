//! Rolling-origin cross-validation and forecast error metrics

use crate::config::ModelConfig;
use crate::data::ObservationSeries;
use crate::engine::ForecastEngine;
use crate::error::{ForecastError, Result};
use crate::handle::{AugmentOptions, ModelHandle};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Window sizes of a cross-validation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossValidationOptions {
    /// Minimum training span before the first cutoff
    pub initial: Duration,
    /// Spacing between cutoffs
    pub period: Duration,
    /// How far past each cutoff predictions are scored
    pub horizon: Duration,
}

impl CrossValidationOptions {
    pub fn new(initial: Duration, period: Duration, horizon: Duration) -> Self {
        Self {
            initial,
            period,
            horizon,
        }
    }

    /// Three horizons of initial training, cutoffs every half horizon
    pub fn from_horizon(horizon: Duration) -> Self {
        Self {
            initial: horizon * 3,
            period: horizon / 2,
            horizon,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.horizon <= Duration::zero() {
            return Err(ForecastError::ValidationError(
                "Cross-validation horizon must be positive".to_string(),
            ));
        }
        if self.period <= Duration::zero() {
            return Err(ForecastError::ValidationError(
                "Cross-validation period must be positive".to_string(),
            ));
        }
        if self.initial < Duration::zero() {
            return Err(ForecastError::ValidationError(
                "Cross-validation initial window cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// One scored prediction of a cross-validation fold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationRow {
    pub ds: NaiveDateTime,
    pub y: f64,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
    /// Last timestamp of the fold's training data
    pub cutoff: NaiveDateTime,
}

/// Aggregate error of cross-validation predictions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    /// Fraction; rows with a zero observation are left out
    pub mape: f64,
    /// Fraction in [0, 2]
    pub smape: f64,
    /// Share of observations inside the prediction interval
    pub coverage: f64,
}

/// Fold cutoffs in ascending order
pub fn cutoffs(
    series: &ObservationSeries,
    options: &CrossValidationOptions,
) -> Result<Vec<NaiveDateTime>> {
    options.validate()?;
    let (Some(first), Some(last)) = (series.first_timestamp(), series.last_timestamp()) else {
        return Err(ForecastError::ValidationError(
            "Cannot cross-validate an empty series".to_string(),
        ));
    };

    let out_of_range = |what: &str| {
        ForecastError::ValidationError(format!(
            "Cross-validation {} is outside the representable time range",
            what
        ))
    };
    let earliest = first
        .checked_add_signed(options.initial)
        .ok_or_else(|| out_of_range("initial window"))?;
    let latest = last
        .checked_sub_signed(options.horizon)
        .ok_or_else(|| out_of_range("horizon"))?;

    let mut result = Vec::new();
    let mut cutoff = Some(latest);
    while let Some(current) = cutoff.filter(|c| *c >= earliest) {
        result.push(current);
        cutoff = current.checked_sub_signed(options.period);
    }

    if result.is_empty() {
        return Err(ForecastError::ValidationError(format!(
            "No cutoffs fit between {} and {}; use a shorter initial window or horizon",
            earliest, latest
        )));
    }

    result.reverse();
    Ok(result)
}

/// Refit at every cutoff and predict the observations of the following horizon
pub fn cross_validation<E: ForecastEngine>(
    engine: &E,
    config: &ModelConfig,
    augment: &AugmentOptions,
    series: &ObservationSeries,
    options: &CrossValidationOptions,
) -> Result<Vec<CrossValidationRow>> {
    let cutoffs = cutoffs(series, options)?;
    info!(
        engine = engine.name(),
        folds = cutoffs.len(),
        "starting cross-validation"
    );

    let mut rows = Vec::new();
    for cutoff in cutoffs {
        let end = cutoff + options.horizon;
        let train = series.filter(|ts| ts <= cutoff);
        let test = series.filter(|ts| ts > cutoff && ts <= end);
        if test.is_empty() {
            debug!(%cutoff, "fold has no observations to score, skipped");
            continue;
        }

        let mut handle = ModelHandle::configure(engine, config)?;
        if !augment.is_empty() {
            handle = handle.augment(augment)?;
        }
        let fitted = handle.fit(&train)?;
        let forecast = fitted.predict(test.timestamps())?;

        rows.extend(
            forecast
                .rows()
                .iter()
                .zip(test.values())
                .map(|(row, &y)| CrossValidationRow {
                    ds: row.ds,
                    y,
                    yhat: row.yhat,
                    yhat_lower: row.yhat_lower,
                    yhat_upper: row.yhat_upper,
                    cutoff,
                }),
        );
        debug!(%cutoff, train = train.len(), test = test.len(), "fold evaluated");
    }

    Ok(rows)
}

/// Error metrics over cross-validation rows
pub fn performance_metrics(rows: &[CrossValidationRow]) -> Result<PerformanceMetrics> {
    if rows.is_empty() {
        return Err(ForecastError::ValidationError(
            "Cannot compute metrics without predictions".to_string(),
        ));
    }

    let n = rows.len() as f64;
    let errors: Vec<f64> = rows.iter().map(|r| r.y - r.yhat).collect();

    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;
    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

    let relative: Vec<f64> = rows
        .iter()
        .zip(errors.iter())
        .filter(|(r, _)| r.y != 0.0)
        .map(|(r, e)| (e / r.y).abs())
        .collect();
    let mape = if relative.is_empty() {
        f64::NAN
    } else {
        relative.iter().sum::<f64>() / relative.len() as f64
    };

    let smape = rows
        .iter()
        .map(|r| {
            let denom = r.y.abs() + r.yhat.abs();
            if denom == 0.0 {
                0.0
            } else {
                2.0 * (r.y - r.yhat).abs() / denom
            }
        })
        .sum::<f64>()
        / n;

    let covered = rows
        .iter()
        .filter(|r| r.y >= r.yhat_lower && r.y <= r.yhat_upper)
        .count();

    Ok(PerformanceMetrics {
        mse,
        rmse: mse.sqrt(),
        mae,
        mape,
        smape,
        coverage: covered as f64 / n,
    })
}
