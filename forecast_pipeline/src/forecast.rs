//! Forecast result table

use crate::error::{ForecastError, Result};
use crate::utils::to_epoch_millis;
use chrono::NaiveDateTime;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Column names of [`Forecast::to_dataframe`], in order
pub const FORECAST_COLUMNS: [&str; 5] = ["ds", "yhat", "yhat_lower", "yhat_upper", "trend"];

/// One predicted timestamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub ds: NaiveDateTime,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
    /// Trend component alone, without seasonal or holiday effects
    pub trend: f64,
}

/// Predictions over the fitted history followed by the future horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    rows: Vec<ForecastRow>,
    /// Leading rows that fall inside the fitted history
    history_len: usize,
}

impl Forecast {
    pub fn new(rows: Vec<ForecastRow>, history_len: usize) -> Result<Self> {
        if history_len > rows.len() {
            return Err(ForecastError::ValidationError(format!(
                "History length ({}) exceeds forecast length ({})",
                history_len,
                rows.len()
            )));
        }
        Ok(Self { rows, history_len })
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn history_len(&self) -> usize {
        self.history_len
    }

    /// Rows covering the fitted history
    pub fn history(&self) -> &[ForecastRow] {
        &self.rows[..self.history_len]
    }

    /// Rows past the last observation
    pub fn horizon(&self) -> &[ForecastRow] {
        &self.rows[self.history_len..]
    }

    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.rows.iter().map(|r| r.ds).collect()
    }

    pub fn yhat(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.yhat).collect()
    }

    pub fn yhat_lower(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.yhat_lower).collect()
    }

    pub fn yhat_upper(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.yhat_upper).collect()
    }

    pub fn trend(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.trend).collect()
    }

    /// Convert to a DataFrame with the columns of [`FORECAST_COLUMNS`]
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let millis: Vec<i64> = self.rows.iter().map(|r| to_epoch_millis(r.ds)).collect();
        let ds = Series::new(FORECAST_COLUMNS[0], millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

        let df = DataFrame::new(vec![
            ds,
            Series::new(FORECAST_COLUMNS[1], self.yhat()),
            Series::new(FORECAST_COLUMNS[2], self.yhat_lower()),
            Series::new(FORECAST_COLUMNS[3], self.yhat_upper()),
            Series::new(FORECAST_COLUMNS[4], self.trend()),
        ])?;

        Ok(df)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
