//! Forecasting engine seam
//!
//! The pipeline never estimates anything itself. It drives an engine through
//! the capabilities below: configure a model, register holidays and extra
//! seasonalities, fit, extend the timestamps and predict. All validation and
//! all failures belong to the engine.

use crate::config::{ModelConfig, Seasonality, SeasonalityMode};
use crate::data::ObservationSeries;
use crate::error::Result;
use crate::forecast::Forecast;
use crate::frequency::Frequency;
use crate::holidays::HolidayCalendar;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod baseline;

pub use baseline::{BaselineEngine, BaselineModel};

/// Factory for models of one engine
pub trait ForecastEngine {
    /// The stateful model this engine produces
    type Model: ForecastModel;

    /// Create an unfitted model from `config`
    fn configure(&self, config: &ModelConfig) -> Result<Self::Model>;

    /// Name of the engine
    fn name(&self) -> &str;
}

/// A stateful model: configured, optionally augmented, then fitted once
pub trait ForecastModel: Debug {
    /// Register a caller-supplied holiday calendar
    fn add_holidays(&mut self, calendar: &HolidayCalendar) -> Result<()>;

    /// Register the fixed holiday set of a region
    fn add_country_holidays(&mut self, region: &str) -> Result<()>;

    /// Register an additional periodic component
    fn add_seasonality(&mut self, seasonality: &Seasonality) -> Result<()>;

    /// Estimate parameters from `series`; closes further augmentation
    fn fit(&mut self, series: &ObservationSeries) -> Result<()>;

    /// History timestamps (optionally) followed by `horizon` future steps
    fn make_future_dates(
        &self,
        horizon: usize,
        frequency: Frequency,
        include_history: bool,
    ) -> Result<Vec<NaiveDateTime>>;

    /// Predict at arbitrary timestamps
    fn predict(&self, timestamps: &[NaiveDateTime]) -> Result<Forecast>;

    /// Snapshot of the model's configuration and registrations
    fn params(&self) -> ModelParams;

    fn is_fitted(&self) -> bool;
}

/// A seasonal component as the engine resolved it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityParams {
    pub name: String,
    pub period: f64,
    pub fourier_order: usize,
    pub mode: SeasonalityMode,
}

/// Introspection snapshot of a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// The configuration the model was created from
    pub config: ModelConfig,
    /// Extra seasonalities registered before fitting
    pub extra_seasonalities: Vec<Seasonality>,
    /// Every active seasonal component; built-ins are resolved at fit time
    pub seasonalities: Vec<SeasonalityParams>,
    /// Labels of all registered holidays, caller and regional
    pub holiday_names: Vec<String>,
    pub country_holidays: Option<String>,
    /// Changepoint locations, known once fitted
    pub changepoints: Vec<NaiveDateTime>,
    pub fitted: bool,
}

impl ModelParams {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn has_seasonality(&self, name: &str) -> bool {
        self.seasonalities.iter().any(|s| s.name == name)
            || self.extra_seasonalities.iter().any(|s| s.name == name)
    }
}
