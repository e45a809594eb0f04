//! Typestate model handle
//!
//! A [`ModelHandle`] owns one engine model and tracks its lifecycle in the
//! type: augmentation is only available while [`Configured`], forecasting only
//! once [`Fitted`]. Calling them out of order does not compile:
//!
//! ```compile_fail
//! use forecast_pipeline::{BaselineEngine, Frequency, ModelConfig, ModelHandle};
//!
//! let handle = ModelHandle::configure(&BaselineEngine, &ModelConfig::default()).unwrap();
//! // not fitted yet
//! let _ = handle.forecast(10, Frequency::Daily);
//! ```
//!
//! ```compile_fail
//! use forecast_pipeline::{
//!     AugmentOptions, BaselineEngine, ModelConfig, ModelHandle, ObservationSeries,
//! };
//!
//! let series = ObservationSeries::from_strings(&["2023-01-01", "2023-01-02"], vec![1.0, 2.0])
//!     .unwrap();
//! let handle = ModelHandle::configure(&BaselineEngine, &ModelConfig::default())
//!     .unwrap()
//!     .fit(&series)
//!     .unwrap();
//! // augmentation is closed after fitting
//! let _ = handle.augment(&AugmentOptions::none());
//! ```

use crate::config::{ModelConfig, Seasonality};
use crate::data::ObservationSeries;
use crate::engine::{ForecastEngine, ForecastModel, ModelParams};
use crate::error::Result;
use crate::forecast::Forecast;
use crate::frequency::Frequency;
use crate::holidays::HolidayCalendar;
use chrono::NaiveDateTime;
use std::marker::PhantomData;
use tracing::debug;

/// Handle state: configured, still open to augmentation
#[derive(Debug, Clone, Copy)]
pub struct Configured;

/// Handle state: fitted, ready to forecast
#[derive(Debug, Clone, Copy)]
pub struct Fitted;

/// Optional additions to a configured model.
///
/// Every field is independent. [`AugmentOptions::with_calendar`] gives the
/// combined preset: the calendar, the US regional holidays and a monthly
/// seasonality.
#[derive(Debug, Clone, Default)]
pub struct AugmentOptions {
    pub holidays: Option<HolidayCalendar>,
    pub country_holidays: Option<String>,
    pub extra_seasonality: Option<Seasonality>,
}

impl AugmentOptions {
    /// No additions; augmenting with this is the identity
    pub fn none() -> Self {
        Self::default()
    }

    /// Calendar holidays plus US holidays plus a monthly component
    pub fn with_calendar(calendar: HolidayCalendar) -> Self {
        Self {
            holidays: Some(calendar),
            country_holidays: Some("US".to_string()),
            extra_seasonality: Some(Seasonality::monthly()),
        }
    }

    pub fn holidays(mut self, calendar: HolidayCalendar) -> Self {
        self.holidays = Some(calendar);
        self
    }

    pub fn country_holidays(mut self, region: &str) -> Self {
        self.country_holidays = Some(region.to_string());
        self
    }

    pub fn extra_seasonality(mut self, seasonality: Seasonality) -> Self {
        self.extra_seasonality = Some(seasonality);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.holidays.is_none() && self.country_holidays.is_none() && self.extra_seasonality.is_none()
    }
}

/// An engine model together with its lifecycle state
#[derive(Debug)]
pub struct ModelHandle<M: ForecastModel, S> {
    model: M,
    history_len: usize,
    state: PhantomData<S>,
}

impl<M: ForecastModel> ModelHandle<M, Configured> {
    /// Create an unfitted model from `config`
    pub fn configure<E>(engine: &E, config: &ModelConfig) -> Result<Self>
    where
        E: ForecastEngine<Model = M>,
    {
        let model = engine.configure(config)?;
        debug!(engine = engine.name(), "model configured");
        Ok(Self {
            model,
            history_len: 0,
            state: PhantomData,
        })
    }

    /// Register whichever additions `options` carries
    pub fn augment(mut self, options: &AugmentOptions) -> Result<Self> {
        if let Some(calendar) = &options.holidays {
            self.model.add_holidays(calendar)?;
        }
        if let Some(region) = &options.country_holidays {
            self.model.add_country_holidays(region)?;
        }
        if let Some(seasonality) = &options.extra_seasonality {
            self.model.add_seasonality(seasonality)?;
        }

        debug!(
            holidays = options.holidays.is_some(),
            country = options.country_holidays.as_deref().unwrap_or("-"),
            seasonality = options
                .extra_seasonality
                .as_ref()
                .map(|s| s.name.as_str())
                .unwrap_or("-"),
            "model augmented"
        );
        Ok(self)
    }

    /// Fit on `series`, consuming the configured handle
    pub fn fit(mut self, series: &ObservationSeries) -> Result<ModelHandle<M, Fitted>> {
        self.model.fit(series)?;
        debug!(observations = series.len(), "model fitted");
        Ok(ModelHandle {
            model: self.model,
            history_len: series.len(),
            state: PhantomData,
        })
    }
}

impl<M: ForecastModel> ModelHandle<M, Fitted> {
    /// Predict over the history followed by `horizon` steps of `frequency`
    pub fn forecast(&self, horizon: usize, frequency: Frequency) -> Result<Forecast> {
        let dates = self.model.make_future_dates(horizon, frequency, true)?;
        self.model.predict(&dates)
    }

    /// Predict at arbitrary timestamps
    pub fn predict(&self, timestamps: &[NaiveDateTime]) -> Result<Forecast> {
        self.model.predict(timestamps)
    }

    /// Number of observations the model was fitted on
    pub fn history_len(&self) -> usize {
        self.history_len
    }
}

impl<M: ForecastModel, S> ModelHandle<M, S> {
    pub fn params(&self) -> ModelParams {
        self.model.params()
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeasonalityOption;
    use crate::engine::BaselineEngine;
    use crate::error::ForecastError;
    use crate::utils::parse_timestamp;
    use chrono::Duration;

    fn series(days: usize) -> ObservationSeries {
        let start = parse_timestamp("2023-03-01").unwrap();
        let ts = (0..days).map(|i| start + Duration::days(i as i64)).collect();
        ObservationSeries::new(ts, (0..days).map(|i| i as f64 * 0.5).collect()).unwrap()
    }

    #[test]
    fn test_empty_augment_is_identity() {
        let config = ModelConfig::new();
        let plain = ModelHandle::configure(&BaselineEngine, &config).unwrap();
        let augmented = ModelHandle::configure(&BaselineEngine, &config)
            .unwrap()
            .augment(&AugmentOptions::none())
            .unwrap();

        assert!(AugmentOptions::none().is_empty());
        assert_eq!(plain.params(), augmented.params());
    }

    #[test]
    fn test_calendar_preset() {
        let calendar = HolidayCalendar::new()
            .with_holiday(parse_timestamp("2023-03-10").unwrap().date(), "promo");
        let handle = ModelHandle::configure(&BaselineEngine, &ModelConfig::new())
            .unwrap()
            .augment(&AugmentOptions::with_calendar(calendar))
            .unwrap();

        let params = handle.params();
        assert_eq!(params.country_holidays.as_deref(), Some("US"));
        assert!(params.has_seasonality("monthly"));
        assert!(params.holiday_names.contains(&"promo".to_string()));
    }

    #[test]
    fn test_options_are_independent() {
        let handle = ModelHandle::configure(&BaselineEngine, &ModelConfig::new())
            .unwrap()
            .augment(&AugmentOptions::none().country_holidays("US"))
            .unwrap();

        let params = handle.params();
        assert_eq!(params.country_holidays.as_deref(), Some("US"));
        assert!(!params.has_seasonality("monthly"));
        assert!(params.holiday_names.is_empty());
    }

    #[test]
    fn test_forecast_covers_history_and_horizon() {
        let config = ModelConfig::new().with_weekly_seasonality(SeasonalityOption::Disabled);
        let handle = ModelHandle::configure(&BaselineEngine, &config)
            .unwrap()
            .fit(&series(20))
            .unwrap();

        let forecast = handle.forecast(7, Frequency::Daily).unwrap();
        assert_eq!(forecast.len(), 27);
        assert_eq!(forecast.history_len(), 20);
        assert_eq!(handle.history_len(), 20);
        assert!(handle.params().fitted);
    }

    #[test]
    fn test_engine_errors_surface() {
        let result = ModelHandle::configure(&BaselineEngine, &ModelConfig::new())
            .unwrap()
            .augment(&AugmentOptions::none().country_holidays("Narnia"));
        assert!(matches!(result, Err(ForecastError::UnknownRegion(_))));
    }
}
