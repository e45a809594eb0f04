//! Baseline forecasting engine
//!
//! A small deterministic engine behind the [`ForecastEngine`] seam:
//!
//! - trend: least squares on scaled time (linear), the mean (flat), or least
//!   squares on `logit(y / cap)` (logistic)
//! - seasonality: one phase-bucket profile per component with `2 * order + 1`
//!   buckets, fitted one after another on what the previous ones left
//! - holidays: mean residual over the days each label covers
//! - intervals: residual spread times the normal quantile of the interval
//!   width, widened with the distance past the history
//!
//! Changepoints are placed and reported but do not bend the trend.

use super::{ForecastEngine, ForecastModel, ModelParams, SeasonalityParams};
use crate::config::{Growth, ModelConfig, Seasonality, SeasonalityMode, SeasonalityOption};
use crate::data::ObservationSeries;
use crate::error::{ForecastError, Result};
use crate::forecast::{Forecast, ForecastRow};
use crate::frequency::{future_timestamps, Frequency};
use crate::holidays::{country_holidays, is_supported_region, HolidayCalendar};
use crate::utils::days_since;
use chrono::{Datelike, NaiveDateTime};
use std::collections::BTreeMap;
use tracing::debug;
use trend_math::{
    interval_half_width, normal_quantile, std_dev, LinearFit, LogisticFit, PhaseProfile,
};

// Relative trend values below this make multiplicative effects undefined.
const MIN_TREND_MAGNITUDE: f64 = 1e-12;

/// Engine producing [`BaselineModel`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineEngine;

impl BaselineEngine {
    pub fn new() -> Self {
        Self
    }
}

impl ForecastEngine for BaselineEngine {
    type Model = BaselineModel;

    fn configure(&self, config: &ModelConfig) -> Result<Self::Model> {
        if !(0.0..=1.0).contains(&config.changepoint_range) {
            return Err(ForecastError::InvalidParameter(format!(
                "changepoint_range must be in [0, 1], got {}",
                config.changepoint_range
            )));
        }
        if !(config.interval_width > 0.0 && config.interval_width < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "interval_width must be in (0, 1), got {}",
                config.interval_width
            )));
        }

        for (name, option) in [
            ("yearly", config.yearly_seasonality),
            ("weekly", config.weekly_seasonality),
            ("daily", config.daily_seasonality),
        ] {
            if option.order() == Some(0) {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} seasonality order must be positive",
                    name
                )));
            }
        }

        debug!(growth = %config.growth, "baseline model configured");
        Ok(BaselineModel::new(config.clone()))
    }

    fn name(&self) -> &str {
        "baseline"
    }
}

#[derive(Debug, Clone)]
enum TrendFit {
    Linear(LinearFit),
    Flat(f64),
    Logistic(LogisticFit),
}

#[derive(Debug, Clone)]
struct FittedComponent {
    params: SeasonalityParams,
    profile: PhaseProfile,
}

#[derive(Debug, Clone)]
struct FittedState {
    history: ObservationSeries,
    t0: NaiveDateTime,
    span_days: f64,
    trend: TrendFit,
    components: Vec<FittedComponent>,
    holiday_effects: BTreeMap<String, f64>,
    changepoints: Vec<NaiveDateTime>,
    sigma: f64,
    z: f64,
}

/// Model produced by [`BaselineEngine`]
#[derive(Debug, Clone)]
pub struct BaselineModel {
    config: ModelConfig,
    extra_seasonalities: Vec<Seasonality>,
    holidays: Option<HolidayCalendar>,
    country: Option<String>,
    state: Option<FittedState>,
}

impl BaselineModel {
    fn new(config: ModelConfig) -> Self {
        Self {
            config,
            extra_seasonalities: Vec::new(),
            holidays: None,
            country: None,
            state: None,
        }
    }

    fn ensure_open(&self, action: &str) -> Result<()> {
        if self.state.is_some() {
            return Err(ForecastError::ConfigurationClosed(format!(
                "cannot {} after the model has been fitted",
                action
            )));
        }
        Ok(())
    }

    fn fitted_state(&self, action: &str) -> Result<&FittedState> {
        self.state.as_ref().ok_or_else(|| {
            ForecastError::NotFitted(format!("model must be fitted before {}", action))
        })
    }

    /// Caller holidays plus the regional set for the years `timestamps` span
    fn holiday_calendar(&self, timestamps: &[NaiveDateTime]) -> Result<HolidayCalendar> {
        let own = self.holidays.clone().unwrap_or_default();
        let (Some(region), Some(first), Some(last)) = (
            self.country.as_deref(),
            timestamps.iter().min(),
            timestamps.iter().max(),
        ) else {
            return Ok(own);
        };

        let regional = country_holidays(region, first.year() - 1..=last.year() + 1)?;
        Ok(regional.merged(&own))
    }

    /// Built-in seasonalities switched on for a history of this span and spacing
    fn resolve_seasonalities(&self, timestamps: &[NaiveDateTime]) -> Vec<SeasonalityParams> {
        let span_days = match (timestamps.first(), timestamps.last()) {
            (Some(first), Some(last)) => days_since(*first, *last),
            _ => 0.0,
        };
        let min_spacing = timestamps
            .windows(2)
            .map(|w| days_since(w[0], w[1]))
            .fold(f64::INFINITY, f64::min);

        let mode = self.config.seasonality_mode;
        let builtins = [
            ("yearly", 365.25, 10, self.config.yearly_seasonality, span_days >= 730.0),
            (
                "weekly",
                7.0,
                3,
                self.config.weekly_seasonality,
                span_days >= 14.0 && min_spacing < 7.0,
            ),
            (
                "daily",
                1.0,
                4,
                self.config.daily_seasonality,
                span_days >= 2.0 && min_spacing < 1.0,
            ),
        ];

        let mut resolved: Vec<SeasonalityParams> = builtins
            .into_iter()
            .filter_map(|(name, period, default_order, option, auto_on)| {
                let order = match option {
                    SeasonalityOption::Enabled => default_order,
                    SeasonalityOption::Order(order) => order,
                    SeasonalityOption::Auto if auto_on => default_order,
                    SeasonalityOption::Auto | SeasonalityOption::Disabled => return None,
                };
                Some(SeasonalityParams {
                    name: name.to_string(),
                    period,
                    fourier_order: order,
                    mode,
                })
            })
            .collect();

        resolved.extend(self.extra_seasonalities.iter().map(|s| SeasonalityParams {
            name: s.name.clone(),
            period: s.period,
            fourier_order: s.fourier_order,
            mode: s.mode.unwrap_or(mode),
        }));

        resolved
    }

    fn place_changepoints(&self, timestamps: &[NaiveDateTime]) -> Vec<NaiveDateTime> {
        if let Some(manual) = &self.config.changepoints {
            return manual.clone();
        }

        let history_size = (timestamps.len() as f64 * self.config.changepoint_range).floor() as usize;
        let count = self.config.n_changepoints.min(history_size.saturating_sub(1));
        if count == 0 {
            return Vec::new();
        }

        // Evenly spaced over the leading part of the history, skipping the first point
        let last_index = (history_size - 1) as f64;
        (1..=count)
            .map(|k| timestamps[(k as f64 * last_index / count as f64).round() as usize])
            .collect()
    }

    fn validate_series(&self, series: &ObservationSeries) -> Result<()> {
        if series.is_empty() {
            return Err(ForecastError::DataError(
                "Empty time series data".to_string(),
            ));
        }
        if series.len() < 2 {
            return Err(ForecastError::DataError(
                "Need at least 2 observations to fit".to_string(),
            ));
        }
        if let Some(w) = series.timestamps().windows(2).find(|w| w[0] >= w[1]) {
            return Err(ForecastError::DataError(format!(
                "Timestamps must be strictly increasing: {} is followed by {}",
                w[0], w[1]
            )));
        }
        if let Some(v) = series.values().iter().find(|v| !v.is_finite()) {
            return Err(ForecastError::DataError(format!(
                "Observed values must be finite, found {}",
                v
            )));
        }
        if self.config.growth == Growth::Logistic && series.cap().is_none() {
            return Err(ForecastError::DataError(
                "Logistic growth requires a cap column".to_string(),
            ));
        }
        Ok(())
    }
}

impl FittedState {
    fn scaled_time(&self, ts: NaiveDateTime) -> f64 {
        days_since(self.t0, ts) / self.span_days
    }

    fn trend_at(&self, ts: NaiveDateTime) -> f64 {
        let t = self.scaled_time(ts);
        match &self.trend {
            TrendFit::Linear(line) => line.predict(t),
            TrendFit::Flat(level) => *level,
            TrendFit::Logistic(curve) => curve.predict(t, self.cap_at(ts)),
        }
    }

    // Observed cap inside the history, last observed cap beyond it
    fn cap_at(&self, ts: NaiveDateTime) -> f64 {
        let cap = self.history.cap().unwrap_or_default();
        match self.history.timestamps().binary_search(&ts) {
            Ok(i) => cap[i],
            Err(_) => cap.last().copied().unwrap_or(1.0),
        }
    }

    /// Multiplicative and additive seasonal parts at `ts`
    fn seasonal_at(&self, ts: NaiveDateTime) -> (f64, f64) {
        let t_days = days_since(self.t0, ts);
        self.components
            .iter()
            .fold((0.0, 0.0), |(mult, add), c| match c.params.mode {
                SeasonalityMode::Multiplicative => (mult + c.profile.value_at(t_days), add),
                SeasonalityMode::Additive => (mult, add + c.profile.value_at(t_days)),
            })
    }

    fn holiday_at(&self, calendar: &HolidayCalendar, ts: NaiveDateTime) -> f64 {
        calendar
            .labels_covering(ts.date())
            .iter()
            .filter_map(|label| self.holiday_effects.get(*label))
            .sum()
    }
}

/// Residual left for a component in `mode` given the current fit
fn residuals_for(
    mode: SeasonalityMode,
    y: &[f64],
    trend: &[f64],
    mult: &[f64],
    add: &[f64],
) -> Vec<f64> {
    (0..y.len())
        .map(|i| match mode {
            SeasonalityMode::Additive => y[i] - trend[i] * (1.0 + mult[i]) - add[i],
            SeasonalityMode::Multiplicative => (y[i] - add[i]) / trend[i] - 1.0 - mult[i],
        })
        .collect()
}

impl ForecastModel for BaselineModel {
    fn add_holidays(&mut self, calendar: &HolidayCalendar) -> Result<()> {
        self.ensure_open("add holidays")?;
        let merged = match &self.holidays {
            Some(existing) => existing.merged(calendar),
            None => calendar.clone(),
        };
        self.holidays = Some(merged);
        Ok(())
    }

    fn add_country_holidays(&mut self, region: &str) -> Result<()> {
        self.ensure_open("add country holidays")?;
        if !is_supported_region(region) {
            return Err(ForecastError::UnknownRegion(region.to_string()));
        }
        if let Some(existing) = &self.country {
            return Err(ForecastError::InvalidParameter(format!(
                "country holidays already set to {}",
                existing
            )));
        }
        self.country = Some(region.to_uppercase());
        Ok(())
    }

    fn add_seasonality(&mut self, seasonality: &Seasonality) -> Result<()> {
        self.ensure_open("add seasonality")?;
        if seasonality.period <= 0.0 || !seasonality.period.is_finite() {
            return Err(ForecastError::InvalidParameter(format!(
                "seasonality period must be positive, got {}",
                seasonality.period
            )));
        }
        if seasonality.fourier_order == 0 {
            return Err(ForecastError::InvalidParameter(
                "fourier_order must be at least 1".to_string(),
            ));
        }
        if self.extra_seasonalities.iter().any(|s| s.name == seasonality.name) {
            return Err(ForecastError::InvalidParameter(format!(
                "seasonality '{}' already exists",
                seasonality.name
            )));
        }
        self.extra_seasonalities.push(seasonality.clone());
        Ok(())
    }

    fn fit(&mut self, series: &ObservationSeries) -> Result<()> {
        if self.state.is_some() {
            return Err(ForecastError::ConfigurationClosed(
                "model can only be fitted once".to_string(),
            ));
        }
        self.validate_series(series)?;

        let timestamps = series.timestamps();
        let y = series.values();
        let n = y.len();
        let t0 = timestamps[0];
        let span_days = days_since(t0, timestamps[n - 1]);
        let t: Vec<f64> = timestamps.iter().map(|ts| days_since(t0, *ts) / span_days).collect();
        let t_days: Vec<f64> = timestamps.iter().map(|ts| days_since(t0, *ts)).collect();

        let trend = match self.config.growth {
            Growth::Linear => TrendFit::Linear(LinearFit::fit(&t, y)?),
            Growth::Flat => TrendFit::Flat(trend_math::mean(y).unwrap_or_default()),
            Growth::Logistic => {
                let cap = series.cap().unwrap_or_default();
                TrendFit::Logistic(LogisticFit::fit(&t, y, cap)?)
            }
        };

        let mut state = FittedState {
            history: series.clone(),
            t0,
            span_days,
            trend,
            components: Vec::new(),
            holiday_effects: BTreeMap::new(),
            changepoints: self.place_changepoints(timestamps),
            sigma: 0.0,
            z: normal_quantile(self.config.interval_width)?,
        };

        let trend_values: Vec<f64> = timestamps.iter().map(|ts| state.trend_at(*ts)).collect();
        let seasonalities = self.resolve_seasonalities(timestamps);
        let multiplicative = seasonalities
            .iter()
            .any(|s| s.mode == SeasonalityMode::Multiplicative)
            || self.config.seasonality_mode == SeasonalityMode::Multiplicative;
        if multiplicative && trend_values.iter().any(|v| v.abs() < MIN_TREND_MAGNITUDE) {
            return Err(ForecastError::DataError(
                "Multiplicative effects need a trend that stays away from zero".to_string(),
            ));
        }

        let mut mult = vec![0.0; n];
        let mut add = vec![0.0; n];

        for params in seasonalities {
            let r = residuals_for(params.mode, y, &trend_values, &mult, &add);
            let profile =
                PhaseProfile::fit(&t_days, &r, params.period, 2 * params.fourier_order + 1)?;
            let target = match params.mode {
                SeasonalityMode::Multiplicative => &mut mult,
                SeasonalityMode::Additive => &mut add,
            };
            for (acc, td) in target.iter_mut().zip(t_days.iter()) {
                *acc += profile.value_at(*td);
            }
            state.components.push(FittedComponent { params, profile });
        }

        // Holiday effects follow the model's seasonality mode
        let holiday_mode = self.config.seasonality_mode;
        let calendar = self.holiday_calendar(timestamps)?;
        if !calendar.is_empty() {
            let r = residuals_for(holiday_mode, y, &trend_values, &mult, &add);
            let mut sums: BTreeMap<String, (f64, usize)> = calendar
                .labels()
                .into_iter()
                .map(|label| (label, (0.0, 0)))
                .collect();
            for (ts, ri) in timestamps.iter().zip(r.iter()) {
                for label in calendar.labels_covering(ts.date()) {
                    if let Some((sum, count)) = sums.get_mut(label) {
                        *sum += ri;
                        *count += 1;
                    }
                }
            }
            state.holiday_effects = sums
                .into_iter()
                .map(|(label, (sum, count))| {
                    let effect = if count > 0 { sum / count as f64 } else { 0.0 };
                    (label, effect)
                })
                .collect();
        }

        let fitted: Vec<f64> = (0..n)
            .map(|i| {
                let holiday = state.holiday_at(&calendar, timestamps[i]);
                match holiday_mode {
                    SeasonalityMode::Additive => {
                        trend_values[i] * (1.0 + mult[i]) + add[i] + holiday
                    }
                    SeasonalityMode::Multiplicative => {
                        trend_values[i] * (1.0 + mult[i] + holiday) + add[i]
                    }
                }
            })
            .collect();
        let residuals: Vec<f64> = y.iter().zip(fitted.iter()).map(|(a, f)| a - f).collect();
        state.sigma = std_dev(&residuals).unwrap_or_default();

        debug!(
            growth = %self.config.growth,
            observations = n,
            components = state.components.len(),
            holidays = state.holiday_effects.len(),
            sigma = state.sigma,
            "baseline model fitted"
        );

        self.state = Some(state);
        Ok(())
    }

    fn make_future_dates(
        &self,
        horizon: usize,
        frequency: Frequency,
        include_history: bool,
    ) -> Result<Vec<NaiveDateTime>> {
        let state = self.fitted_state("making future dates")?;
        let history = state.history.timestamps();
        let last = history[history.len() - 1];

        let future = future_timestamps(last, horizon, frequency)?;
        if !include_history {
            return Ok(future);
        }

        let mut dates = Vec::with_capacity(history.len() + future.len());
        dates.extend_from_slice(history);
        dates.extend(future);
        Ok(dates)
    }

    fn predict(&self, timestamps: &[NaiveDateTime]) -> Result<Forecast> {
        let state = self.fitted_state("prediction")?;
        let calendar = self.holiday_calendar(timestamps)?;
        let history = state.history.timestamps();
        let last = history[history.len() - 1];
        let holiday_mode = self.config.seasonality_mode;

        let mut steps_ahead = 0usize;
        let rows = timestamps
            .iter()
            .map(|&ds| {
                if ds > last {
                    steps_ahead += 1;
                }
                let trend = state.trend_at(ds);
                let (mult, add) = state.seasonal_at(ds);
                let holiday = state.holiday_at(&calendar, ds);
                let yhat = match holiday_mode {
                    SeasonalityMode::Additive => trend * (1.0 + mult) + add + holiday,
                    SeasonalityMode::Multiplicative => trend * (1.0 + mult + holiday) + add,
                };
                let half_width = interval_half_width(state.z, state.sigma, steps_ahead, history.len());
                ForecastRow {
                    ds,
                    yhat,
                    yhat_lower: yhat - half_width,
                    yhat_upper: yhat + half_width,
                    trend,
                }
            })
            .collect::<Vec<_>>();

        let history_len = timestamps.iter().take_while(|ds| **ds <= last).count();
        Forecast::new(rows, history_len)
    }

    fn params(&self) -> ModelParams {
        let seasonalities = match &self.state {
            Some(state) => state.components.iter().map(|c| c.params.clone()).collect(),
            None => self.resolve_seasonalities(&[]),
        };

        let holiday_names = match &self.state {
            Some(state) => state.holiday_effects.keys().cloned().collect(),
            None => self
                .holidays
                .as_ref()
                .map(HolidayCalendar::labels)
                .unwrap_or_default(),
        };

        ModelParams {
            config: self.config.clone(),
            extra_seasonalities: self.extra_seasonalities.clone(),
            seasonalities,
            holiday_names,
            country_holidays: self.country.clone(),
            changepoints: self
                .state
                .as_ref()
                .map(|s| s.changepoints.clone())
                .unwrap_or_default(),
            fitted: self.state.is_some(),
        }
    }

    fn is_fitted(&self) -> bool {
        self.state.is_some()
    }
}
