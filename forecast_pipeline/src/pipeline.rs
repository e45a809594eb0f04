//! End-to-end forecasting pipeline
//!
//! Runs configure, augment, fit, forecast and present in that order. Any
//! failing step aborts the run and its error is returned as is.

use crate::config::ModelConfig;
use crate::data::ObservationSeries;
use crate::engine::ForecastEngine;
use crate::error::Result;
use crate::forecast::Forecast;
use crate::frequency::Frequency;
use crate::handle::{AugmentOptions, ModelHandle};
use crate::presenter::Presenter;
use tracing::{debug, info};

/// Builder for one forecasting run
#[derive(Debug, Clone)]
pub struct ForecastPipeline<E: ForecastEngine> {
    engine: E,
    config: ModelConfig,
    augment: AugmentOptions,
    horizon: usize,
    frequency: Frequency,
}

impl<E: ForecastEngine> ForecastPipeline<E> {
    /// Defaults to a 365 step daily horizon and no augmentation
    pub fn new(engine: E, config: ModelConfig) -> Self {
        Self {
            engine,
            config,
            augment: AugmentOptions::none(),
            horizon: 365,
            frequency: Frequency::Daily,
        }
    }

    pub fn augment(mut self, options: AugmentOptions) -> Self {
        self.augment = options;
        self
    }

    pub fn horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Fit `series`, forecast the horizon and hand the result to `presenter`
    pub fn run<P: Presenter + ?Sized>(
        &self,
        series: &ObservationSeries,
        presenter: &mut P,
    ) -> Result<Forecast> {
        info!(
            engine = self.engine.name(),
            observations = series.len(),
            horizon = self.horizon,
            frequency = ?self.frequency,
            "starting forecast pipeline"
        );

        let mut handle = ModelHandle::configure(&self.engine, &self.config)?;
        if self.augment.is_empty() {
            debug!("no augmentation requested");
        } else {
            handle = handle.augment(&self.augment)?;
        }

        let fitted = handle.fit(series)?;
        let forecast = fitted.forecast(self.horizon, self.frequency)?;
        debug!(rows = forecast.len(), "forecast produced");

        presenter.present(&forecast)?;
        info!(rows = forecast.len(), "forecast pipeline finished");
        Ok(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::BaselineEngine;
    use crate::error::ForecastError;
    use crate::presenter::NoopPresenter;
    use crate::utils::parse_timestamp;
    use chrono::Duration;

    struct CountingPresenter {
        calls: usize,
    }

    impl Presenter for CountingPresenter {
        fn present(&mut self, _forecast: &Forecast) -> Result<()> {
            self.calls += 1;
            Ok(())
        }
    }

    fn series(days: usize) -> ObservationSeries {
        let start = parse_timestamp("2023-06-01").unwrap();
        let ts = (0..days).map(|i| start + Duration::days(i as i64)).collect();
        ObservationSeries::new(ts, (0..days).map(|i| 100.0 + i as f64).collect()).unwrap()
    }

    #[test]
    fn test_run_presents_once() {
        let mut presenter = CountingPresenter { calls: 0 };
        let forecast = ForecastPipeline::new(BaselineEngine, ModelConfig::new())
            .horizon(10)
            .run(&series(30), &mut presenter)
            .unwrap();

        assert_eq!(forecast.len(), 40);
        assert_eq!(presenter.calls, 1);
    }

    #[test]
    fn test_failure_skips_presenter() {
        let mut presenter = CountingPresenter { calls: 0 };
        let result = ForecastPipeline::new(BaselineEngine, ModelConfig::new())
            .run(&series(0), &mut presenter);

        assert!(matches!(result, Err(ForecastError::DataError(_))));
        assert_eq!(presenter.calls, 0);
    }

    #[test]
    fn test_monthly_frequency() {
        let forecast = ForecastPipeline::new(BaselineEngine, ModelConfig::new())
            .horizon(3)
            .frequency(Frequency::Monthly)
            .run(&series(30), &mut NoopPresenter)
            .unwrap();

        let horizon = forecast.horizon();
        assert_eq!(horizon.len(), 3);
        assert_eq!(horizon[0].ds, parse_timestamp("2023-07-30").unwrap());
        assert_eq!(horizon[2].ds, parse_timestamp("2023-09-30").unwrap());
    }
}
