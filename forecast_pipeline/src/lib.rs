//! # Forecast Pipeline
//!
//! Configure, augment, fit and forecast seasonal time series models through a
//! typed pipeline.
//!
//! ## Features
//!
//! - Declarative model configuration (growth, changepoints, seasonality toggles and mode)
//! - Holiday calendars, regional holiday sets and extra named seasonalities
//! - A typestate [`ModelHandle`] that only forecasts once fitted
//! - Forecasts over history and horizon with prediction intervals
//! - CSV and text chart presenters
//! - Rolling-origin cross-validation and error metrics
//!
//! Estimation happens behind the [`ForecastEngine`] trait. [`BaselineEngine`]
//! is the bundled implementation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use forecast_pipeline::{
//!     AugmentOptions, BaselineEngine, DataLoader, ForecastPipeline, Frequency, HolidayCalendar,
//!     ModelConfig, TextChartPresenter,
//! };
//!
//! # fn main() -> forecast_pipeline::error::Result<()> {
//! let series = DataLoader::from_csv("visits.csv")?;
//! let config = ModelConfig::from_json_file("model.json")?;
//!
//! let forecast = ForecastPipeline::new(BaselineEngine, config)
//!     .augment(AugmentOptions::with_calendar(HolidayCalendar::new()))
//!     .horizon(365)
//!     .frequency(Frequency::Daily)
//!     .run(&series, &mut TextChartPresenter::new(std::io::stdout()))?;
//!
//! println!("{} rows", forecast.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod frequency;
pub mod handle;
pub mod holidays;
pub mod pipeline;
pub mod presenter;
pub mod utils;

// Re-export commonly used types
pub use crate::config::{Growth, ModelConfig, Seasonality, SeasonalityMode, SeasonalityOption};
pub use crate::data::{DataLoader, ObservationSeries};
pub use crate::diagnostics::{
    cross_validation, performance_metrics, CrossValidationOptions, CrossValidationRow,
    PerformanceMetrics,
};
pub use crate::engine::{BaselineEngine, ForecastEngine, ForecastModel, ModelParams};
pub use crate::error::ForecastError;
pub use crate::forecast::{Forecast, ForecastRow};
pub use crate::frequency::Frequency;
pub use crate::handle::{AugmentOptions, Configured, Fitted, ModelHandle};
pub use crate::holidays::HolidayCalendar;
pub use crate::pipeline::ForecastPipeline;
pub use crate::presenter::{CsvPresenter, NoopPresenter, Presenter, TextChartPresenter};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
