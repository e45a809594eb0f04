//! # Forecast Pipeline Workspace
//!
//! Umbrella crate for the workspace members:
//!
//! - [`forecast_pipeline`]: configure, augment, fit and forecast through a typed pipeline
//! - [`trend_math`]: numeric kernels behind the bundled baseline engine
//!
//! ## Example
//!
//! ```
//! use forecast_pipeline_workspace::forecast_pipeline::{
//!     BaselineEngine, ForecastPipeline, ModelConfig, NoopPresenter, ObservationSeries,
//! };
//!
//! let series = ObservationSeries::from_strings(
//!     &["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04"],
//!     vec![1.0, 2.0, 3.0, 4.0],
//! )
//! .unwrap();
//!
//! let forecast = ForecastPipeline::new(BaselineEngine, ModelConfig::default())
//!     .horizon(3)
//!     .run(&series, &mut NoopPresenter)
//!     .unwrap();
//! assert_eq!(forecast.len(), 7);
//! ```

pub use forecast_pipeline;
pub use trend_math;

/// Names of the workspace member crates
pub fn member_crates() -> [&'static str; 2] {
    [forecast_pipeline::NAME, "trend_math"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_crates() {
        assert_eq!(member_crates(), ["forecast_pipeline", "trend_math"]);
    }
}
