use chrono::Duration;
use forecast_pipeline::utils::parse_timestamp;
use forecast_pipeline::{
    cross_validation, performance_metrics, AugmentOptions, BaselineEngine,
    CrossValidationOptions, ModelConfig, ObservationSeries, SeasonalityMode,
};
use tracing_subscriber::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forecast_pipeline=debug".into()),
        )
        .init();

    let start = parse_timestamp("2023-01-01")?;
    let timestamps = (0..400).map(|i| start + Duration::days(i)).collect();
    let values = (0..400)
        .map(|i| {
            let weekday_boost = if i % 7 < 5 { 1.2 } else { 0.8 };
            (100.0 + 0.25 * i as f64) * weekday_boost
        })
        .collect();
    let series = ObservationSeries::new(timestamps, values)?;

    let options = CrossValidationOptions::from_horizon(Duration::days(30));
    for mode in [SeasonalityMode::Additive, SeasonalityMode::Multiplicative] {
        let config = ModelConfig::new().with_seasonality_mode(mode);
        let rows = cross_validation(
            &BaselineEngine,
            &config,
            &AugmentOptions::none(),
            &series,
            &options,
        )?;
        let metrics = performance_metrics(&rows)?;

        println!("{:?} seasonality over {} predictions:", mode, rows.len());
        println!("  RMSE:     {:.4}", metrics.rmse);
        println!("  MAE:      {:.4}", metrics.mae);
        println!("  MAPE:     {:.4}", metrics.mape);
        println!("  SMAPE:    {:.4}", metrics.smape);
        println!("  Coverage: {:.2}", metrics.coverage);
    }

    Ok(())
}
