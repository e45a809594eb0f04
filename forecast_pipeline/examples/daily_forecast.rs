use chrono::Duration;
use forecast_pipeline::utils::parse_timestamp;
use forecast_pipeline::{
    AugmentOptions, BaselineEngine, DataLoader, ForecastPipeline, Frequency, HolidayCalendar,
    ModelConfig, ObservationSeries, TextChartPresenter,
};
use std::env;
use std::f64::consts::PI;
use tracing_subscriber::prelude::*;

// Two years of synthetic daily visits with weekly and yearly cycles
fn synthetic_series() -> Result<ObservationSeries, Box<dyn std::error::Error>> {
    let start = parse_timestamp("2022-01-01")?;
    let timestamps = (0..730).map(|i| start + Duration::days(i)).collect();
    let values = (0..730)
        .map(|i| {
            let t = i as f64;
            500.0 + 0.4 * t + 40.0 * (2.0 * PI * t / 7.0).sin() + 80.0 * (2.0 * PI * t / 365.25).cos()
        })
        .collect();
    Ok(ObservationSeries::new(timestamps, values)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forecast_pipeline=info".into()),
        )
        .init();

    // Usage: daily_forecast [series.csv] [config.json]
    let args: Vec<String> = env::args().collect();
    let series = match args.get(1) {
        Some(path) => {
            println!("Loading data from: {}", path);
            DataLoader::from_csv(path)?
        }
        None => synthetic_series()?,
    };
    let config = match args.get(2) {
        Some(path) => ModelConfig::from_json_file(path)?,
        None => ModelConfig::default(),
    };
    println!("Loaded {} observations", series.len());

    let calendar = HolidayCalendar::new()
        .with_holiday(parse_timestamp("2022-02-13")?.date(), "superbowl")
        .with_holiday(parse_timestamp("2023-02-12")?.date(), "superbowl")
        .with_holiday(parse_timestamp("2024-02-11")?.date(), "superbowl");

    let forecast = ForecastPipeline::new(BaselineEngine, config)
        .augment(AugmentOptions::with_calendar(calendar))
        .horizon(365)
        .frequency(Frequency::Daily)
        .run(&series, &mut TextChartPresenter::new(std::io::stdout()))?;

    println!("Next 7 days:");
    for row in forecast.horizon().iter().take(7) {
        println!(
            "{}: {:.2} [{:.2}, {:.2}]",
            row.ds.date(),
            row.yhat,
            row.yhat_lower,
            row.yhat_upper
        );
    }

    Ok(())
}
