use chrono::{Duration, NaiveDateTime};
use forecast_pipeline::utils::parse_timestamp;
use forecast_pipeline::{
    AugmentOptions, BaselineEngine, CsvPresenter, ForecastPipeline, Frequency, HolidayCalendar,
    ModelConfig, ModelHandle, NoopPresenter, ObservationSeries, SeasonalityMode,
};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;
use std::f64::consts::PI;

// Two years of daily data: trend, weekly and yearly cycles, gaussian noise
fn two_year_series(seed: u64) -> ObservationSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 2.0).unwrap();
    let start = parse_timestamp("2021-01-01").unwrap();

    let timestamps: Vec<NaiveDateTime> = (0..730).map(|i| start + Duration::days(i)).collect();
    let values = (0..730)
        .map(|i| {
            let t = i as f64;
            200.0
                + 0.1 * t
                + 5.0 * (2.0 * PI * t / 7.0).sin()
                + 20.0 * (2.0 * PI * t / 365.25).cos()
                + rng.sample(noise)
        })
        .collect();

    ObservationSeries::new(timestamps, values).unwrap()
}

fn superbowls() -> HolidayCalendar {
    HolidayCalendar::new()
        .with_holiday(parse_timestamp("2021-02-07").unwrap().date(), "superbowl")
        .with_holiday(parse_timestamp("2022-02-13").unwrap().date(), "superbowl")
        .with_window(0, 1)
}

#[test]
fn test_two_year_daily_forecast() {
    let series = two_year_series(42);
    let forecast = ForecastPipeline::new(BaselineEngine, ModelConfig::new())
        .horizon(365)
        .frequency(Frequency::Daily)
        .run(&series, &mut NoopPresenter)
        .unwrap();

    assert_eq!(forecast.len(), 730 + 365);
    assert_eq!(forecast.history_len(), 730);
    assert_eq!(&forecast.timestamps()[..730], series.timestamps());
    assert_eq!(
        forecast.rows()[1094].ds,
        parse_timestamp("2023-12-31").unwrap()
    );

    for row in forecast.rows() {
        assert!(row.yhat.is_finite());
        assert!(row.yhat_lower <= row.yhat && row.yhat <= row.yhat_upper);
    }
}

#[test]
fn test_holidays_change_params_not_shape() {
    let series = two_year_series(1);
    let config = ModelConfig::new();

    let plain = ModelHandle::configure(&BaselineEngine, &config)
        .unwrap()
        .fit(&series)
        .unwrap();
    let with_holidays = ModelHandle::configure(&BaselineEngine, &config)
        .unwrap()
        .augment(&AugmentOptions::with_calendar(superbowls()))
        .unwrap()
        .fit(&series)
        .unwrap();

    let plain_names = plain.params().holiday_names;
    let holiday_names = with_holidays.params().holiday_names;
    assert!(plain_names.is_empty());
    assert!(holiday_names.contains(&"superbowl".to_string()));
    assert!(holiday_names.contains(&"Thanksgiving".to_string()));
    assert_ne!(plain_names, holiday_names);

    let plain = plain.forecast(30, Frequency::Daily).unwrap();
    let with_holidays = with_holidays.forecast(30, Frequency::Daily).unwrap();
    assert_eq!(plain.len(), with_holidays.len());
    assert_eq!(plain.timestamps(), with_holidays.timestamps());
}

#[test]
fn test_csv_export_after_run() {
    let series = two_year_series(3);
    let mut presenter = CsvPresenter::new(Vec::new());
    ForecastPipeline::new(
        BaselineEngine,
        ModelConfig::new().with_seasonality_mode(SeasonalityMode::Multiplicative),
    )
    .horizon(14)
    .run(&series, &mut presenter)
    .unwrap();

    let text = String::from_utf8(presenter.into_inner().unwrap()).unwrap();
    // header plus one line per row
    assert_eq!(text.lines().count(), 1 + 730 + 14);
    assert!(text.starts_with("ds,yhat,yhat_lower,yhat_upper,trend\n2021-01-01 00:00:00,"));
}

#[test]
fn test_csv_presenter_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forecast.csv");

    let mut presenter = CsvPresenter::to_path(&path).unwrap();
    let forecast = ForecastPipeline::new(BaselineEngine, ModelConfig::new())
        .horizon(5)
        .run(&two_year_series(9), &mut presenter)
        .unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written.lines().count(), forecast.len() + 1);
}
