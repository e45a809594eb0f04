use forecast_pipeline::utils::parse_timestamp;
use forecast_pipeline::{
    BaselineEngine, DataLoader, ForecastError, ForecastPipeline, Growth, HolidayCalendar, ModelConfig,
    NoopPresenter, SeasonalityOption, TextChartPresenter,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_csv(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

#[test]
fn test_load_series_from_csv() {
    let file = write_csv(&[
        "ds,y",
        "2023-01-01,10.5",
        "2023-01-02,11.0",
        "2023-01-03,",
        "2023-01-04,12.25",
    ]);

    let series = DataLoader::from_csv(file.path()).unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series.values(), &[10.5, 11.0, 12.25]);
    assert_eq!(
        series.last_timestamp(),
        Some(parse_timestamp("2023-01-04").unwrap())
    );
    assert!(series.cap().is_none());
}

#[test]
fn test_load_series_with_cap_and_fit_logistic() {
    let mut lines = vec!["ds,y,cap".to_string()];
    for day in 1..=28 {
        lines.push(format!("2023-02-{:02},{},50", day, 10 + day));
    }
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let file = write_csv(&refs);

    let series = DataLoader::from_csv(file.path()).unwrap();
    assert_eq!(series.cap().map(|c| c.len()), Some(28));

    let config = ModelConfig::new()
        .with_growth(Growth::Logistic)
        .with_weekly_seasonality(SeasonalityOption::Disabled);
    let forecast = ForecastPipeline::new(BaselineEngine, config)
        .horizon(60)
        .run(&series, &mut NoopPresenter)
        .unwrap();

    assert!(forecast.horizon().iter().all(|r| r.trend < 50.0));
}

#[test]
fn test_missing_csv_is_io_error() {
    let result = DataLoader::from_csv("/nonexistent/series.csv");
    assert!(matches!(result, Err(ForecastError::IoError(_))));
}

#[test]
fn test_config_from_json_file() {
    let file = write_csv(&[
        r#"{"growth": "logistic", "changepoint_range": 0.9, "weekly_seasonality": "true", "seasonality_mode": "multiplicative"}"#,
    ]);

    let config = ModelConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.growth, Growth::Logistic);
    assert_eq!(config.changepoint_range, 0.9);
    assert_eq!(config.weekly_seasonality, SeasonalityOption::Enabled);
    assert_eq!(config.n_changepoints, 25);
}

#[test]
fn test_holidays_from_dataframe() {
    let df = DataFrame::new(vec![
        Series::new("ds", &["2023-11-24", "2024-11-29"]),
        Series::new("holiday", &["black_friday", "black_friday"]),
    ])
    .unwrap();

    let calendar = HolidayCalendar::from_dataframe(&df).unwrap().with_window(0, 3);
    assert_eq!(calendar.labels(), vec!["black_friday".to_string()]);
    assert_eq!(calendar.window(), (0, 3));
}

#[test]
fn test_text_chart_output() {
    let file = write_csv(&[
        "ds,y",
        "2023-01-01,1",
        "2023-01-02,2",
        "2023-01-03,3",
        "2023-01-04,4",
    ]);
    let series = DataLoader::from_csv(file.path()).unwrap();

    let mut presenter = TextChartPresenter::new(Vec::new()).with_size(20, 6);
    ForecastPipeline::new(BaselineEngine, ModelConfig::new())
        .horizon(2)
        .run(&series, &mut presenter)
        .unwrap();

    let chart = String::from_utf8(presenter.into_inner()).unwrap();
    assert_eq!(chart.matches('*').count(), 4);
    assert_eq!(chart.matches('o').count(), 2);
}
