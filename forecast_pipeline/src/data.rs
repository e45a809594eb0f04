//! Observation series handling for forecasting

use crate::error::{ForecastError, Result};
use crate::utils::{from_epoch_millis, parse_timestamp, to_epoch_millis};
use chrono::NaiveDateTime;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Ordered (timestamp, value) observations, optionally with a saturation cap
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSeries {
    timestamps: Vec<NaiveDateTime>,
    values: Vec<f64>,
    cap: Option<Vec<f64>>,
}

impl ObservationSeries {
    /// Create a series from parallel timestamp and value columns
    pub fn new(timestamps: Vec<NaiveDateTime>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::DataError(format!(
                "Timestamps length ({}) doesn't match values length ({})",
                timestamps.len(),
                values.len()
            )));
        }

        Ok(Self {
            timestamps,
            values,
            cap: None,
        })
    }

    /// Create a series from date strings such as `2023-01-01`
    pub fn from_strings(dates: &[&str], values: Vec<f64>) -> Result<Self> {
        let timestamps = dates
            .iter()
            .map(|s| parse_timestamp(s))
            .collect::<Result<Vec<_>>>()?;
        Self::new(timestamps, values)
    }

    /// Attach a saturation cap column, needed for logistic growth
    pub fn with_cap(mut self, cap: Vec<f64>) -> Result<Self> {
        if cap.len() != self.values.len() {
            return Err(ForecastError::DataError(format!(
                "Cap length ({}) doesn't match values length ({})",
                cap.len(),
                self.values.len()
            )));
        }
        self.cap = Some(cap);
        Ok(self)
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn cap(&self) -> Option<&[f64]> {
        self.cap.as_deref()
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamps.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamps.last().copied()
    }

    /// Observations whose timestamp satisfies `keep`, in order
    pub fn filter<F>(&self, keep: F) -> Self
    where
        F: Fn(NaiveDateTime) -> bool,
    {
        let indices: Vec<usize> = (0..self.len())
            .filter(|&i| keep(self.timestamps[i]))
            .collect();

        Self {
            timestamps: indices.iter().map(|&i| self.timestamps[i]).collect(),
            values: indices.iter().map(|&i| self.values[i]).collect(),
            cap: self
                .cap
                .as_ref()
                .map(|cap| indices.iter().map(|&i| cap[i]).collect()),
        }
    }

    /// Convert to a DataFrame with `ds`, `y` and, when present, `cap` columns
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let millis: Vec<i64> = self.timestamps.iter().map(|ts| to_epoch_millis(*ts)).collect();
        let ds = Series::new("ds", millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

        let mut columns = vec![ds, Series::new("y", self.values.clone())];
        if let Some(cap) = &self.cap {
            columns.push(Series::new("cap", cap.clone()));
        }

        Ok(DataFrame::new(columns)?)
    }
}

/// Loader for observation series stored as tables
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a series from a CSV file with `ds`, `y` and optional `cap` columns
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<ObservationSeries> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(&df)
    }

    /// Build a series from a DataFrame with `ds`, `y` and optional `cap` columns.
    ///
    /// Rows with a missing `y` are dropped.
    pub fn from_dataframe(df: &DataFrame) -> Result<ObservationSeries> {
        let timestamps = Self::timestamp_column(df, "ds")?;
        let values = Self::float_column(df, "y")?;
        let cap = match df.column("cap") {
            Ok(_) => Some(Self::float_column(df, "cap")?),
            Err(_) => None,
        };

        let mut ds = Vec::with_capacity(timestamps.len());
        let mut y = Vec::with_capacity(values.len());
        let mut caps = Vec::new();

        for (i, (ts, value)) in timestamps.into_iter().zip(values).enumerate() {
            let Some(value) = value else { continue };
            let ts = ts.ok_or_else(|| {
                ForecastError::DataError(format!("Missing timestamp in row {}", i))
            })?;
            ds.push(ts);
            y.push(value);
            if let Some(cap) = &cap {
                caps.push(cap[i].ok_or_else(|| {
                    ForecastError::DataError(format!("Missing cap in row {}", i))
                })?);
            }
        }

        let series = ObservationSeries::new(ds, y)?;
        match cap {
            Some(_) => series.with_cap(caps),
            None => Ok(series),
        }
    }

    pub(crate) fn timestamp_column(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDateTime>>> {
        let col = df.column(name).map_err(|e| {
            ForecastError::DataError(format!("Column '{}' not found: {}", name, e))
        })?;

        match col.dtype() {
            DataType::Utf8 => col
                .utf8()?
                .into_iter()
                .map(|opt| opt.map(parse_timestamp).transpose())
                .collect(),
            DataType::Date | DataType::Datetime(_, _) => {
                let millis = col
                    .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
                    .cast(&DataType::Int64)?;
                Ok(millis
                    .i64()?
                    .into_iter()
                    .map(|opt| opt.map(from_epoch_millis))
                    .collect())
            }
            other => Err(ForecastError::DataError(format!(
                "Column '{}' has type {} which is not a timestamp",
                name, other
            ))),
        }
    }

    fn float_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
        let col = df.column(name).map_err(|e| {
            ForecastError::DataError(format!("Column '{}' not found: {}", name, e))
        })?;

        if !col.dtype().is_numeric() {
            return Err(ForecastError::DataError(format!(
                "Column '{}' cannot be converted to f64",
                name
            )));
        }

        let floats = col.cast(&DataType::Float64)?;
        let values = floats.f64()?.into_iter().collect();
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ObservationSeries {
        ObservationSeries::from_strings(
            &["2023-01-01", "2023-01-02", "2023-01-03", "2023-01-04"],
            vec![1.0, 2.0, 3.0, 4.0],
        )
        .unwrap()
    }

    #[test]
    fn test_length_mismatch() {
        let result = ObservationSeries::from_strings(&["2023-01-01"], vec![1.0, 2.0]);
        assert!(matches!(result, Err(ForecastError::DataError(_))));

        let result = sample().with_cap(vec![10.0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_filter_keeps_cap_aligned() {
        let series = sample().with_cap(vec![10.0, 20.0, 30.0, 40.0]).unwrap();
        let cutoff = parse_timestamp("2023-01-02").unwrap();
        let head = series.filter(|ts| ts <= cutoff);

        assert_eq!(head.len(), 2);
        assert_eq!(head.values(), &[1.0, 2.0]);
        assert_eq!(head.cap(), Some(&[10.0, 20.0][..]));
        assert_eq!(head.last_timestamp(), Some(cutoff));
    }

    #[test]
    fn test_dataframe_roundtrip() {
        let series = sample().with_cap(vec![5.0; 4]).unwrap();
        let df = series.to_dataframe().unwrap();

        assert_eq!(df.height(), 4);
        assert_eq!(df.width(), 3);

        let loaded = DataLoader::from_dataframe(&df).unwrap();
        assert_eq!(loaded, series);
    }

    #[test]
    fn test_missing_values_are_dropped() {
        let df = DataFrame::new(vec![
            Series::new("ds", &["2023-01-01", "2023-01-02", "2023-01-03"]),
            Series::new("y", &[Some(1.0), None, Some(3.0)]),
        ])
        .unwrap();

        let series = DataLoader::from_dataframe(&df).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.values(), &[1.0, 3.0]);
    }

    #[test]
    fn test_missing_column() {
        let df = DataFrame::new(vec![Series::new("date", &["2023-01-01"])]).unwrap();
        assert!(DataLoader::from_dataframe(&df).is_err());
    }
}
