//! Forecast presentation
//!
//! The last pipeline step hands the finished [`Forecast`] to a [`Presenter`].

use crate::error::{ForecastError, Result};
use crate::forecast::{Forecast, FORECAST_COLUMNS};
use std::io::Write;
use std::path::Path;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders a forecast somewhere
pub trait Presenter {
    fn present(&mut self, forecast: &Forecast) -> Result<()>;
}

/// Discards the forecast
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPresenter;

impl Presenter for NoopPresenter {
    fn present(&mut self, _forecast: &Forecast) -> Result<()> {
        Ok(())
    }
}

/// Writes the forecast table as CSV
pub struct CsvPresenter<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvPresenter<std::fs::File> {
    pub fn to_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            writer: csv::Writer::from_path(path)?,
        })
    }
}

impl<W: Write> CsvPresenter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
        }
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| ForecastError::IoError(e.into_error()))
    }
}

impl<W: Write> Presenter for CsvPresenter<W> {
    fn present(&mut self, forecast: &Forecast) -> Result<()> {
        self.writer.write_record(FORECAST_COLUMNS)?;
        for row in forecast.rows() {
            self.writer.write_record([
                row.ds.format(TIMESTAMP_FORMAT).to_string(),
                format!("{:.6}", row.yhat),
                format!("{:.6}", row.yhat_lower),
                format!("{:.6}", row.yhat_upper),
                format!("{:.6}", row.trend),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Plots the forecast as text.
///
/// Each column is one sampled row: `*` marks a fitted history value, `o` a
/// future value and `:` the prediction interval around it.
pub struct TextChartPresenter<W: Write> {
    out: W,
    width: usize,
    height: usize,
}

impl<W: Write> TextChartPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            width: 72,
            height: 16,
        }
    }

    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width.max(1);
        self.height = height.max(2);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn level(&self, value: f64, low: f64, high: f64) -> usize {
        if high <= low {
            return 0;
        }
        let scaled = (value - low) / (high - low) * (self.height - 1) as f64;
        (scaled.round().max(0.0) as usize).min(self.height - 1)
    }
}

impl<W: Write> Presenter for TextChartPresenter<W> {
    fn present(&mut self, forecast: &Forecast) -> Result<()> {
        if forecast.is_empty() {
            writeln!(self.out, "(empty forecast)")?;
            return Ok(());
        }

        let rows = forecast.rows();
        let columns = self.width.min(rows.len());
        let sampled: Vec<usize> = (0..columns).map(|c| c * rows.len() / columns).collect();

        let low = rows.iter().map(|r| r.yhat_lower).fold(f64::INFINITY, f64::min);
        let high = rows.iter().map(|r| r.yhat_upper).fold(f64::NEG_INFINITY, f64::max);

        let mut grid = vec![vec![' '; columns]; self.height];
        for (c, &i) in sampled.iter().enumerate() {
            let row = &rows[i];
            let lower = self.level(row.yhat_lower, low, high);
            let upper = self.level(row.yhat_upper, low, high);
            for line in grid.iter_mut().take(upper + 1).skip(lower) {
                line[c] = ':';
            }
            let marker = if i < forecast.history_len() { '*' } else { 'o' };
            grid[self.level(row.yhat, low, high)][c] = marker;
        }

        writeln!(self.out, "{:>12.3} +", high)?;
        for line in grid.iter().rev() {
            writeln!(self.out, "{:>12} |{}", "", line.iter().collect::<String>())?;
        }
        writeln!(self.out, "{:>12.3} +{}", low, "-".repeat(columns))?;
        writeln!(
            self.out,
            "{:>12}  {} .. {}",
            "",
            rows[0].ds.format(TIMESTAMP_FORMAT),
            rows[rows.len() - 1].ds.format(TIMESTAMP_FORMAT)
        )?;
        self.out.flush()?;
        Ok(())
    }
}
