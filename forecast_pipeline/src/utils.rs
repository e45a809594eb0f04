//! Utility functions for the forecast_pipeline crate

use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Parse a timestamp written as a date or a date-time
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(midnight)
        .map_err(|_| ForecastError::DataError(format!("Invalid date format: {}", s)))
}

/// Midnight at the start of `date`
pub fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::default())
}

/// Fractional days from `origin` to `ts`
pub fn days_since(origin: NaiveDateTime, ts: NaiveDateTime) -> f64 {
    (ts - origin).num_seconds() as f64 / SECONDS_PER_DAY
}

fn epoch() -> NaiveDateTime {
    // NaiveDate defaults to 1970-01-01
    midnight(NaiveDate::default())
}

/// Milliseconds since the Unix epoch
pub fn to_epoch_millis(ts: NaiveDateTime) -> i64 {
    (ts - epoch()).num_milliseconds()
}

/// Inverse of [`to_epoch_millis`]
pub fn from_epoch_millis(ms: i64) -> NaiveDateTime {
    epoch() + Duration::milliseconds(ms)
}
