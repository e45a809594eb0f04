//! Step frequencies used to extend a timestamp series into the future

use crate::error::{ForecastError, Result};
use chrono::{Duration, Months, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Spacing between consecutive future timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Minute,
    Hourly,
    Daily,
    Weekly,
    /// Calendar months; day-of-month is clamped at month end
    Monthly,
    Yearly,
}

/// Case-insensitive names and pandas-style offset aliases:
///
/// | Frequency | Accepted |
/// |---|---|
/// | Minute | `minute`, `min`, `1min` |
/// | Hourly | `hourly`, `h`, `1h` |
/// | Daily | `daily`, `d`, `1d` |
/// | Weekly | `weekly`, `w`, `1w` |
/// | Monthly | `monthly`, `ms` |
/// | Yearly | `yearly`, `y`, `a`, `1y` |
///
/// A bare `m` is rejected because it reads as both minute and month.
impl FromStr for Frequency {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "minute" | "min" | "1min" => Ok(Frequency::Minute),
            "hourly" | "h" | "1h" => Ok(Frequency::Hourly),
            "daily" | "d" | "1d" => Ok(Frequency::Daily),
            "weekly" | "w" | "1w" => Ok(Frequency::Weekly),
            "monthly" | "ms" => Ok(Frequency::Monthly),
            "yearly" | "y" | "a" | "1y" => Ok(Frequency::Yearly),
            _ => Err(ForecastError::InvalidParameter(format!(
                "Unsupported frequency: {}",
                s
            ))),
        }
    }
}

impl Frequency {
    /// The timestamp `steps` periods after `start`
    pub fn advance(self, start: NaiveDateTime, steps: u32) -> Result<NaiveDateTime> {
        let shifted = match self {
            Frequency::Minute => start.checked_add_signed(Duration::minutes(steps as i64)),
            Frequency::Hourly => start.checked_add_signed(Duration::hours(steps as i64)),
            Frequency::Daily => start.checked_add_signed(Duration::days(steps as i64)),
            Frequency::Weekly => start.checked_add_signed(Duration::weeks(steps as i64)),
            Frequency::Monthly => start.checked_add_months(Months::new(steps)),
            Frequency::Yearly => steps
                .checked_mul(12)
                .and_then(|months| start.checked_add_months(Months::new(months))),
        };

        shifted.ok_or_else(|| {
            ForecastError::InvalidParameter(format!(
                "{} steps of {:?} after {} is out of range",
                steps, self, start
            ))
        })
    }
}

/// Create `horizon` timestamps following `last_timestamp`
pub fn future_timestamps(
    last_timestamp: NaiveDateTime,
    horizon: usize,
    frequency: Frequency,
) -> Result<Vec<NaiveDateTime>> {
    let horizon = u32::try_from(horizon).map_err(|_| {
        ForecastError::InvalidParameter(format!("Horizon too large: {}", horizon))
    })?;

    // Reject an unreachable end before generating anything
    if horizon > 0 {
        frequency.advance(last_timestamp, horizon)?;
    }

    // Offsets are taken from the last timestamp so month-end clamping never accumulates
    (1..=horizon)
        .map(|step| frequency.advance(last_timestamp, step))
        .collect()
}
