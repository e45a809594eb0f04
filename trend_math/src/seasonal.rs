//! Phase-bucket seasonal profiles
//!
//! A profile splits one period into equal-width buckets and stores the mean
//! residual observed in each bucket. Buckets that saw no observation
//! contribute zero.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseProfile {
    period: f64,
    means: Vec<f64>,
}

impl PhaseProfile {
    /// Fit a profile of `buckets` buckets over `period` (same unit as `t`)
    pub fn fit(t: &[f64], residuals: &[f64], period: f64, buckets: usize) -> Result<Self> {
        if t.len() != residuals.len() {
            return Err(MathError::InvalidInput(format!(
                "t length ({}) doesn't match residuals length ({})",
                t.len(),
                residuals.len()
            )));
        }
        if period <= 0.0 || !period.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "Period must be positive and finite, got {}",
                period
            )));
        }
        if buckets == 0 {
            return Err(MathError::InvalidInput(
                "Bucket count must be at least 1".to_string(),
            ));
        }

        let mut sums = vec![0.0; buckets];
        let mut counts = vec![0usize; buckets];

        for (&ti, &r) in t.iter().zip(residuals.iter()) {
            let idx = bucket_index(ti, period, buckets);
            sums[idx] += r;
            counts[idx] += 1;
        }

        let means = sums
            .iter()
            .zip(counts.iter())
            .map(|(&s, &c)| if c > 0 { s / c as f64 } else { 0.0 })
            .collect();

        Ok(Self { period, means })
    }

    /// Seasonal effect at time `t`
    pub fn value_at(&self, t: f64) -> f64 {
        self.means[bucket_index(t, self.period, self.means.len())]
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn buckets(&self) -> &[f64] {
        &self.means
    }
}

fn bucket_index(t: f64, period: f64, buckets: usize) -> usize {
    let scaled = t.rem_euclid(period) * buckets as f64 / period;
    (scaled.floor() as usize).min(buckets - 1)
}
