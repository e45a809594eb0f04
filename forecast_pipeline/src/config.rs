//! Declarative model configuration
//!
//! `ModelConfig` is the whole configuration surface of the pipeline. It is a
//! plain record: nothing here checks that values make sense together, that is
//! left to the engine that receives it.

use crate::error::{ForecastError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Functional family of the long-term trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Growth {
    #[default]
    Linear,
    /// Saturating growth; requires a `cap` column on the observations
    Logistic,
    Flat,
}

impl FromStr for Growth {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(Growth::Linear),
            "logistic" => Ok(Growth::Logistic),
            "flat" => Ok(Growth::Flat),
            _ => Err(ForecastError::InvalidParameter(format!(
                "growth must be 'linear', 'logistic', or 'flat', got '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for Growth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Growth::Linear => write!(f, "linear"),
            Growth::Logistic => write!(f, "logistic"),
            Growth::Flat => write!(f, "flat"),
        }
    }
}

/// Whether a built-in seasonality is fitted, and with how many Fourier terms.
///
/// In JSON this takes a name (`"auto"`, `"enabled"`, `"disabled"`), a boolean
/// or a positive integer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "RawSeasonalityOption", into = "RawSeasonalityOption")]
pub enum SeasonalityOption {
    /// Let the engine decide from the span and spacing of the history
    #[default]
    Auto,
    Enabled,
    Disabled,
    /// Enabled with this Fourier order instead of the built-in default
    Order(usize),
}

impl SeasonalityOption {
    /// The order requested explicitly, if any
    pub fn order(self) -> Option<usize> {
        match self {
            SeasonalityOption::Order(order) => Some(order),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawSeasonalityOption {
    Flag(bool),
    Order(usize),
    Name(String),
}

impl TryFrom<RawSeasonalityOption> for SeasonalityOption {
    type Error = ForecastError;

    fn try_from(raw: RawSeasonalityOption) -> Result<Self> {
        match raw {
            RawSeasonalityOption::Flag(enabled) => Ok(enabled.into()),
            RawSeasonalityOption::Order(order) => Ok(SeasonalityOption::Order(order)),
            RawSeasonalityOption::Name(name) => name.parse(),
        }
    }
}

impl From<SeasonalityOption> for RawSeasonalityOption {
    fn from(option: SeasonalityOption) -> Self {
        match option {
            SeasonalityOption::Auto => RawSeasonalityOption::Name("auto".to_string()),
            SeasonalityOption::Enabled => RawSeasonalityOption::Name("enabled".to_string()),
            SeasonalityOption::Disabled => RawSeasonalityOption::Name("disabled".to_string()),
            SeasonalityOption::Order(order) => RawSeasonalityOption::Order(order),
        }
    }
}

impl FromStr for SeasonalityOption {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(SeasonalityOption::Auto),
            "enabled" | "true" => Ok(SeasonalityOption::Enabled),
            "disabled" | "false" => Ok(SeasonalityOption::Disabled),
            other => other.parse::<usize>().map(SeasonalityOption::Order).map_err(|_| {
                ForecastError::InvalidParameter(format!(
                    "seasonality must be 'auto', 'enabled', 'disabled' or a Fourier order, got '{}'",
                    s
                ))
            }),
        }
    }
}

impl From<bool> for SeasonalityOption {
    fn from(enabled: bool) -> Self {
        if enabled {
            SeasonalityOption::Enabled
        } else {
            SeasonalityOption::Disabled
        }
    }
}

/// How seasonal effects combine with the trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalityMode {
    #[default]
    Additive,
    Multiplicative,
}

impl FromStr for SeasonalityMode {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "additive" => Ok(SeasonalityMode::Additive),
            "multiplicative" => Ok(SeasonalityMode::Multiplicative),
            _ => Err(ForecastError::InvalidParameter(format!(
                "seasonality mode must be 'additive' or 'multiplicative', got '{}'",
                s
            ))),
        }
    }
}

/// A named periodic component added on top of the built-in seasonalities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    pub name: String,
    /// Period length in days
    pub period: f64,
    pub fourier_order: usize,
    /// Falls back to the model's seasonality mode when unset
    pub mode: Option<SeasonalityMode>,
}

impl Seasonality {
    pub fn new(name: &str, period: f64, fourier_order: usize) -> Self {
        Self {
            name: name.to_string(),
            period,
            fourier_order,
            mode: None,
        }
    }

    pub fn with_mode(mut self, mode: SeasonalityMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Monthly component with period 30.5 days and order 5
    pub fn monthly() -> Self {
        Self::new("monthly", 30.5, 5)
    }
}

/// Hyperparameters handed to the engine when a model is configured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub growth: Growth,
    /// Explicit changepoint dates; overrides automatic placement when set
    pub changepoints: Option<Vec<NaiveDateTime>>,
    pub n_changepoints: usize,
    /// Fraction of the history in which automatic changepoints are placed
    pub changepoint_range: f64,
    pub yearly_seasonality: SeasonalityOption,
    pub weekly_seasonality: SeasonalityOption,
    pub daily_seasonality: SeasonalityOption,
    pub seasonality_mode: SeasonalityMode,
    /// Coverage of the uncertainty interval
    pub interval_width: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            growth: Growth::Linear,
            changepoints: None,
            n_changepoints: 25,
            changepoint_range: 0.8,
            yearly_seasonality: SeasonalityOption::Auto,
            weekly_seasonality: SeasonalityOption::Auto,
            daily_seasonality: SeasonalityOption::Auto,
            seasonality_mode: SeasonalityMode::Additive,
            interval_width: 0.8,
        }
    }
}

impl ModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_growth(mut self, growth: Growth) -> Self {
        self.growth = growth;
        self
    }

    pub fn with_changepoints(mut self, changepoints: Vec<NaiveDateTime>) -> Self {
        self.changepoints = Some(changepoints);
        self
    }

    pub fn with_n_changepoints(mut self, n: usize) -> Self {
        self.n_changepoints = n;
        self
    }

    pub fn with_changepoint_range(mut self, range: f64) -> Self {
        self.changepoint_range = range;
        self
    }

    pub fn with_yearly_seasonality(mut self, option: SeasonalityOption) -> Self {
        self.yearly_seasonality = option;
        self
    }

    pub fn with_weekly_seasonality(mut self, option: SeasonalityOption) -> Self {
        self.weekly_seasonality = option;
        self
    }

    pub fn with_daily_seasonality(mut self, option: SeasonalityOption) -> Self {
        self.daily_seasonality = option;
        self
    }

    pub fn with_seasonality_mode(mut self, mode: SeasonalityMode) -> Self {
        self.seasonality_mode = mode;
        self
    }

    pub fn with_interval_width(mut self, width: f64) -> Self {
        self.interval_width = width;
        self
    }

    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
