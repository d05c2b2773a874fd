/// Service configuration
///
/// Loaded from a TOML file (`envmon.toml` by default) with every table
/// optional. Values from the environment (including a `.env` file) override
/// the file for the prediction endpoint and its credential:
///
///   ML_ENDPOINT : scoring endpoint URL
///   ML_API_KEY  : bearer credential attached to prediction requests

use std::fs;
use std::path::Path;

use chrono::TimeDelta;
use serde::Deserialize;

use crate::analysis::LagWindows;
use crate::logging::LogLevel;
use crate::model::PipelineError;

pub const DEFAULT_CONFIG_PATH: &str = "envmon.toml";

pub const ENV_ENDPOINT: &str = "ML_ENDPOINT";
pub const ENV_API_KEY: &str = "ML_API_KEY";

/// Upper bound on any alignment window, in minutes (30 days).
pub const MAX_WINDOW_MINUTES: i64 = 30 * 24 * 60;

// ---------------------------------------------------------------------------
// Config tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub prediction: PredictionConfig,
    pub alignment: AlignmentConfig,
    pub simulation: SimulationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Scoring endpoint, e.g. "http://localhost:5000/score".
    pub endpoint: String,
    /// Health endpoint. Derived from `endpoint` when it ends in `/score`.
    pub health_endpoint: Option<String>,
    pub api_key: Option<String>,
    /// Request timeout; unset means wait for the service indefinitely.
    pub timeout_secs: Option<u64>,
}

impl PredictionConfig {
    pub fn health_url(&self) -> Option<String> {
        if let Some(url) = &self.health_endpoint {
            return Some(url.clone());
        }
        self.endpoint
            .trim_end_matches('/')
            .strip_suffix("/score")
            .map(|base| format!("{}/health", base))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    pub lag1_max_gap_minutes: i64,
    pub lag24_target_hours: i64,
    pub lag24_tolerance_minutes: i64,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            lag1_max_gap_minutes: 120,
            lag24_target_hours: 24,
            lag24_tolerance_minutes: 120,
        }
    }
}

impl AlignmentConfig {
    pub fn windows(&self) -> Result<LagWindows, PipelineError> {
        let out_of_range = |key: &str| PipelineError::Config(format!("alignment.{} is out of range", key));
        Ok(LagWindows {
            lag1_max_gap: TimeDelta::try_minutes(self.lag1_max_gap_minutes)
                .ok_or_else(|| out_of_range("lag1_max_gap_minutes"))?,
            lag24_target: TimeDelta::try_hours(self.lag24_target_hours)
                .ok_or_else(|| out_of_range("lag24_target_hours"))?,
            lag24_tolerance: TimeDelta::try_minutes(self.lag24_tolerance_minutes)
                .ok_or_else(|| out_of_range("lag24_tolerance_minutes"))?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Days of hourly history to generate per station.
    pub days: u32,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { days: 7, seed: None }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

impl LoggingConfig {
    pub fn min_level(&self) -> Result<LogLevel, PipelineError> {
        self.level.parse().map_err(PipelineError::Config)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl ServiceConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, PipelineError> {
        let config: ServiceConfig = toml::from_str(text).map_err(|e| PipelineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let text = fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Load `path` if it exists, otherwise start from defaults. In both cases
    /// `.env` and the process environment are applied on top.
    pub fn load_with_env(path: &Path) -> Result<Self, PipelineError> {
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            Self::default()
        };

        dotenv::dotenv().ok();
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override file values with environment values supplied by `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|v| !v.trim().is_empty()) {
            self.prediction.endpoint = endpoint;
        }
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
            self.prediction.api_key = Some(key);
        }
    }

    fn validate(&self) -> Result<(), PipelineError> {
        let a = &self.alignment;
        if a.lag1_max_gap_minutes <= 0 {
            return Err(PipelineError::Config(
                "alignment.lag1_max_gap_minutes must be positive".to_string(),
            ));
        }
        if a.lag24_target_hours <= 0 || a.lag24_tolerance_minutes < 0 {
            return Err(PipelineError::Config(
                "alignment lag-24 window must have a positive target and non-negative tolerance".to_string(),
            ));
        }
        let too_wide = a.lag1_max_gap_minutes > MAX_WINDOW_MINUTES
            || a.lag24_target_hours > MAX_WINDOW_MINUTES / 60
            || a.lag24_tolerance_minutes > MAX_WINDOW_MINUTES;
        if too_wide {
            return Err(PipelineError::Config(format!(
                "alignment windows may not exceed {} days",
                MAX_WINDOW_MINUTES / (24 * 60)
            )));
        }
        a.windows()?;
        self.logging.min_level()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
