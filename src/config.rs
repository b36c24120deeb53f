// Configuration for an ETV analysis run
//
// All fields have defaults so an empty (or absent) config file is valid.
// Command-line flags override values loaded from file.

use crate::filters::{MIN_N_DAILY_DATA, MIN_RSQUARED_DAILY_DATA};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default household timezone
pub const DEFAULT_TIMEZONE: &str = "Europe/London";

/// Default HDD base temperature (Celsius), as used for UK degree-day data
pub const DEFAULT_BASE_TEMPERATURE_C: f32 = 15.5;

/// Settings for an ETV run
///
/// # Example
/// ```
/// use etv::config::EtvConfig;
///
/// let config = EtvConfig::from_toml_str("workers = 4").unwrap();
/// assert_eq!(config.workers, 4);
/// assert_eq!(config.timezone, "Europe/London");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EtvConfig {
    /// IANA timezone in which household days run midnight to midnight
    pub timezone: String,

    /// Base temperature of the HDD data (Celsius)
    pub base_temperature_c: f32,

    /// Minimum R² for a household's unsegmented daily fit
    pub min_rsquared_daily: f32,

    /// Minimum control days and minimum normal days per household
    ///
    /// The unsegmented pre-filter requires twice this many samples.
    pub min_days_per_segment: usize,

    /// Worker threads for the per-household computation
    pub workers: usize,
}

impl Default for EtvConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            base_temperature_c: DEFAULT_BASE_TEMPERATURE_C,
            min_rsquared_daily: MIN_RSQUARED_DAILY_DATA,
            min_days_per_segment: MIN_N_DAILY_DATA,
            workers: 1,
        }
    }
}

impl EtvConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }

    /// Parsed household timezone
    pub fn tz(&self) -> Result<chrono_tz::Tz, String> {
        self.timezone
            .parse()
            .map_err(|_| format!("unknown timezone '{}'", self.timezone))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        self.tz()?;

        if !self.base_temperature_c.is_finite() {
            return Err(format!(
                "base_temperature_c must be finite, got {}",
                self.base_temperature_c
            ));
        }

        if !(0.0..=1.0).contains(&self.min_rsquared_daily) {
            return Err(format!(
                "min_rsquared_daily must be in [0, 1], got {}",
                self.min_rsquared_daily
            ));
        }

        if self.min_days_per_segment < 1 {
            return Err("min_days_per_segment must be >= 1".to_string());
        }

        if self.workers < 1 {
            return Err("workers must be >= 1".to_string());
        }

        Ok(())
    }
}
