//! Configuration management for the air quality widget
//!
//! Handles loading configuration from a TOML file and environment variables,
//! and provides validation for all configuration settings.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::AirQualityError;
use crate::category::OutOfRangePolicy;

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "aqi-widget.toml";

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "AQI_WIDGET";

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirQualityConfig {
    /// Simulated data source settings
    pub simulation: SimulationConfig,
    /// Categorization settings
    pub categories: CategoryConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Simulated data source settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Shortest simulated network delay in milliseconds
    pub min_delay_ms: u64,
    /// Longest simulated network delay in milliseconds
    pub max_delay_ms: u64,
    /// Probability (0.0 to 1.0) that a lookup fails with a generic error
    pub failure_probability: f64,
    /// Largest AQI value a successful lookup can produce
    pub max_aqi: i32,
    /// Locations that never have data, matched case-insensitively
    pub deny_list: Vec<String>,
    /// Seed for reproducible lookups; drawn from entropy when unset
    pub seed: Option<u64>,
}

/// Categorization settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    /// How negative and above-scale values are handled
    pub policy: OutOfRangePolicy,
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or compact)
    pub format: String,
}

// Default value functions
fn default_min_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    2000
}

fn default_failure_probability() -> f64 {
    0.2
}

fn default_max_aqi() -> i32 {
    300
}

fn default_deny_list() -> Vec<String> {
    ["london", "paris", "tokyo"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            failure_probability: default_failure_probability(),
            max_aqi: default_max_aqi(),
            deny_list: default_deny_list(),
            seed: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl SimulationConfig {
    #[must_use]
    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    #[must_use]
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Instant, always-succeeding settings, handy for demos and tests
    #[must_use]
    pub fn reliable() -> Self {
        Self {
            min_delay_ms: 0,
            max_delay_ms: 0,
            failure_probability: 0.0,
            deny_list: Vec::new(),
            ..Self::default()
        }
    }
}

impl AirQualityConfig {
    /// Load configuration from the default file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(Self::get_config_path);

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // e.g. AQI_WIDGET_SIMULATION__FAILURE_PROBABILITY=0
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AirQualityConfig = settings
            .try_deserialize()
            .with_context(|| format!("Failed to deserialize configuration from {}", config_file.display()))?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> PathBuf {
        Path::new(DEFAULT_CONFIG_FILE).to_path_buf()
    }

    /// Apply default values to blank configuration fields
    pub fn apply_defaults(&mut self) {
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.simulation.max_aqi == 0 {
            self.simulation.max_aqi = default_max_aqi();
        }
        self.simulation.deny_list = self
            .simulation
            .deny_list
            .iter()
            .map(|entry| entry.trim().to_lowercase())
            .filter(|entry| !entry.is_empty())
            .collect();
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_simulation()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_simulation(&self) -> Result<()> {
        let simulation = &self.simulation;

        if !(0.0..=1.0).contains(&simulation.failure_probability) {
            return Err(AirQualityError::config(format!(
                "Failure probability must be between 0.0 and 1.0, got {}",
                simulation.failure_probability
            ))
            .into());
        }

        if simulation.min_delay_ms > simulation.max_delay_ms {
            return Err(AirQualityError::config(format!(
                "Minimum delay ({} ms) cannot exceed maximum delay ({} ms)",
                simulation.min_delay_ms, simulation.max_delay_ms
            ))
            .into());
        }

        if simulation.max_delay_ms > 60_000 {
            return Err(
                AirQualityError::config("Simulated delay cannot exceed 60000 ms").into(),
            );
        }

        if simulation.max_aqi <= 0 {
            return Err(AirQualityError::config("Maximum AQI must be positive").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AirQualityError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "compact"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AirQualityError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}
