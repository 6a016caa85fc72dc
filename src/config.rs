//! Layered configuration using Figment.
//!
//! Configuration is loaded from:
//! 1. a TOML file (`config/default.toml` by default)
//! 2. environment variables prefixed with `ASSETFLOW_`
//!
//! # Example
//! ```no_run
//! use assetflow::config::Settings;
//!
//! # fn main() -> Result<(), figment::Error> {
//! let settings = Settings::load()?;
//! println!("Application: {}", settings.application.name);
//! # Ok(())
//! # }
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Application settings.
    pub application: ApplicationSettings,
    /// Telemetry pipeline settings.
    pub pipeline: PipelineSettings,
}

/// Application-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationSettings {
    /// Application name.
    pub name: String,
    /// Logging level (trace, debug, info, warn, error).
    pub log_level: String,
}

/// Telemetry pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Maximum records processed simultaneously. Submission blocks when the
    /// bound is reached.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Temperature (°C) above which a record is annotated with a
    /// high-temperature warning.
    #[serde(default = "default_high_temperature_threshold")]
    pub high_temperature_threshold: f64,
    /// Power (kW) below which a record is annotated with a low-power alert.
    #[serde(default = "default_low_power_threshold")]
    pub low_power_threshold: f64,
    /// Modeled duration of the analyze stage (e.g. "200ms").
    #[serde(with = "humantime_serde", default = "default_analyze_duration")]
    pub analyze_duration: Duration,
}

// Default value functions
fn default_max_concurrent() -> usize {
    64
}

fn default_high_temperature_threshold() -> f64 {
    100.0
}

fn default_low_power_threshold() -> f64 {
    10.0
}

fn default_analyze_duration() -> Duration {
    Duration::from_millis(200)
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            high_temperature_threshold: default_high_temperature_threshold(),
            low_power_threshold: default_low_power_threshold(),
            analyze_duration: default_analyze_duration(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            application: ApplicationSettings {
                name: "assetflow".to_string(),
                log_level: "info".to_string(),
            },
            pipeline: PipelineSettings::default(),
        }
    }
}

impl Settings {
    /// Loads configuration from `config/default.toml` and environment
    /// variables.
    ///
    /// Environment variables override the file with the prefix `ASSETFLOW_`,
    /// e.g. `ASSETFLOW_APPLICATION_LOG_LEVEL=debug`.
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from("config/default.toml")
    }

    /// Loads configuration from a specific file path.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, figment::Error> {
        Figment::from(figment::providers::Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("ASSETFLOW_").split("_"))
            .extract()
    }

    /// Validates configuration after loading.
    pub fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.application.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            ));
        }

        if self.pipeline.max_concurrent == 0 {
            return Err("pipeline.max_concurrent must be at least 1".to_string());
        }

        if self.pipeline.low_power_threshold < 0.0 {
            return Err(format!(
                "pipeline.low_power_threshold ({}) must not be negative",
                self.pipeline.low_power_threshold
            ));
        }

        Ok(())
    }
}
