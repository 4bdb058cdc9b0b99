//! Configuration management

use crate::core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cleaning: CleaningConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cleaning: CleaningConfig::default(),
            aggregation: AggregationConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Config {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

        let app_config_dir = config_dir.join("loadshape-analyzer");

        if !app_config_dir.exists() {
            fs::create_dir_all(&app_config_dir)?;
        }

        Ok(app_config_dir.join("config.toml"))
    }

    /// Load configuration from disk, creating the default file if absent
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            let config = Self::default();
            config.save()?;
            log::info!("Wrote default configuration to {}", path.display());
            return Ok(config);
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Settings for series cleaning and gap filling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Longest run of consecutive invalid samples to fill by interpolation
    #[serde(default = "default_max_fill_run")]
    pub max_fill_run: usize,
    /// Weight gap interpolation by timestamp spacing instead of index spacing
    #[serde(default = "default_true")]
    pub time_weighted_fill: bool,
}

fn default_max_fill_run() -> usize { 1 }
fn default_true() -> bool { true }

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            max_fill_run: default_max_fill_run(),
            time_weighted_fill: true,
        }
    }
}

/// Settings for calendar-period aggregation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Days of missing lead-in data tolerated before the period walk stops
    #[serde(default = "default_lead_in_tolerance")]
    pub lead_in_tolerance_days: f64,
}

fn default_lead_in_tolerance() -> f64 { 3.0 }

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            lead_in_tolerance_days: default_lead_in_tolerance(),
        }
    }
}

/// Settings for summary reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Unit label for floor-area-normalized load intensities
    #[serde(default = "default_intensity_units")]
    pub load_intensity_units: String,
}

fn default_intensity_units() -> String { "W/sf".to_string() }

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            load_intensity_units: default_intensity_units(),
        }
    }
}
