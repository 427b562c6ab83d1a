//! # Configuration Management
//!
//! Loads prediction settings from a `tide-predictor.toml` file, falling
//! back to the built-in defaults (the Dahab deployment) when the file is
//! absent or malformed. The raw file shape is validated and resolved once
//! into a [`PredictConfig`] — model selection is a typed variant from then
//! on, never a string compared at prediction time.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::grid::ModelVariant;

/// How the per-constituent constants are resolved at prediction time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionStrategy {
    /// Interpolate against the full model grids on every prediction
    GridDirect,
    /// Read the persisted record written by the extraction job
    CachedLocal,
}

/// Raw configuration file shape.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Fixed deployment point
    pub location: LocationConfig,
    /// Tidal model selection
    pub model: ModelConfig,
    /// Forecast window and datum calibration
    pub forecast: ForecastConfig,
}

/// The coastal point predictions are made for
#[derive(Debug, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Degrees north
    pub latitude: f64,
    /// Degrees east
    pub longitude: f64,
}

/// Tidal model selection and resolution strategy
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name: "GOT4.10" or "FES2022"
    pub name: String,
    /// Directory holding the per-constituent grid files and the record
    pub directory: PathBuf,
    /// Constants resolution strategy
    pub strategy: ResolutionStrategy,
}

/// Forecast window and unit calibration
#[derive(Debug, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Number of hourly values to produce
    pub horizon_hours: u32,
    /// Mean-sea-level to chart-datum shift in centimeters.
    /// For Dahab the local offset is ~45 cm, calibrated against published
    /// tide tables so values match what divers and sailors expect.
    pub datum_offset_cm: i32,
}

/// Errors turning a raw [`Config`] into a usable [`PredictConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown tidal model {0:?} (expected \"GOT4.10\" or \"FES2022\")")]
    UnknownModel(String),
    #[error("forecast horizon must be at least 1 hour")]
    InvalidHorizon,
}

/// Fully resolved prediction settings, consumed by [`crate::predict`].
#[derive(Clone, Debug)]
pub struct PredictConfig {
    /// Model to predict with
    pub variant: ModelVariant,
    /// How constants are resolved
    pub strategy: ResolutionStrategy,
    /// Number of hourly values to produce (>= 1)
    pub horizon_hours: u32,
    /// Chart-datum shift applied to every value, centimeters
    pub datum_offset_cm: i32,
    /// Model data directory
    pub model_dir: PathBuf,
    /// Degrees north
    pub latitude: f64,
    /// Degrees east
    pub longitude: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            location: LocationConfig {
                // Dahab, Egypt
                latitude: 28.4937,
                longitude: 34.5131,
            },
            model: ModelConfig {
                name: "GOT4.10".to_string(),
                directory: PathBuf::from("tide-models"),
                strategy: ResolutionStrategy::GridDirect,
            },
            forecast: ForecastConfig {
                horizon_hours: 168,
                datum_offset_cm: 45,
            },
        }
    }
}

impl Config {
    /// Load configuration from `tide-predictor.toml` in the working
    /// directory, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from_path("tide-predictor.toml")
    }

    /// Load configuration from a specific path.
    /// Falls back to the default (Dahab) configuration if the file doesn't
    /// exist or fails to parse.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(model = config.model.name, "loaded configuration");
                    config
                }
                Err(e) => {
                    warn!(error = %e, "invalid config file, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                info!("no config file found, using default (Dahab) configuration");
                Self::default()
            }
        }
    }

    /// Validate and resolve into typed prediction settings.
    pub fn resolve(&self) -> Result<PredictConfig, ConfigError> {
        let variant = ModelVariant::from_config_name(&self.model.name)
            .ok_or_else(|| ConfigError::UnknownModel(self.model.name.clone()))?;
        if self.forecast.horizon_hours == 0 {
            return Err(ConfigError::InvalidHorizon);
        }
        Ok(PredictConfig {
            variant,
            strategy: self.model.strategy,
            horizon_hours: self.forecast.horizon_hours,
            datum_offset_cm: self.forecast.datum_offset_cm,
            model_dir: self.model.directory.clone(),
            latitude: self.location.latitude,
            longitude: self.location.longitude,
        })
    }
}
