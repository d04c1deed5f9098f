//! # Configuration Management
//!
//! Loads the fishing location and forecast options from `catch-forecast.toml`.
//! Sections or fields absent from the file take their default values, so a
//! file holding only `[location]` is valid.

use crate::scoring::SpeciesProfile;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "catch-forecast.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Where the forecast is made for
    pub location: LocationConfig,
    /// Forecast horizon and target species
    pub forecast: ForecastConfig,
}

/// Fishing spot. Longitude is positive east.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LocationConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Number of daily outlooks to print
    pub days: usize,
    /// Optional species whose preferences adjust the current score
    pub species: Option<SpeciesProfile>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        LocationConfig {
            name: "Salzburg, Austria".to_string(),
            latitude: 47.8095,
            longitude: 13.0550,
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        ForecastConfig {
            days: 7,
            species: None,
        }
    }
}

impl Config {
    /// Configuration from [`DEFAULT_CONFIG_PATH`] in the working directory.
    pub fn load() -> Self {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Configuration from `path`. Never fails: a missing file or one that
    /// does not parse yields [`Config::default`].
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(location = %config.location.name, "loaded configuration");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), "invalid config file format: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                info!(path = %path.display(), "no config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Write this configuration as pretty TOML.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self).context("serializing configuration")?;
        fs::write(path, contents)
            .with_context(|| format!("writing configuration to {}", path.display()))?;
        info!(path = %path.display(), "configuration saved");
        Ok(())
    }
}
