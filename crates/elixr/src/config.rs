//! Configuration management for elixr.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::calculator::{Densities, MixSettings};
use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory name under the user's config directory.
const CONFIG_DIR_NAME: &str = "elixr";

/// Directory name under the user's data directory holding recipes.
const DATA_DIR_NAME: &str = "ElixrRecipes";

/// Default flavor weight file name.
pub const FLAVOR_WEIGHTS_FILE_NAME: &str = "flavor_weights.json";

/// Upper bound for displayed decimal places.
const MAX_PRECISION: usize = 6;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `ELIXR_`, sections split on `__`)
/// 2. TOML config file at `~/.config/elixr/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Mixing constants.
    pub mixing: MixingConfig,
    /// Output configuration.
    pub output: OutputConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding recipe files and the flavor weight table.
    /// Defaults to `~/.local/share/ElixrRecipes`
    pub data_dir: Option<PathBuf>,
    /// File name of the flavor weight table inside `data_dir`.
    pub flavor_weights_file: String,
}

/// Physical constants used by the calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixingConfig {
    /// Strength of the nicotine base in mg/ml.
    pub nicotine_base_strength: f64,
    /// Density of the nicotine base in g/ml.
    pub nicotine_density: f64,
    /// Density of vegetable glycerin in g/ml.
    pub vg_density: f64,
    /// Density of propylene glycol in g/ml.
    pub pg_density: f64,
    /// Specific gravity assumed for flavors missing from the table.
    pub default_flavor_weight: f64,
}

/// Output-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Decimal places shown for volumes and masses.
    pub precision: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None, // Will be resolved to default at runtime
            flavor_weights_file: FLAVOR_WEIGHTS_FILE_NAME.to_string(),
        }
    }
}

impl Default for MixingConfig {
    fn default() -> Self {
        let settings = MixSettings::default();
        Self {
            nicotine_base_strength: settings.nicotine_base_strength,
            nicotine_density: settings.densities.nicotine,
            vg_density: settings.densities.vg,
            pg_density: settings.densities.pg,
            default_flavor_weight: settings.default_flavor_weight,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { precision: 2 }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// A missing config file is not an error; defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("ELIXR_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("nicotine_base_strength", self.mixing.nicotine_base_strength),
            ("nicotine_density", self.mixing.nicotine_density),
            ("vg_density", self.mixing.vg_density),
            ("pg_density", self.mixing.pg_density),
            ("default_flavor_weight", self.mixing.default_flavor_weight),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::ConfigValidation {
                    message: format!("{name} must be greater than 0 (got {value})"),
                });
            }
        }

        if self.output.precision > MAX_PRECISION {
            return Err(Error::ConfigValidation {
                message: format!(
                    "precision ({}) cannot be greater than {MAX_PRECISION}",
                    self.output.precision
                ),
            });
        }

        let file = self.storage.flavor_weights_file.trim();
        if file.is_empty() || file.contains(['/', '\\']) {
            return Err(Error::ConfigValidation {
                message: format!("flavor_weights_file must be a plain file name (got '{file}')"),
            });
        }

        Ok(())
    }

    /// Get the data directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the flavor weight table path.
    #[must_use]
    pub fn flavor_weights_path(&self) -> PathBuf {
        self.data_dir().join(&self.storage.flavor_weights_file)
    }

    /// Build calculator settings from the mixing section.
    #[must_use]
    pub fn mix_settings(&self) -> MixSettings {
        MixSettings {
            nicotine_base_strength: self.mixing.nicotine_base_strength,
            densities: Densities {
                nicotine: self.mixing.nicotine_density,
                vg: self.mixing.vg_density,
                pg: self.mixing.pg_density,
            },
            default_flavor_weight: self.mixing.default_flavor_weight,
        }
    }
}
