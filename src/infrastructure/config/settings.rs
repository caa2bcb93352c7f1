//! Settings file loading and validation.
//!
//! Provides the [`Settings`] struct that aggregates logging and optimizer
//! settings. Settings are loaded from a TOML file with `CARDPLAN_*`
//! environment variable overrides for a few scalar values.
//!
//! # Example
//!
//! ```no_run
//! use cardplan::infrastructure::config::settings::Settings;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::load("cardplan.toml")?;
//!     settings.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use crate::application::{OptimizationConfig, Strategy};
use crate::error::{ConfigError, Result};

/// Overrides the optimizer strategy.
pub const ENV_STRATEGY: &str = "CARDPLAN_STRATEGY";
/// Overrides the evolutionary RNG seed.
pub const ENV_SEED: &str = "CARDPLAN_SEED";
/// Overrides the evaluation thread count.
pub const ENV_THREADS: &str = "CARDPLAN_THREADS";

/// Main application settings.
///
/// Load from a TOML file using [`Settings::load`] or parse directly with
/// [`Settings::parse_toml`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Optimizer defaults applied to every run.
    #[serde(default)]
    pub optimizer: OptimizationConfig,
}

impl Settings {
    /// Parse settings from TOML content, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The TOML content is malformed
    /// - An environment override cannot be parsed
    /// - Validation fails
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut settings: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        settings.apply_env_overrides(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load settings from a file if it exists, defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be loaded.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }
        let mut settings = Self::default();
        settings.apply_env_overrides(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply `CARDPLAN_*` overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for unparsable values.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_STRATEGY) {
            self.optimizer.strategy = value.parse::<Strategy>()?;
        }
        if let Some(value) = lookup(ENV_SEED) {
            let seed = value.trim().parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                field: ENV_SEED,
                reason: e.to_string(),
            })?;
            self.optimizer.seed = Some(seed);
        }
        if let Some(value) = lookup(ENV_THREADS) {
            let threads = value
                .trim()
                .parse::<usize>()
                .map_err(|e| ConfigError::InvalidValue {
                    field: ENV_THREADS,
                    reason: e.to_string(),
                })?;
            self.optimizer.threads = Some(threads);
        }
        Ok(())
    }

    /// Validate settings values.
    ///
    /// The optimizer section is checked with the same rules applied to every
    /// run; repairable values pass here and are corrected per run.
    fn validate(&self) -> Result<()> {
        self.logging.validate()?;
        self.optimizer.validated()?;
        Ok(())
    }

    /// Initialize the tracing subscriber with the logging settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
