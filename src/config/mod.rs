//! Configuration management
//!
//! The layer is loaded into arbitrary applications, so configuration comes
//! from the environment rather than a command line:
//! - `HDR_WSI_CONFIG`: path to a TOML file
//! - `DISABLE_HDR_WSI`: any value other than empty or `0` turns the layer into a pass-through
//! - `HDR_WSI_LOG_LEVEL`, `HDR_WSI_LOG_DIR`: logging overrides
//!
//! ```toml
//! enabled = true
//!
//! [logging]
//! level = "debug"
//! format = "json"
//!
//! [scrgb]
//! max = 80
//! reference = 203
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

pub mod types;

pub use types::{LoggingConfig, ScrgbLuminances};

/// Environment variable naming a configuration file
pub const CONFIG_ENV: &str = "HDR_WSI_CONFIG";
/// Environment variable disabling the layer
pub const DISABLE_ENV: &str = "DISABLE_HDR_WSI";
/// Environment variable overriding the log level
pub const LOG_LEVEL_ENV: &str = "HDR_WSI_LOG_LEVEL";
/// Environment variable overriding the log directory
pub const LOG_DIR_ENV: &str = "HDR_WSI_LOG_DIR";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// When false every entry point passes straight through
    pub enabled: bool,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// scRGB luminance convention
    pub scrgb: ScrgbLuminances,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            logging: LoggingConfig::default(),
            scrgb: ScrgbLuminances::default(),
        }
    }
}

impl LayerConfig {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: LayerConfig =
            toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Invalid log level: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" | "json" => {}
            _ => anyhow::bail!("Invalid log format: {}", self.logging.format),
        }

        // min is in 0.0001 nit units, max in nits
        if u64::from(self.scrgb.min) >= u64::from(self.scrgb.max) * 10_000 {
            anyhow::bail!(
                "scrgb.min ({} x 0.0001 nits) must be below scrgb.max ({} nits)",
                self.scrgb.min,
                self.scrgb.max
            );
        }

        if self.scrgb.reference == 0 {
            anyhow::bail!("scrgb.reference must be greater than 0");
        }

        Ok(())
    }

    /// Configuration for the running process
    ///
    /// A broken configuration file is reported and replaced by defaults: the
    /// host application must keep working either way.
    pub fn from_env() -> Self {
        let config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(&path).unwrap_or_else(|e| {
                warn!(path = %PathBuf::from(&path).display(), error = %e, "Ignoring HDR layer config");
                Self::default()
            }),
            None => Self::default(),
        };

        config.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply environment style overrides looked up through `var`
    pub fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = var(DISABLE_ENV) {
            if !value.is_empty() && value != "0" {
                self.enabled = false;
            }
        }

        if let Some(level) = var(LOG_LEVEL_ENV).filter(|level| !level.is_empty()) {
            self.logging.level = level.to_lowercase();
        }

        if let Some(dir) = var(LOG_DIR_ENV).filter(|dir| !dir.is_empty()) {
            self.logging.log_dir = Some(PathBuf::from(dir));
        }

        self
    }
}
