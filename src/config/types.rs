//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::protocol::Luminances;

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level ("trace", "debug", "info", "warn", "error")
    pub level: String,

    /// Output format ("pretty", "compact", "json")
    pub format: String,

    /// Directory for a log file next to stderr output (None = stderr only)
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
            log_dir: None,
        }
    }
}

/// Luminances sent with extended-linear (scRGB) descriptions
///
/// Defaults follow the Windows scRGB convention: 1.0 is 80 nits and SDR
/// white sits at 203 nits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrgbLuminances {
    /// Minimum luminance, 0.0001 cd/m²
    pub min: u32,

    /// Maximum luminance, cd/m²
    pub max: u32,

    /// Reference white luminance, cd/m²
    pub reference: u32,
}

impl Default for ScrgbLuminances {
    fn default() -> Self {
        Self {
            min: 0,
            max: 80,
            reference: 203,
        }
    }
}

impl ScrgbLuminances {
    /// Triple in `set_luminances` argument order
    pub fn luminances(&self) -> Luminances {
        Luminances {
            min: self.min,
            max: self.max,
            reference: self.reference,
        }
    }
}
