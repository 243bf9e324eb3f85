//! Trigger configuration
//!
//! Loaded from TOML, e.g.
//! ```toml
//! delay_ms = 300
//! label = "reload-index"
//! ```

use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Debounce configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebounceConfig {
    /// Delay window in milliseconds (default: 250)
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Name used in log output (default: "trigger")
    #[serde(default = "default_label")]
    pub label: String,
}

impl DebounceConfig {
    /// Upper bound for `delay_ms` (1 hour)
    pub const MAX_DELAY_MS: u64 = 60 * 60 * 1000;

    /// Config with the given delay and the default label
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay_ms: delay.as_millis().min(u128::from(u64::MAX)) as u64,
            ..Self::default()
        }
    }

    /// Delay window
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delay_ms > Self::MAX_DELAY_MS {
            return Err(ConfigError::DelayOutOfRange {
                value: self.delay_ms,
                max: Self::MAX_DELAY_MS,
            });
        }
        if self.label.trim().is_empty() {
            return Err(ConfigError::EmptyLabel);
        }
        Ok(())
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            label: default_label(),
        }
    }
}

fn default_delay_ms() -> u64 {
    250
}

fn default_label() -> String {
    "trigger".to_string()
}

/// Load configuration from a TOML file
pub fn load(path: &Path) -> Result<DebounceConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config = DebounceConfig::from_toml_str(&text)
        .with_context(|| format!("Invalid config file {}", path.display()))?;

    Ok(config)
}
