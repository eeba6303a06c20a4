//! Runner configuration loaded from `crewledger.toml`.
//!
//! Every key is optional; a missing file section falls back to its default.
//!
//! ```toml
//! [currency]
//! code = "USD"
//! symbol = "$"
//! minor_digits = 2
//!
//! [discovery]
//! file_prefix = "crewledger-"
//!
//! [export]
//! write_markdown = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Highest supported number of minor-unit digits.
pub const MAX_MINOR_DIGITS: u32 = 6;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How minor-unit amounts are rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyFormat {
    pub code: String,
    pub symbol: String,
    pub minor_digits: u32,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            code: "USD".into(),
            symbol: "$".into(),
            minor_digits: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Trip exports inside a directory are picked up by this file-name prefix.
    pub file_prefix: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            file_prefix: "crewledger-".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub write_markdown: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            write_markdown: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub currency: CurrencyFormat,
    pub discovery: DiscoveryConfig,
    pub export: ExportConfig,
}

impl RunnerConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: RunnerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.currency.minor_digits > MAX_MINOR_DIGITS {
            return Err(ConfigError::Invalid(format!(
                "currency.minor_digits must be at most {MAX_MINOR_DIGITS}, got {}",
                self.currency.minor_digits
            )));
        }
        if self.currency.code.trim().is_empty() {
            return Err(ConfigError::Invalid("currency.code must not be empty".into()));
        }
        if self.discovery.file_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "discovery.file_prefix must not be empty".into(),
            ));
        }
        Ok(())
    }
}
