//! # Node Configuration
//!
//! Loaded from an optional TOML file. Every section and key has a default,
//! so an empty file (or no file at all) yields a working node:
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! api_port = 8000
//! metrics_port = 9464
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//!
//! [valuation]
//! low = "0.10"
//! medium = "0.50"
//! high = "1.00"
//! premium = "2.00"
//!
//! [issuance]
//! interest_rate = "0.05"
//! maturity_days = 90
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use nwu_core::config::{EngineConfig, IssuanceDefaults, RateTable};

use crate::logging::LogFormat;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_API_PORT: u16 = 8000;
pub const DEFAULT_METRICS_PORT: u16 = 9464;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub valuation: RateTable,
    pub issuance: IssuanceDefaults,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub api_port: u16,
    pub metrics_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            api_port: DEFAULT_API_PORT,
            metrics_port: DEFAULT_METRICS_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// A bare level (`info`) or full `EnvFilter` directives.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl NodeConfig {
    /// Reads and validates the file at `path`, or returns the defaults when
    /// no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                Self::from_toml(&content)
                    .with_context(|| format!("invalid config file {}", path.display()))?
            }
            None => Self::default(),
        };
        Ok(config)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.engine().validate()?;
        if self.server.api_port != 0 && self.server.api_port == self.server.metrics_port {
            anyhow::bail!(
                "server.api_port and server.metrics_port must differ (both {})",
                self.server.api_port
            );
        }
        Ok(())
    }

    /// The part of the configuration the core library consumes.
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            valuation: self.valuation,
            issuance: self.issuance,
        }
    }
}
