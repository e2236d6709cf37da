//! # Configuration Management Module
//!
//! Centralized, TOML-backed configuration for the creative controller and the
//! bundled simulated host.
//!
//! ## Configuration Structure
//!
//! - [`CreativeConfig`] - Slot synchronization timeouts
//! - [`FlightConfig`] - Step size and tick period for straight-line flight
//! - [`LoggingConfig`] - Logging level and optional log file
//! - [`SimulationConfig`] - Behaviour of the in-process remote host
//!
//! ## Usage
//!
//! ```rust,no_run
//! use creativebot::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("creativebot.toml").await?;
//!     println!("ack timeout: {:?}", config.creative.ack_timeout());
//!
//!     Config::create_default("creativebot.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [creative]
//! default_wait_timeout_ms = 400
//! ack_timeout_ms = 5000
//!
//! [flight]
//! step_size = 0.5
//! tick_ms = 50
//!
//! [logging]
//! level = "info"
//!
//! [simulation]
//! acknowledge = false
//! latency_ms = 20
//! reject_item_ids = [7]
//! ```

use anyhow::{anyhow, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreativeConfig {
    /// How long to watch for a contradiction when the host sends no acknowledgment (ms).
    /// Zero returns as soon as the request is sent.
    pub default_wait_timeout_ms: u64,
    /// How long to wait for a matching acknowledgment when the host sends one (ms).
    pub ack_timeout_ms: u64,
}

impl Default for CreativeConfig {
    fn default() -> Self {
        Self {
            default_wait_timeout_ms: 400,
            ack_timeout_ms: 5000,
        }
    }
}

impl CreativeConfig {
    pub fn default_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.default_wait_timeout_ms)
    }

    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightConfig {
    /// Distance advanced per tick.
    pub step_size: f64,
    /// Tick period (ms).
    pub tick_ms: u64,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            step_size: 0.5,
            tick_ms: 50,
        }
    }
}

impl FlightConfig {
    /// Step size, falling back to 0.5 when the configured value is not a positive number.
    pub fn step_size(&self) -> f64 {
        if self.step_size.is_finite() && self.step_size > 0.0 {
            self.step_size
        } else {
            warn!(
                "Invalid flight step_size {}, defaulting to 0.5",
                self.step_size
            );
            0.5
        }
    }

    /// Tick period, at least 1ms.
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Parsed level; unknown strings fall back to `Info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// When true the simulated host acknowledges every creative slot request.
    /// When false it behaves like hosts without acknowledgment and only speaks
    /// up to contradict requests it refuses.
    pub acknowledge: bool,
    /// Delay between receiving a request and reacting to it (ms).
    pub latency_ms: u64,
    /// Item ids the host refuses to place.
    #[serde(default)]
    pub reject_item_ids: Vec<u32>,
    /// Period of the simulated physics tick that emits "moved" (ms).
    pub tick_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            acknowledge: false,
            latency_ms: 20,
            reject_item_ids: Vec::new(),
            tick_ms: 50,
        }
    }
}

impl SimulationConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub creative: CreativeConfig,
    #[serde(default)]
    pub flight: FlightConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}
