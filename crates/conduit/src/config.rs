//! Runner configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `conduit.ron` file (if exists)
//! 3. Environment variables prefixed with `CONDUIT_`
//!
//! Example environment variable: `CONDUIT_CONDUCTION__HEATING__FAILURE_GRACE_SECS=1.0`

use anyhow::{Context, Result};
use conduit_core::ConductionConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Main runner configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub conduction: ConductionConfig,

    #[serde(default)]
    pub runner: RunnerConfig,
}

/// Scenario driver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Simulation ticks per second
    pub tick_rate_hz: f32,
    /// Upper bound for any `WaitUntil*` action, in simulated seconds
    pub max_wait_secs: f32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            max_wait_secs: 120.0,
        }
    }
}

impl RunnerConfig {
    /// Fixed tick length in seconds
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate_hz.max(1.0)
    }
}

impl AppConfig {
    /// Load configuration with layered priority:
    /// 1. Compiled defaults (lowest priority)
    /// 2. `conduit.ron` file (if exists)
    /// 3. Environment variables prefixed with `CONDUIT_` (highest priority)
    pub fn load() -> Result<Self> {
        Self::load_from("conduit")
    }

    /// Same as [`AppConfig::load`] with a custom config file stem
    pub fn load_from(file_stem: &str) -> Result<Self> {
        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .set_default("runner.tick_rate_hz", 60.0)?
            .set_default("runner.max_wait_secs", 120.0)?
            // Layer 2: Config file (optional, won't error if missing)
            .add_source(
                File::with_name(file_stem)
                    .format(config::FileFormat::Ron)
                    .required(false),
            )
            // Layer 3: Environment variables (CONDUIT_RUNNER__TICK_RATE_HZ, etc.)
            .add_source(
                Environment::with_prefix("CONDUIT")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
