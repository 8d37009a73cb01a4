//! Default wait settings stored in the config file
//!
//! Every field is optional in TOML and falls back to the built-in default.
//! Zero `timeout_secs` / `max_attempts` mean unlimited.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backoff::BackoffPolicy;
use crate::error::Result;

/// `[wait]` section of the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitDefaults {
    /// Overall timeout in seconds (0 = unlimited)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of query executions (0 = unlimited)
    #[serde(default)]
    pub max_attempts: u32,

    /// Delay before the first execution in milliseconds
    #[serde(default)]
    pub initial_delay_ms: u64,

    /// Backoff floor in milliseconds
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Backoff ceiling in milliseconds
    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,

    /// Backoff growth factor
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

impl Default for WaitDefaults {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_attempts: 0,
            initial_delay_ms: 0,
            min_interval_ms: default_min_interval_ms(),
            max_interval_ms: default_max_interval_ms(),
            multiplier: default_multiplier(),
        }
    }
}

impl WaitDefaults {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }

    /// Build and validate the backoff policy described by this section
    pub fn backoff_policy(&self) -> Result<BackoffPolicy> {
        Ok(
            BackoffPolicy::new(self.min_interval(), self.max_interval(), self.multiplier)?
                .with_initial_delay(self.initial_delay()),
        )
    }
}

// Default value functions for serde
fn default_timeout_secs() -> u64 {
    300
}

fn default_min_interval_ms() -> u64 {
    1000
}

fn default_max_interval_ms() -> u64 {
    30_000
}

fn default_multiplier() -> f64 {
    2.0
}
