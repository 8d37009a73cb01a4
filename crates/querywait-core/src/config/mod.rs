//! Configuration and profile management for querywait
//!
// Allow nested config module - this is intentional for the config subsystem

#![allow(clippy::module_inception)]
//!
//! A TOML file holds named query endpoint profiles and default wait
//! settings. Command-line flags override the `[wait]` section, which
//! overrides the built-in defaults.
//!
//! # Features
//!
//! - Multiple named endpoint profiles with per-profile headers
//! - Environment variable expansion (`${VAR}`, `${VAR:-default}`)
//! - Platform-specific config file locations

pub mod config;
pub mod error;
pub mod wait;

// Re-export main types for convenience
pub use config::{Config, Profile};
pub use error::{ConfigError, Result};
pub use wait::WaitDefaults;
