//! Unified error handling for querywait-core
//!
//! These are the errors that can stop a wait *before* any query runs.
//! Timeouts, exhausted attempt budgets and query failures are not errors
//! here: they are terminal states reported through [`crate::WaitResult`].
//!
//! # Example
//!
//! ```rust
//! use querywait_core::{Condition, CoreError};
//!
//! let err = "count=-1".parse::<Condition>().unwrap_err();
//! assert!(err.is_invalid_condition());
//! assert!(err.to_string().contains("count=-1"));
//! ```

use thiserror::Error;

use crate::config::ConfigError;

/// Core error type for pre-execution failures
#[derive(Error, Debug)]
pub enum CoreError {
    /// The `--for` condition text did not match the condition grammar
    #[error("Invalid condition '{text}': expected one of count=N, count-gte=N, count-gt=N, count-lte=N, count-lt=N, any, none")]
    InvalidCondition { text: String },

    /// Backoff policy failed validation
    #[error("Invalid backoff configuration: {0}")]
    InvalidBackoffConfig(String),

    /// Any other bad caller-supplied argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Returns true if the condition string could not be parsed
    #[must_use]
    pub fn is_invalid_condition(&self) -> bool {
        matches!(self, CoreError::InvalidCondition { .. })
    }

    /// Returns true for backoff, argument and config-file problems
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidBackoffConfig(_)
                | CoreError::InvalidArgument(_)
                | CoreError::Config(_)
        )
    }
}
