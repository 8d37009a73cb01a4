//! # querywait-core
//!
//! Condition-based polling against eventually-consistent query backends.
//!
//! The CLI and any other caller share the same pieces:
//!
//! - [`Condition`] - predicate over a record count, parsed from `count-gte=3` style text
//! - [`BackoffPolicy`] / [`BackoffSchedule`] - bounded multiplicative delays between attempts
//! - [`QueryWaiter`] - the polling loop over a caller-supplied [`QueryExecutor`]
//! - [`ExitStatus`] - the stable exit-code taxonomy scripts rely on
//! - [`Config`] - TOML profiles and default wait settings
//!
//! ## Example
//!
//! ```rust,ignore
//! use querywait_core::{Condition, ExitStatus, QueryWaiter, WaitSpec};
//! use tokio_util::sync::CancellationToken;
//! use std::time::Duration;
//!
//! let spec = WaitSpec::new("status:ready", Condition::parse("count-gte=3")?, options)
//!     .with_timeout(Duration::from_secs(60));
//! let result = QueryWaiter::new(executor, spec)
//!     .wait(&CancellationToken::new())
//!     .await;
//! std::process::exit(ExitStatus::from_result(&result).code());
//! ```

pub mod backoff;
pub mod condition;
pub mod config;
pub mod error;
pub mod outcome;
pub mod progress;
pub mod waiter;

pub use backoff::{BackoffPolicy, BackoffSchedule};
pub use condition::Condition;
pub use config::{Config, ConfigError, Profile, WaitDefaults};
pub use error::{CoreError, Result};
pub use outcome::ExitStatus;
pub use progress::{ProgressCallback, ProgressEvent};
pub use waiter::{FailureReason, QueryExecutor, QueryWaiter, WaitResult, WaitSpec};
