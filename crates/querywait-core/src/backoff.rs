//! Backoff policy and the delay schedule used between poll attempts
//!
//! The first execution waits `initial_delay`. After every unsatisfied
//! attempt the delay starts at `min_interval` and grows as
//! `next = min(current * multiplier, max_interval)`. The sequence never
//! decreases and never resets within a single wait.

use std::time::Duration;

use crate::error::{CoreError, Result};

/// Default floor between attempts
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(1);
/// Default ceiling between attempts
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(30);
/// Default growth factor
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Validated, immutable backoff configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    min_interval: Duration,
    max_interval: Duration,
    multiplier: f64,
    initial_delay: Duration,
}

impl BackoffPolicy {
    /// Build a policy with no initial delay, validating it immediately
    pub fn new(min_interval: Duration, max_interval: Duration, multiplier: f64) -> Result<Self> {
        let policy = Self {
            min_interval,
            max_interval,
            multiplier,
            initial_delay: Duration::ZERO,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Set the delay before the first execution
    #[must_use]
    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    /// Check the policy invariants. Nothing is clamped.
    pub fn validate(&self) -> Result<()> {
        if self.max_interval < self.min_interval {
            return Err(CoreError::InvalidBackoffConfig(format!(
                "max interval ({:?}) must be greater than or equal to min interval ({:?})",
                self.max_interval, self.min_interval
            )));
        }
        if !self.multiplier.is_finite() || self.multiplier <= 1.0 {
            return Err(CoreError::InvalidBackoffConfig(format!(
                "backoff multiplier must be a finite number greater than 1.0, got {}",
                self.multiplier
            )));
        }
        Ok(())
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn max_interval(&self) -> Duration {
        self.max_interval
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Pure step function: the delay that follows `current`
    #[must_use]
    pub fn advance(&self, current: Duration) -> Duration {
        Duration::try_from_secs_f64(current.as_secs_f64() * self.multiplier)
            .map(|next| next.min(self.max_interval))
            .unwrap_or(self.max_interval)
    }

    /// Start a fresh delay cursor for one wait
    pub fn schedule(&self) -> BackoffSchedule {
        BackoffSchedule {
            policy: *self,
            current: None,
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            min_interval: DEFAULT_MIN_INTERVAL,
            max_interval: DEFAULT_MAX_INTERVAL,
            multiplier: DEFAULT_MULTIPLIER,
            initial_delay: Duration::ZERO,
        }
    }
}

/// Stateful cursor over the retry delays of a single wait
///
/// Yields `min_interval` first, then advances on every call. The iterator
/// is infinite.
#[derive(Debug, Clone)]
pub struct BackoffSchedule {
    policy: BackoffPolicy,
    current: Option<Duration>,
}

impl BackoffSchedule {
    /// Delay before the very first execution
    pub fn initial_delay(&self) -> Duration {
        self.policy.initial_delay
    }

    /// The most recently returned retry delay, if any
    pub fn current(&self) -> Option<Duration> {
        self.current
    }

    /// Delay to sleep after an unsatisfied attempt
    pub fn next_delay(&mut self) -> Duration {
        let next = match self.current {
            None => self.policy.min_interval,
            Some(current) => self.policy.advance(current),
        };
        self.current = Some(next);
        next
    }
}

impl Iterator for BackoffSchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        Some(self.next_delay())
    }
}
