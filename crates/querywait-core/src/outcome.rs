//! Stable exit-code taxonomy for scripts
//!
//! | Outcome                                  | Code |
//! |------------------------------------------|------|
//! | condition satisfied                      | 0    |
//! | timed out (or cancelled)                 | 1    |
//! | attempt budget exhausted                 | 2    |
//! | query execution failed                   | 3    |
//! | invalid condition                        | 4    |
//! | invalid backoff config / bad arguments   | 5    |
//!
//! These values are part of the command-line contract and must not change.

use std::fmt;

use crate::error::CoreError;
use crate::waiter::{FailureReason, WaitResult};

/// Process exit status derived from a wait or a pre-execution error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Timeout,
    AttemptsExhausted,
    QueryError,
    InvalidCondition,
    InvalidArguments,
}

impl ExitStatus {
    /// The numeric process exit code
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Timeout => 1,
            ExitStatus::AttemptsExhausted => 2,
            ExitStatus::QueryError => 3,
            ExitStatus::InvalidCondition => 4,
            ExitStatus::InvalidArguments => 5,
        }
    }

    /// Map a terminal wait state. Explicit cancellation shares the
    /// timeout code.
    #[must_use]
    pub fn from_reason(reason: FailureReason) -> Self {
        match reason {
            FailureReason::None => ExitStatus::Success,
            FailureReason::Timeout | FailureReason::Cancelled => ExitStatus::Timeout,
            FailureReason::MaxAttemptsExceeded => ExitStatus::AttemptsExhausted,
            FailureReason::QueryError => ExitStatus::QueryError,
        }
    }

    #[must_use]
    pub fn from_result<R>(result: &WaitResult<R>) -> Self {
        Self::from_reason(result.failure_reason())
    }

    /// Map an error raised before any query ran
    #[must_use]
    pub fn from_error(err: &CoreError) -> Self {
        if err.is_invalid_condition() {
            ExitStatus::InvalidCondition
        } else {
            ExitStatus::InvalidArguments
        }
    }

    pub fn is_success(self) -> bool {
        self == ExitStatus::Success
    }
}

impl<R> From<&WaitResult<R>> for ExitStatus {
    fn from(result: &WaitResult<R>) -> Self {
        Self::from_result(result)
    }
}

impl From<&CoreError> for ExitStatus {
    fn from(err: &CoreError) -> Self {
        Self::from_error(err)
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        // Codes are 0..=5
        std::process::ExitCode::from(status.code() as u8)
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitStatus::Success => "success",
            ExitStatus::Timeout => "timeout",
            ExitStatus::AttemptsExhausted => "attempts exhausted",
            ExitStatus::QueryError => "query error",
            ExitStatus::InvalidCondition => "invalid condition",
            ExitStatus::InvalidArguments => "invalid arguments",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ExitStatus::Success.code(), 0);
        assert_eq!(ExitStatus::Timeout.code(), 1);
        assert_eq!(ExitStatus::AttemptsExhausted.code(), 2);
        assert_eq!(ExitStatus::QueryError.code(), 3);
        assert_eq!(ExitStatus::InvalidCondition.code(), 4);
        assert_eq!(ExitStatus::InvalidArguments.code(), 5);
    }

    #[test]
    fn test_from_reason() {
        assert_eq!(ExitStatus::from_reason(FailureReason::None), ExitStatus::Success);
        assert_eq!(ExitStatus::from_reason(FailureReason::Timeout), ExitStatus::Timeout);
        assert_eq!(ExitStatus::from_reason(FailureReason::Cancelled), ExitStatus::Timeout);
        assert_eq!(
            ExitStatus::from_reason(FailureReason::MaxAttemptsExceeded),
            ExitStatus::AttemptsExhausted
        );
        assert_eq!(
            ExitStatus::from_reason(FailureReason::QueryError),
            ExitStatus::QueryError
        );
    }

    #[test]
    fn test_from_error() {
        let condition_err = Condition::parse("bogus").unwrap_err();
        assert_eq!(ExitStatus::from(&condition_err), ExitStatus::InvalidCondition);
        assert_eq!(ExitStatus::from(&condition_err).code(), 4);

        let backoff_err = CoreError::InvalidBackoffConfig("max < min".to_string());
        assert_eq!(ExitStatus::from(&backoff_err), ExitStatus::InvalidArguments);
        assert_eq!(ExitStatus::from(&backoff_err).code(), 5);

        let arg_err = CoreError::InvalidArgument("--limit".to_string());
        assert_eq!(ExitStatus::from_error(&arg_err).code(), 5);
    }
}
