//! Progress events emitted while a wait is running
//!
//! The waiter never prints. Callers that want a spinner or per-attempt
//! lines pass a [`ProgressCallback`]; callers that don't pass `None`.

use std::time::Duration;

use crate::waiter::FailureReason;

/// Progress events emitted during a wait
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// The wait has started
    Started { condition: String },
    /// A query execution finished and its count was evaluated
    Attempt {
        attempt: u32,
        record_count: u64,
        satisfied: bool,
        elapsed: Duration,
    },
    /// Sleeping before the next attempt (only emitted in verbose mode)
    Retrying { attempt: u32, delay: Duration },
    /// The wait reached a terminal state
    Finished {
        attempts: u32,
        failure_reason: FailureReason,
        elapsed: Duration,
    },
}

/// Callback type for progress updates
///
/// The CLI uses this to drive its spinner and verbose output.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Helper to emit progress events
pub(crate) fn emit(callback: &Option<ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}
