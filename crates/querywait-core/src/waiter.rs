//! The polling loop: run a query until its result satisfies a condition
//!
//! A [`QueryWaiter`] executes the query, evaluates the [`Condition`] on the
//! number of records returned and, if unsatisfied, sleeps according to the
//! [`BackoffPolicy`] before trying again. Every call to
//! [`QueryWaiter::wait`] ends in exactly one terminal state, reported by a
//! [`WaitResult`]:
//!
//! - succeeded: the condition held for the last execution
//! - timed out: the overall deadline elapsed
//! - attempts exhausted: `max_attempts` executions ran without success
//! - query error: the executor failed. This is never retried.
//! - cancelled: the caller cancelled the token
//!
//! Both suspension points (the executor call and the inter-attempt sleep)
//! race against the deadline and the cancellation token, so a long interval
//! or a hung query cannot overshoot the timeout.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backoff::BackoffPolicy;
use crate::condition::Condition;
use crate::progress::{ProgressCallback, ProgressEvent, emit};

/// Runs one opaque query and returns its records
///
/// The waiter only looks at how many records came back; record contents
/// are handed to the caller untouched on success. No concurrent calls are
/// issued by a single wait.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// A single returned record
    type Record: Send;
    /// Pass-through execution options
    type Options: Send + Sync;
    /// Execution failure
    type Error: std::error::Error + Send + Sync + 'static;

    async fn execute(
        &self,
        query: &str,
        options: &Self::Options,
    ) -> Result<Vec<Self::Record>, Self::Error>;
}

/// Everything a single wait needs, passed explicitly into the waiter
#[derive(Debug, Clone)]
pub struct WaitSpec<O> {
    /// Already rendered query text
    pub query: String,
    pub condition: Condition,
    /// Overall deadline; zero means unlimited
    pub timeout: Duration,
    /// Execution budget; zero means unlimited
    pub max_attempts: u32,
    pub backoff: BackoffPolicy,
    /// Handed to the executor unchanged
    pub options: O,
    /// Suppress all progress events
    pub quiet: bool,
    /// Also emit an event for every backoff sleep
    pub verbose: bool,
}

impl<O> WaitSpec<O> {
    /// Unlimited wait with the default backoff policy
    pub fn new(query: impl Into<String>, condition: Condition, options: O) -> Self {
        Self {
            query: query.into(),
            condition,
            timeout: Duration::ZERO,
            max_attempts: 0,
            backoff: BackoffPolicy::default(),
            options,
            quiet: false,
            verbose: false,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    #[must_use]
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Why a wait did not succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    None,
    Timeout,
    MaxAttemptsExceeded,
    QueryError,
    Cancelled,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureReason::None => "none",
            FailureReason::Timeout => "timeout",
            FailureReason::MaxAttemptsExceeded => "max_attempts_exceeded",
            FailureReason::QueryError => "query_error",
            FailureReason::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// The immutable outcome of one [`QueryWaiter::wait`] call
#[derive(Debug, Clone)]
pub struct WaitResult<R> {
    failure_reason: FailureReason,
    attempts: u32,
    last_record_count: u64,
    elapsed: Duration,
    last_payload: Option<Vec<R>>,
    error: Option<String>,
}

impl<R> WaitResult<R> {
    pub fn success(&self) -> bool {
        self.failure_reason == FailureReason::None
    }

    pub fn failure_reason(&self) -> FailureReason {
        self.failure_reason
    }

    /// Number of query executions started
    ///
    /// This is 0 when the deadline or cancellation arrived before the first
    /// execution, for example during the initial delay.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Record count of the last completed execution (0 if none completed)
    pub fn last_record_count(&self) -> u64 {
        self.last_record_count
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Records of the satisfying execution; only present on success
    pub fn last_payload(&self) -> Option<&[R]> {
        self.last_payload.as_deref()
    }

    pub fn into_payload(self) -> Option<Vec<R>> {
        self.last_payload
    }

    /// Executor error text when the wait ended with a query error
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// What cut a suspension point short
#[derive(Debug, Clone, Copy)]
enum Interrupt {
    Deadline,
    Cancelled,
}

impl From<Interrupt> for FailureReason {
    fn from(interrupt: Interrupt) -> Self {
        match interrupt {
            Interrupt::Deadline => FailureReason::Timeout,
            Interrupt::Cancelled => FailureReason::Cancelled,
        }
    }
}

/// Mutable counters owned by a single wait call
struct LoopState {
    start: Instant,
    deadline: Option<Instant>,
    attempts: u32,
    last_record_count: u64,
}

/// Polls a [`QueryExecutor`] until a [`WaitSpec`]'s condition holds
pub struct QueryWaiter<E: QueryExecutor> {
    executor: E,
    spec: WaitSpec<E::Options>,
    on_progress: Option<ProgressCallback>,
}

impl<E: QueryExecutor> QueryWaiter<E> {
    pub fn new(executor: E, spec: WaitSpec<E::Options>) -> Self {
        Self {
            executor,
            spec,
            on_progress: None,
        }
    }

    /// Attach a progress callback
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn spec(&self) -> &WaitSpec<E::Options> {
        &self.spec
    }

    /// Run the polling loop to a terminal state
    ///
    /// Cancelling `cancel` stops the wait promptly with
    /// [`FailureReason::Cancelled`], even in the middle of a query or a
    /// backoff sleep.
    pub async fn wait(&self, cancel: &CancellationToken) -> WaitResult<E::Record> {
        let spec = &self.spec;
        let start = Instant::now();
        let mut state = LoopState {
            start,
            // A timeout past the end of the clock is no deadline at all
            deadline: if spec.timeout.is_zero() {
                None
            } else {
                start.checked_add(spec.timeout)
            },
            attempts: 0,
            last_record_count: 0,
        };
        let mut schedule = spec.backoff.schedule();

        self.notify(ProgressEvent::Started {
            condition: spec.condition.to_string(),
        });
        debug!(
            "Waiting for {} (timeout: {:?}, max attempts: {})",
            spec.condition, spec.timeout, spec.max_attempts
        );

        let initial_delay = schedule.initial_delay();
        if !initial_delay.is_zero() {
            debug!("Initial delay of {:?} before first attempt", initial_delay);
            if let Err(interrupt) = race(sleep(initial_delay), state.deadline, cancel).await {
                return self.finish(&state, interrupt.into(), None, None);
            }
        }

        loop {
            if cancel.is_cancelled() {
                return self.finish(&state, FailureReason::Cancelled, None, None);
            }
            if state.deadline.is_some_and(|d| Instant::now() >= d) {
                return self.finish(&state, FailureReason::Timeout, None, None);
            }
            if self.budget_spent(&state) {
                return self.finish(&state, FailureReason::MaxAttemptsExceeded, None, None);
            }

            state.attempts += 1;
            debug!("Attempt {}: executing query", state.attempts);

            let records = match race(
                self.executor.execute(&spec.query, &spec.options),
                state.deadline,
                cancel,
            )
            .await
            {
                Err(interrupt) => return self.finish(&state, interrupt.into(), None, None),
                Ok(Err(e)) => {
                    warn!("Attempt {}: query failed: {}", state.attempts, e);
                    return self.finish(
                        &state,
                        FailureReason::QueryError,
                        None,
                        Some(e.to_string()),
                    );
                }
                Ok(Ok(records)) => records,
            };

            let count = records.len() as u64;
            let satisfied = spec.condition.satisfied_by(count);
            state.last_record_count = count;
            debug!(
                "Attempt {}: {} record(s), condition {} {}",
                state.attempts,
                count,
                spec.condition,
                if satisfied { "satisfied" } else { "not satisfied" }
            );
            self.notify(ProgressEvent::Attempt {
                attempt: state.attempts,
                record_count: count,
                satisfied,
                elapsed: state.start.elapsed(),
            });

            if satisfied {
                return self.finish(&state, FailureReason::None, Some(records), None);
            }

            // No point sleeping when no further attempt is allowed
            if self.budget_spent(&state) {
                return self.finish(&state, FailureReason::MaxAttemptsExceeded, None, None);
            }

            let delay = schedule.next_delay();
            if spec.verbose {
                self.notify(ProgressEvent::Retrying {
                    attempt: state.attempts,
                    delay,
                });
            }
            debug!("Attempt {}: sleeping {:?}", state.attempts, delay);
            if let Err(interrupt) = race(sleep(delay), state.deadline, cancel).await {
                return self.finish(&state, interrupt.into(), None, None);
            }
        }
    }

    fn budget_spent(&self, state: &LoopState) -> bool {
        self.spec.max_attempts != 0 && state.attempts >= self.spec.max_attempts
    }

    fn notify(&self, event: ProgressEvent) {
        if !self.spec.quiet {
            emit(&self.on_progress, event);
        }
    }

    fn finish(
        &self,
        state: &LoopState,
        failure_reason: FailureReason,
        last_payload: Option<Vec<E::Record>>,
        error: Option<String>,
    ) -> WaitResult<E::Record> {
        let elapsed = state.start.elapsed();
        match failure_reason {
            FailureReason::None => info!(
                "Condition {} satisfied after {} attempt(s) in {:?}",
                self.spec.condition, state.attempts, elapsed
            ),
            reason => info!(
                "Wait ended ({}) after {} attempt(s) in {:?}",
                reason, state.attempts, elapsed
            ),
        }
        self.notify(ProgressEvent::Finished {
            attempts: state.attempts,
            failure_reason,
            elapsed,
        });

        WaitResult {
            failure_reason,
            attempts: state.attempts,
            last_record_count: state.last_record_count,
            elapsed,
            last_payload,
            error,
        }
    }
}

async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Resolve when the deadline passes; never when there is none
async fn deadline_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Run `fut` unless cancellation or the deadline gets there first
async fn race<F: Future>(
    fut: F,
    deadline: Option<Instant>,
    cancel: &CancellationToken,
) -> Result<F::Output, Interrupt> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Interrupt::Cancelled),
        _ = deadline_elapsed(deadline) => Err(Interrupt::Deadline),
        output = fut => Ok(output),
    }
}
