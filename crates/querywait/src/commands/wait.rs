//! `querywait wait`: poll until the condition holds
//!
//! Wraps the core [`QueryWaiter`] with a spinner, optional per-attempt
//! lines, Ctrl-C handling and rendering of the final payload.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use querywait_core::{
    BackoffPolicy, Condition, Config, ExitStatus, FailureReason, ProgressCallback, ProgressEvent,
    QueryWaiter, WaitResult, WaitSpec,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::prepare_execution;
use crate::cli::WaitArgs;
use crate::error::{CliDiagnostic, Result};
use crate::output::print_output;

pub async fn handle_wait(config: &Config, args: &WaitArgs, verbose: bool) -> Result<ExitStatus> {
    // Condition before backoff and endpoint so a bad --for exits 4
    let condition = Condition::parse(&args.condition)?;
    let backoff = backoff_policy(config, args)?;
    let execution = prepare_execution(config, &args.exec)?;

    let spec = WaitSpec::new(execution.query, condition, execution.options)
        .with_timeout(args.timeout.unwrap_or_else(|| config.wait.timeout()))
        .with_max_attempts(args.max_attempts.unwrap_or(config.wait.max_attempts))
        .with_backoff(backoff)
        .quiet(args.quiet)
        .verbose(verbose);
    debug!("Wait spec: {:?}", spec);

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, stopping wait");
            interrupt.cancel();
        }
    });

    let mut waiter = QueryWaiter::new(execution.executor, spec);
    let progress_bar = (!args.quiet).then(|| spinner(&condition));
    if let Some(pb) = &progress_bar {
        waiter = waiter.with_progress(progress_callback(pb.clone(), verbose));
    }

    let result = waiter.wait(&cancel).await;
    cancel.cancel();

    let status = ExitStatus::from_result(&result);
    if !args.quiet && !result.success() {
        report_failure(&result, &condition);
    }
    if let Some(payload) = result.into_payload() {
        print_output(payload, args.exec.output)?;
    }

    Ok(status)
}

/// Flags over `[wait]` config over built-in defaults
fn backoff_policy(config: &Config, args: &WaitArgs) -> Result<BackoffPolicy> {
    let defaults = &config.wait;
    let policy = BackoffPolicy::new(
        args.min_interval.unwrap_or_else(|| defaults.min_interval()),
        args.max_interval.unwrap_or_else(|| defaults.max_interval()),
        args.backoff_multiplier.unwrap_or(defaults.multiplier),
    )?
    .with_initial_delay(args.initial_delay.unwrap_or_else(|| defaults.initial_delay()));
    Ok(policy)
}

fn spinner(condition: &Condition) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed_precise}]") {
        pb.set_style(style);
    }
    pb.set_message(format!("Waiting for {}", condition));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn progress_callback(pb: ProgressBar, verbose: bool) -> ProgressCallback {
    Box::new(move |event: ProgressEvent| match event {
        ProgressEvent::Started { condition } => {
            pb.set_message(format!("Waiting for {}", condition));
        }
        ProgressEvent::Attempt {
            attempt,
            record_count,
            satisfied,
            elapsed,
        } => {
            pb.set_message(format!(
                "Attempt {}: {} record(s)",
                attempt, record_count
            ));
            if verbose {
                pb.suspend(|| {
                    eprintln!(
                        "attempt {}: {} record(s), {} ({:.1}s)",
                        attempt,
                        record_count,
                        if satisfied { "satisfied" } else { "not satisfied" },
                        elapsed.as_secs_f64()
                    )
                });
            }
        }
        ProgressEvent::Retrying { attempt, delay } => {
            pb.suspend(|| eprintln!("attempt {}: retrying in {:?}", attempt, delay));
        }
        ProgressEvent::Finished {
            attempts,
            failure_reason,
            ..
        } => match failure_reason {
            FailureReason::None => {
                pb.finish_with_message(format!("\u{2713} Condition met after {} attempt(s)", attempts))
            }
            reason => pb.finish_with_message(format!("\u{2717} {} after {} attempt(s)", describe(reason), attempts)),
        },
    })
}

fn describe(reason: FailureReason) -> &'static str {
    match reason {
        FailureReason::None => "condition met",
        FailureReason::Timeout => "timed out",
        FailureReason::MaxAttemptsExceeded => "attempt budget exhausted",
        FailureReason::QueryError => "query failed",
        FailureReason::Cancelled => "interrupted",
    }
}

/// One-line stderr summary for a wait that did not succeed
fn report_failure<R>(result: &WaitResult<R>, condition: &Condition) {
    let message = format!(
        "wait for {} {} after {} attempt(s) in {:.1}s",
        condition,
        describe(result.failure_reason()),
        result.attempts(),
        result.elapsed().as_secs_f64()
    );
    let detail = match result.error() {
        Some(error) => error.to_string(),
        None => format!("last record count: {}", result.last_record_count()),
    };
    CliDiagnostic::error(&message).detail(&detail).print();
}
