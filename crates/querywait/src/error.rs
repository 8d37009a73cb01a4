//! Error types for querywait
//!
//! Every error the binary can hit maps to exactly one [`ExitStatus`], so
//! scripts can branch on the exit code alone.

use colored::Colorize;
use querywait_core::{ConfigError, CoreError, ExitStatus};
use thiserror::Error;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: Invalid condition 'count>3'
///
///   tip: conditions look like count=N, count-gte=N, any or none
/// ```
pub struct CliDiagnostic {
    message: String,
    detail: Option<String>,
    tips: Vec<String>,
}

impl CliDiagnostic {
    /// Start a new error diagnostic with the given message.
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            detail: None,
            tips: Vec::new(),
        }
    }

    /// Add a detail line below the error message.
    pub fn detail(mut self, text: &str) -> Self {
        self.detail = Some(text.to_string());
        self
    }

    /// Add a tip.
    pub fn tip(mut self, description: &str) -> Self {
        self.tips.push(description.to_string());
        self
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        if let Some(detail) = &self.detail {
            eprintln!("  {}", detail);
        }

        for description in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", description);
        }
    }
}

/// Main error type for the querywait binary
#[derive(Error, Debug)]
pub enum QueryWaitError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("No query endpoint configured")]
    NoEndpoint,

    #[error("Query failed: {message}")]
    QueryFailed { message: String },

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

/// Result type for querywait operations
pub type Result<T> = std::result::Result<T, QueryWaitError>;

impl QueryWaitError {
    /// The process exit status for this error
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            QueryWaitError::Core(err) => ExitStatus::from_error(err),
            QueryWaitError::QueryFailed { .. } => ExitStatus::QueryError,
            QueryWaitError::NoEndpoint | QueryWaitError::OutputError { .. } => {
                ExitStatus::InvalidArguments
            }
        }
    }

    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            QueryWaitError::Core(CoreError::InvalidCondition { .. }) => vec![
                "Conditions look like count=3, count-gte=1, count-lt=10, any or none".to_string(),
                "See all conditions: querywait wait --help".to_string(),
            ],
            QueryWaitError::Core(CoreError::InvalidBackoffConfig(_)) => vec![
                "--max-interval must be at least --min-interval".to_string(),
                "--backoff-multiplier must be greater than 1.0".to_string(),
            ],
            QueryWaitError::Core(CoreError::Config(ConfigError::ProfileNotFound { name })) => vec![
                "List available profiles: querywait profile list".to_string(),
                format!(
                    "Create profile '{}': querywait profile set {} --endpoint <url>",
                    name, name
                ),
            ],
            QueryWaitError::NoEndpoint => vec![
                "Pass an endpoint: --endpoint http://localhost:8080/query".to_string(),
                "Or create a profile: querywait profile set <name> --endpoint <url>".to_string(),
            ],
            _ => vec![],
        }
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&self.to_string());

        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion);
        }

        diag.print();
    }
}

impl From<ConfigError> for QueryWaitError {
    fn from(err: ConfigError) -> Self {
        QueryWaitError::Core(CoreError::Config(err))
    }
}

impl From<anyhow::Error> for QueryWaitError {
    fn from(err: anyhow::Error) -> Self {
        QueryWaitError::OutputError {
            message: err.to_string(),
        }
    }
}
