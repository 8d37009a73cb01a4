//! CLI structure and command definitions
//!
//! `querywait wait` is the heart of the tool; `query` runs the same executor
//! once, and `profile` manages the endpoints both of them use.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;

/// Wait until a query against an eventually consistent backend satisfies a condition
#[derive(Parser, Debug)]
#[command(name = "querywait")]
#[command(
    version,
    about = "Poll a query endpoint until its result satisfies a condition"
)]
#[command(long_about = "
Poll a query endpoint until its result satisfies a condition

EXAMPLES:
    # Wait until at least one matching record shows up
    querywait wait --for any 'service:checkout level:error'

    # Wait for exactly 3 records, giving up after 2 minutes
    querywait wait --for count=3 --timeout 2m 'order_id:{{id}}' --var id=1234

    # Wait until a backlog drains, checking at most 10 times
    querywait wait --for none --max-attempts 10 'queue:pending'

    # Run a query once and print the records as YAML
    querywait query 'status:failed' -o yaml

EXIT CODES:
    0  condition satisfied
    1  timed out (or interrupted)
    2  attempt budget exhausted
    3  query failed
    4  invalid condition
    5  invalid backoff configuration or arguments
")]
pub struct Cli {
    /// Path to alternate configuration file
    #[arg(long, global = true, env = "QUERYWAIT_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Enable verbose output (repeat for more log detail)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll a query until a condition on its record count holds
    #[command(visible_alias = "w")]
    #[command(after_help = "CONDITIONS:
    count=N       exactly N records
    count-gte=N   at least N records
    count-gt=N    more than N records
    count-lte=N   at most N records
    count-lt=N    fewer than N records
    any           at least one record
    none          no records

DURATIONS:
    500ms, 5s, 2m, 1h, or a bare number of seconds (0 disables --timeout)
")]
    Wait(WaitArgs),

    /// Execute a query once and print its records
    #[command(visible_alias = "q")]
    Query(ExecArgs),

    /// Profile management
    #[command(subcommand, visible_alias = "prof", visible_alias = "pr")]
    #[command(after_help = "EXAMPLES:
    # Create a profile
    querywait profile set local --endpoint http://localhost:8080/query

    # Attach a header (supports ${ENV_VAR} expansion in the config file)
    querywait profile set prod --endpoint https://search.example.com/query --header 'X-Api-Key=${SEARCH_KEY}'

    # List all profiles
    querywait profile list
")]
    Profile(ProfileCommands),

    /// Generate shell completions
    #[command(visible_alias = "comp")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments shared by everything that executes a query
#[derive(Args, Debug, Clone)]
pub struct ExecArgs {
    /// Query text; `{{name}}` placeholders are filled from --var
    pub query: String,

    /// Profile to use for this command
    #[arg(long, short, env = "QUERYWAIT_PROFILE")]
    pub profile: Option<String>,

    /// Query endpoint URL (overrides the profile's endpoint)
    #[arg(long, env = "QUERYWAIT_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Maximum number of records the backend should return
    #[arg(long)]
    pub limit: Option<u32>,

    /// Template variable for the query
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub vars: Vec<(String, String)>,

    /// Extra request header (overrides the profile's headers)
    #[arg(long = "header", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub headers: Vec<(String, String)>,

    /// Per-request timeout
    #[arg(long, value_parser = parse_duration)]
    pub request_timeout: Option<Duration>,

    /// Output format for the records
    #[arg(long, short = 'o', value_enum, default_value = "json")]
    pub output: OutputFormat,
}

/// Arguments for `querywait wait`
///
/// Unset wait settings fall back to the config file's `[wait]` section.
#[derive(Args, Debug, Clone)]
pub struct WaitArgs {
    /// Success condition (count=N, count-gte=N, count-gt=N, count-lte=N, count-lt=N, any, none)
    #[arg(long = "for", value_name = "CONDITION")]
    pub condition: String,

    /// Give up after this long (0 = never)
    #[arg(long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Give up after this many executions (0 = unlimited)
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Delay before the first execution
    #[arg(long, value_parser = parse_duration)]
    pub initial_delay: Option<Duration>,

    /// Delay after the first unsatisfied attempt
    #[arg(long, value_parser = parse_duration)]
    pub min_interval: Option<Duration>,

    /// Upper bound for the delay between attempts
    #[arg(long, value_parser = parse_duration)]
    pub max_interval: Option<Duration>,

    /// Growth factor applied to the delay after each unsatisfied attempt
    #[arg(long)]
    pub backoff_multiplier: Option<f64>,

    /// Suppress progress output
    #[arg(long, short)]
    pub quiet: bool,

    #[command(flatten)]
    pub exec: ExecArgs,
}

/// Profile subcommands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List all configured profiles
    #[command(visible_alias = "ls", visible_alias = "l")]
    List,

    /// Show the path to the configuration file
    Path,

    /// Show details of a specific profile
    #[command(visible_alias = "sh", visible_alias = "get")]
    Show {
        /// Profile name to show
        name: String,

        /// Output format
        #[arg(long, short = 'o', value_enum, default_value = "table")]
        output: OutputFormat,
    },

    /// Set or create a profile
    #[command(visible_alias = "add", visible_alias = "create")]
    Set {
        /// Profile name
        name: String,

        /// Query endpoint URL
        #[arg(long)]
        endpoint: String,

        /// Request header stored with the profile
        #[arg(long = "header", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        headers: Vec<(String, String)>,

        /// Per-request timeout in seconds
        #[arg(long)]
        request_timeout_secs: Option<u64>,

        /// Make this the default profile
        #[arg(long)]
        default: bool,
    },

    /// Remove a profile
    #[command(visible_alias = "rm", visible_alias = "delete")]
    Remove {
        /// Profile name to remove
        name: String,
    },

    /// Set the default profile
    #[command(visible_alias = "def")]
    Default {
        /// Profile name
        name: String,
    },
}

/// Supported shells for completion generation
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bourne Again Shell
    Bash,
    /// Z Shell
    Zsh,
    /// Friendly Interactive Shell
    Fish,
    /// PowerShell
    #[value(name = "powershell", alias = "power-shell")]
    PowerShell,
    /// Elvish
    Elvish,
}

/// Parse `KEY=VALUE`
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

/// Parse `500ms`, `5s`, `2m`, `1h` or a bare number of seconds
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let (number, scale) = if let Some(n) = s.strip_suffix("ms") {
        (n, 0.001)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1.0)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60.0)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 3600.0)
    } else {
        (s, 1.0)
    };

    let value: f64 = number
        .parse()
        .map_err(|_| format!("invalid duration '{}' (examples: 500ms, 5s, 2m, 1h)", s))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("duration must be a non-negative number, got '{}'", s));
    }
    Duration::try_from_secs_f64(value * scale).map_err(|e| format!("invalid duration '{}': {}", s, e))
}
