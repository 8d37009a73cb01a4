use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::{generate, shells};
use querywait_core::{Condition, Config, ExitStatus};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod error;
mod executor;
mod output;
mod template;

use cli::{Cli, Commands};
use error::QueryWaitError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help / --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            return ExitStatus::InvalidArguments.into();
        }
    };

    // Initialize tracing based on verbosity level
    init_tracing(cli.verbose);

    match execute_command(&cli).await {
        Ok(status) => status.into(),
        Err(e) => {
            e.print_diagnostic();
            e.exit_status().into()
        }
    }
}

fn init_tracing(verbose: u8) {
    // RUST_LOG wins over the verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "querywait=warn,querywait_core=warn",
            1 => "querywait=info,querywait_core=info",
            2 => "querywait=debug,querywait_core=debug",
            _ => "querywait=trace,querywait_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    // stdout carries records only
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

/// Config file location: `--config-file` or the platform default
fn config_location(cli: &Cli) -> Result<PathBuf, QueryWaitError> {
    match &cli.config_file {
        Some(path) => Ok(PathBuf::from(path)),
        None => Ok(Config::config_path()?),
    }
}

async fn execute_command(cli: &Cli) -> Result<ExitStatus, QueryWaitError> {
    info!("Command: {}", format_command(&cli.command));

    if let Commands::Completions { shell } = &cli.command {
        generate_completions(*shell);
        return Ok(ExitStatus::Success);
    }

    // A bad --for exits 4 even when the config file is broken
    if let Commands::Wait(args) = &cli.command {
        Condition::parse(&args.condition)?;
    }

    let config_path = config_location(cli)?;
    debug!("Loading config from {}", config_path.display());
    let config = Config::load_from_path(&config_path)?;

    match &cli.command {
        Commands::Wait(args) => commands::wait::handle_wait(&config, args, cli.verbose > 0).await,
        Commands::Query(args) => {
            commands::query::handle_query(&config, args).await?;
            Ok(ExitStatus::Success)
        }
        Commands::Profile(cmd) => {
            commands::profile::handle_profile_command(cmd, &config, &config_path)?;
            Ok(ExitStatus::Success)
        }
        Commands::Completions { .. } => Ok(ExitStatus::Success),
    }
}

/// Generate shell completions
fn generate_completions(shell: cli::Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    match shell {
        cli::Shell::Bash => generate(shells::Bash, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Zsh => generate(shells::Zsh, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Fish => generate(shells::Fish, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::PowerShell => {
            generate(shells::PowerShell, &mut cmd, name, &mut std::io::stdout())
        }
        cli::Shell::Elvish => generate(shells::Elvish, &mut cmd, name, &mut std::io::stdout()),
    }
}

/// Format command for human-readable logging (header values left out)
fn format_command(command: &Commands) -> String {
    match command {
        Commands::Wait(args) => format!("wait --for {} '{}'", args.condition, args.exec.query),
        Commands::Query(args) => format!("query '{}'", args.query),
        Commands::Completions { shell } => format!("completions {:?}", shell),
        Commands::Profile(cmd) => {
            use cli::ProfileCommands;
            match cmd {
                ProfileCommands::List => "profile list".to_string(),
                ProfileCommands::Path => "profile path".to_string(),
                ProfileCommands::Show { name, .. } => format!("profile show {}", name),
                ProfileCommands::Set { name, .. } => {
                    format!("profile set {} [headers redacted]", name)
                }
                ProfileCommands::Remove { name } => format!("profile remove {}", name),
                ProfileCommands::Default { name } => format!("profile default {}", name),
            }
        }
    }
}
