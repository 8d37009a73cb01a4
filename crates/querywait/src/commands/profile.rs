//! Profile management command implementations
//!
//! Read-only commands work on the loaded (env-expanded) config. Commands
//! that change the file reload it without expansion so `${VAR}` references
//! are written back as they were.

use std::collections::BTreeMap;
use std::path::Path;

use colored::Colorize;
use querywait_core::{Config, ConfigError, Profile};
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::ProfileCommands;
use crate::error::Result;
use crate::output::{self, OutputFormat};

#[derive(Serialize)]
struct ProfileView<'a> {
    name: &'a str,
    endpoint: &'a str,
    request_timeout_secs: u64,
    is_default: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    headers: BTreeMap<&'a str, &'a str>,
}

/// Handle profile management commands
pub fn handle_profile_command(
    profile_cmd: &ProfileCommands,
    config: &Config,
    config_path: &Path,
) -> Result<()> {
    match profile_cmd {
        ProfileCommands::List => handle_list(config, config_path),
        ProfileCommands::Path => {
            println!("{}", config_path.display());
            Ok(())
        }
        ProfileCommands::Show { name, output } => handle_show(config, name, *output),
        ProfileCommands::Set {
            name,
            endpoint,
            headers,
            request_timeout_secs,
            default,
        } => handle_set(
            config_path,
            name,
            endpoint,
            headers,
            *request_timeout_secs,
            *default,
        ),
        ProfileCommands::Remove { name } => handle_remove(config_path, name),
        ProfileCommands::Default { name } => handle_default(config_path, name),
    }
}

fn handle_list(config: &Config, config_path: &Path) -> Result<()> {
    debug!("Listing all configured profiles");
    println!("Configuration file: {}", config_path.display());
    println!();

    let profiles = config.list_profiles();
    if profiles.is_empty() {
        info!("No profiles configured");
        println!("No profiles configured.");
        println!("Use 'querywait profile set' to create a profile.");
        return Ok(());
    }

    // The profile used when --profile is not given
    let active = config.resolve_profile(None).ok().flatten().map(|(name, _)| name);
    for (name, profile) in profiles {
        if active == Some(name.as_str()) {
            println!(
                "  {} {} {}",
                name.green().bold(),
                profile.endpoint,
                "(default)".dimmed()
            );
        } else {
            println!("  {} {}", name, profile.endpoint);
        }
    }
    Ok(())
}

fn handle_show(config: &Config, name: &str, format: OutputFormat) -> Result<()> {
    let profile = config
        .profiles
        .get(name)
        .ok_or_else(|| ConfigError::ProfileNotFound {
            name: name.to_string(),
        })?;

    let view = ProfileView {
        name,
        endpoint: &profile.endpoint,
        request_timeout_secs: profile.request_timeout_secs,
        is_default: config.default_profile.as_deref() == Some(name),
        headers: profile
            .headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect(),
    };
    output::print_output(&view, format)?;
    Ok(())
}

fn handle_set(
    config_path: &Path,
    name: &str,
    endpoint: &str,
    headers: &[(String, String)],
    request_timeout_secs: Option<u64>,
    make_default: bool,
) -> Result<()> {
    debug!("Setting profile: {}", name);
    let mut config = Config::load_raw_from_path(config_path)?;

    let mut profile = Profile::new(endpoint);
    profile.headers = headers.iter().cloned().collect();
    if let Some(secs) = request_timeout_secs {
        profile.request_timeout_secs = secs;
    }

    let existed = config.profiles.contains_key(name);
    config.set_profile(name.to_string(), profile);
    if make_default {
        config.default_profile = Some(name.to_string());
    }
    config.save_to_path(config_path)?;

    info!("Saved profile '{}' to {}", name, config_path.display());
    println!(
        "Profile '{}' {}{}",
        name,
        if existed { "updated" } else { "created" },
        if make_default { " and set as default" } else { "" }
    );
    Ok(())
}

fn handle_remove(config_path: &Path, name: &str) -> Result<()> {
    debug!("Removing profile: {}", name);
    let mut config = Config::load_raw_from_path(config_path)?;

    let was_default = config.default_profile.as_deref() == Some(name);
    if config.remove_profile(name).is_none() {
        return Err(ConfigError::ProfileNotFound {
            name: name.to_string(),
        }
        .into());
    }
    config.save_to_path(config_path)?;

    println!("Profile '{}' removed", name);
    if was_default {
        println!("Note: '{}' was the default profile; no default is set now.", name);
    }
    Ok(())
}

fn handle_default(config_path: &Path, name: &str) -> Result<()> {
    let mut config = Config::load_raw_from_path(config_path)?;
    if !config.profiles.contains_key(name) {
        return Err(ConfigError::ProfileNotFound {
            name: name.to_string(),
        }
        .into());
    }

    config.default_profile = Some(name.to_string());
    config.save_to_path(config_path)?;
    println!("Default profile set to '{}'", name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn set(path: &Path, name: &str, default: bool) {
        handle_set(
            path,
            name,
            &format!("http://{}.example/query", name),
            &[("X-Api-Key".to_string(), "${KEY}".to_string())],
            Some(5),
            default,
        )
        .unwrap();
    }

    #[test]
    fn test_set_creates_file_and_profile() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        set(&path, "local", true);

        let config = Config::load_raw_from_path(&path).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("local"));
        let profile = &config.profiles["local"];
        assert_eq!(profile.endpoint, "http://local.example/query");
        assert_eq!(profile.request_timeout_secs, 5);
        assert_eq!(profile.headers["X-Api-Key"], "${KEY}");
    }

    #[test]
    fn test_remove_and_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        set(&path, "a", true);
        set(&path, "b", false);

        handle_default(&path, "b").unwrap();
        assert_eq!(
            Config::load_raw_from_path(&path).unwrap().default_profile.as_deref(),
            Some("b")
        );

        handle_remove(&path, "b").unwrap();
        let config = Config::load_raw_from_path(&path).unwrap();
        assert!(config.default_profile.is_none());
        assert_eq!(config.profiles.len(), 1);
    }

    #[test]
    fn test_missing_profile_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        assert_eq!(handle_remove(&path, "ghost").unwrap_err().exit_status().code(), 5);
        assert!(handle_default(&path, "ghost").is_err());
        assert!(handle_show(&Config::default(), "ghost", OutputFormat::Json).is_err());
    }
}
