//! Configuration initialization and hierarchy management

use std::path::PathBuf;

use tracing::info;

use crate::adapters::{MergerConfig, TomlConfigAdapter};
use crate::cli::Cli;
use crate::domain::errors::DomainError;

/// Settings the command line can override
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub log_level: Option<String>,
    pub ffmpeg: Option<PathBuf>,
    pub timeout: Option<u64>,
    pub keep_failed: bool,
}

impl From<&Cli> for CliOverrides {
    fn from(cli: &Cli) -> Self {
        Self {
            config: cli.config.clone(),
            log_level: cli.log_level.clone(),
            ffmpeg: cli.ffmpeg.clone(),
            timeout: cli.timeout,
            keep_failed: cli.keep_failed,
        }
    }
}

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> Result<MergerConfig, DomainError> {
    resolve_configuration(&CliOverrides::from(cli), |name| std::env::var(name).ok())
}

/// Resolve the hierarchy with an explicit environment lookup
pub fn resolve_configuration<F>(
    overrides: &CliOverrides,
    env_lookup: F,
) -> Result<MergerConfig, DomainError>
where
    F: Fn(&str) -> Option<String>,
{
    info!("Initializing configuration hierarchy");

    // Step 1: defaults come from TomlConfigAdapter::new()
    let mut adapter = TomlConfigAdapter::new();

    // Step 2: file
    load_config_file(&mut adapter, overrides.config.as_ref())?;

    // Step 3: environment
    let env_overrides = adapter.apply_env_overrides(env_lookup)?;
    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }

    // Step 4: command line
    apply_cli_configuration_overrides(&mut adapter, overrides)?;

    adapter.validate_config()?;
    info!("Configuration hierarchy initialized successfully");
    Ok(adapter.into_config())
}

/// An explicit path must exist; otherwise the first default path found is used
fn load_config_file(
    adapter: &mut TomlConfigAdapter,
    explicit: Option<&PathBuf>,
) -> Result<(), DomainError> {
    if let Some(path) = explicit {
        return adapter.load_config(path);
    }

    match TomlConfigAdapter::default_search_paths()
        .into_iter()
        .find(|path| path.exists())
    {
        Some(path) => adapter.load_config(&path),
        None => {
            info!("No configuration file found, using defaults");
            Ok(())
        }
    }
}

fn apply_cli_configuration_overrides(
    adapter: &mut TomlConfigAdapter,
    overrides: &CliOverrides,
) -> Result<(), DomainError> {
    let mut cli_overrides = 0;

    if let Some(level) = &overrides.log_level {
        adapter.set_config("log_level", level)?;
        cli_overrides += 1;
    }
    if let Some(ffmpeg) = &overrides.ffmpeg {
        adapter.set_config("ffmpeg_path", &ffmpeg.to_string_lossy())?;
        cli_overrides += 1;
    }
    if let Some(timeout) = overrides.timeout {
        adapter.set_config("timeout_secs", &timeout.to_string())?;
        cli_overrides += 1;
    }
    if overrides.keep_failed {
        adapter.set_config("keep_failed_output", "true")?;
        cli_overrides += 1;
    }

    if cli_overrides > 0 {
        info!("Applied {} CLI configuration overrides", cli_overrides);
    }
    Ok(())
}
