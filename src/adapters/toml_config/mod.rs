// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::errors::*;
use crate::ports::LogLevel;

/// Environment variables that override file values, with their config keys
pub const ENV_OVERRIDES: [(&str, &str); 6] = [
    ("MERGEX_FFMPEG_PATH", "ffmpeg_path"),
    ("MERGEX_CACHE_DIR", "cache_dir"),
    ("MERGEX_OUTPUT_EXTENSION", "output_extension"),
    ("MERGEX_TIMEOUT_SECS", "timeout_secs"),
    ("MERGEX_KEEP_FAILED_OUTPUT", "keep_failed_output"),
    ("MERGEX_LOG_LEVEL", "log_level"),
];

/// Runtime configuration for the merger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergerConfig {
    /// Engine binary
    pub ffmpeg_path: PathBuf,
    /// Where temp outputs are allocated; system temp dir when unset
    pub cache_dir: Option<PathBuf>,
    pub output_extension: String,
    /// Engine deadline in seconds, `0` disables it
    pub timeout_secs: u64,
    /// Leave partially written outputs behind on failure
    pub keep_failed_output: bool,
    pub log_level: String,
}

impl Default for MergerConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            cache_dir: None,
            output_extension: "mp4".to_string(),
            timeout_secs: 1800,
            keep_failed_output: false,
            log_level: "info".to_string(),
        }
    }
}

impl MergerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn log_level(&self) -> Result<LogLevel, DomainError> {
        LogLevel::parse(&self.log_level)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    merger: MergerConfig,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter {
    config: MergerConfig,
    config_file_path: Option<PathBuf>,
}

impl TomlConfigAdapter {
    /// Create new TOML config adapter holding the defaults
    pub fn new() -> Self {
        Self {
            config: MergerConfig::default(),
            config_file_path: None,
        }
    }

    /// Config files probed when none is given explicitly
    pub fn default_search_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from("mergex.toml"),
            PathBuf::from("config").join("mergex.toml"),
        ]
    }

    pub fn config(&self) -> &MergerConfig {
        &self.config
    }

    pub fn into_config(self) -> MergerConfig {
        self.config
    }

    pub fn config_file_path(&self) -> Option<&Path> {
        self.config_file_path.as_deref()
    }

    /// Load configuration from file
    pub fn load_config(&mut self, file_path: &Path) -> Result<(), DomainError> {
        let content = std::fs::read_to_string(file_path).map_err(|e| {
            DomainError::ConfigError(format!(
                "Failed to read config file {}: {}",
                file_path.display(),
                e
            ))
        })?;

        self.load_str(&content)?;
        self.config_file_path = Some(file_path.to_path_buf());
        info!("Loaded configuration from {}", file_path.display());
        Ok(())
    }

    /// Parse a `[merger]` table, replacing the current values
    pub fn load_str(&mut self, toml_content: &str) -> Result<(), DomainError> {
        let parsed: ConfigFile = toml::from_str(toml_content)
            .map_err(|e| DomainError::ConfigError(format!("Failed to parse TOML config: {}", e)))?;
        self.config = parsed.merger;
        Ok(())
    }

    /// Set one value by key, parsing it into the field's type
    pub fn set_config(&mut self, key: &str, value: &str) -> Result<(), DomainError> {
        let config = &mut self.config;
        match key {
            "ffmpeg_path" => config.ffmpeg_path = PathBuf::from(value),
            "cache_dir" => {
                config.cache_dir = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                }
            }
            "output_extension" => {
                config.output_extension = value.trim_start_matches('.').to_string()
            }
            "timeout_secs" => {
                config.timeout_secs = value.parse().map_err(|e| {
                    DomainError::ConfigError(format!("Invalid timeout_secs '{}': {}", value, e))
                })?
            }
            "keep_failed_output" => {
                config.keep_failed_output = value.parse().map_err(|e| {
                    DomainError::ConfigError(format!(
                        "Invalid boolean value for keep_failed_output '{}': {}",
                        value, e
                    ))
                })?
            }
            "log_level" => config.log_level = value.to_string(),
            _ => {
                return Err(DomainError::ConfigError(format!(
                    "Unknown configuration key: {}",
                    key
                )))
            }
        }
        Ok(())
    }

    /// Apply `MERGEX_*` overrides using `lookup` to read variables.
    ///
    /// Returns how many overrides were applied.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<usize, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;
        for (env_var, key) in ENV_OVERRIDES {
            if let Some(value) = lookup(env_var) {
                info!("Found environment override: {} = {}", env_var, value);
                self.set_config(key, &value)?;
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Validate configuration
    pub fn validate_config(&self) -> Result<(), DomainError> {
        let config = &self.config;

        config.log_level()?;

        if config.ffmpeg_path.as_os_str().is_empty() {
            return Err(DomainError::ConfigError(
                "ffmpeg_path cannot be empty".to_string(),
            ));
        }

        if config.output_extension.is_empty()
            || !config
                .output_extension
                .chars()
                .all(|c| c.is_ascii_alphanumeric())
        {
            return Err(DomainError::ConfigError(format!(
                "Invalid output_extension '{}'",
                config.output_extension
            )));
        }

        Ok(())
    }
}

impl Default for TomlConfigAdapter {
    fn default() -> Self {
        Self::new()
    }
}
