//! Configuration loading utilities

use crate::Config;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable pointing at an explicit configuration file.
pub const CONFIG_PATH_VAR: &str = "CONCIERGE_CONFIG_PATH";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        /// Variable name
        var: String,
        /// Underlying parse failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for concierge_common::ConciergeError {
    fn from(err: ConfigError) -> Self {
        Self::config(err.to_string())
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides
    ///
    /// # Errors
    ///
    /// Fails on unreadable files, malformed YAML, bad overrides or invalid values.
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config = Self::parse(&content)?;

        Self::apply_env_overrides(&mut config)?;
        config.validate_all()?;

        info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Load configuration from the conventional locations, falling back to defaults
    ///
    /// # Errors
    ///
    /// See [`ConfigLoader::load_config`].
    pub fn load() -> Result<Config, ConfigError> {
        if let Ok(config_path) = env::var(CONFIG_PATH_VAR) {
            return Self::load_config(config_path);
        }
        for candidate in ["config.yaml", "config.yml"] {
            if Path::new(candidate).exists() {
                return Self::load_config(candidate);
            }
        }

        debug!("No configuration file found, using defaults");
        let mut config = Config::default();
        Self::apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Parse YAML text into a configuration without overrides or validation
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed YAML.
    pub fn parse(content: &str) -> Result<Config, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply process environment overrides to configuration
    ///
    /// # Errors
    ///
    /// Returns an error naming the variable whose value does not parse.
    pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides(config, |name| env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source
    ///
    /// # Errors
    ///
    /// Returns an error naming the variable whose value does not parse.
    pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Discord configuration overrides
        if let Some(token) = lookup("DISCORD_TOKEN") {
            config.discord.token = token;
        }
        if let Some(prefix) = lookup("DISCORD_PREFIX") {
            config.discord.prefix = prefix;
        }

        // AI configuration overrides
        if let Some(api_key) = lookup("GOOGLE_API_KEY") {
            config.ai.api_key = Some(api_key);
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            config.ai.model = model;
        }

        // Storage and workflow overrides
        if let Some(data_dir) = lookup("CONCIERGE_DATA_DIR") {
            config.storage.data_dir = data_dir;
        }
        if let Some(value) = lookup("REMINDER_INTERVAL_SECONDS") {
            config.reminders.sweep_interval_seconds = parse_var("REMINDER_INTERVAL_SECONDS", &value)?;
        }
        if let Some(value) = lookup("TICKET_SWEEP_INTERVAL_SECONDS") {
            config.tickets.sweep_interval_seconds =
                parse_var("TICKET_SWEEP_INTERVAL_SECONDS", &value)?;
        }
        if let Some(value) = lookup("TICKET_INACTIVITY_HOURS") {
            config.tickets.inactivity_hours = parse_var("TICKET_INACTIVITY_HOURS", &value)?;
        }
        if let Some(value) = lookup("TICKET_ARCHIVE_CHANNEL_ID") {
            config.tickets.archive_channel_id = Some(parse_var("TICKET_ARCHIVE_CHANNEL_ID", &value)?);
        }

        // Health endpoint overrides
        if let Some(bind) = lookup("HEALTH_BIND") {
            config.health.bind_address = bind;
        }
        if let Some(value) = lookup("HEALTH_ENABLED") {
            config.health.enabled = parse_var("HEALTH_ENABLED", &value)?;
        }

        // Logging configuration overrides
        if let Some(level) = lookup("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(file) = lookup("LOG_FILE") {
            config.logging.file = Some(file);
        }

        Ok(())
    }
}

fn parse_var<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::EnvParseError {
        var: var.to_string(),
        source: Box::new(e),
    })
}
