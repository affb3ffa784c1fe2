//! Configuration schema definitions using serde with validation attributes.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

/// Main configuration structure for Concierge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Discord connection settings.
    pub discord: DiscordConfig,
    /// Where the JSON collections live.
    pub storage: StorageConfig,
    /// Reminder scheduler settings.
    pub reminders: ReminderConfig,
    /// Ticket lifecycle settings.
    pub tickets: TicketConfig,
    /// Poll settings.
    pub polls: PollConfig,
    /// Generative-language backend settings.
    pub ai: AiConfig,
    /// Liveness endpoint settings.
    pub health: HealthConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Discord bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DiscordConfig {
    /// Discord bot token.
    pub token: String,

    /// Prefix for text commands.
    #[validate(length(min = 1, max = 5, message = "Command prefix must be 1 to 5 characters"))]
    pub prefix: String,
}

/// Persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the collection files.
    #[validate(length(min = 1, message = "Data directory cannot be empty"))]
    pub data_dir: String,
}

impl StorageConfig {
    /// The data directory as a path.
    #[must_use]
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }
}

/// Reminder scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ReminderConfig {
    /// Seconds between two due-reminder sweeps.
    #[validate(range(min = 1, max = 3600, message = "Reminder interval must be between 1 and 3600 seconds"))]
    pub sweep_interval_seconds: u64,
}

/// Ticket lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TicketConfig {
    /// Seconds between two inactivity sweeps.
    #[validate(range(min = 1, max = 86400, message = "Ticket sweep interval must be between 1 and 86400 seconds"))]
    pub sweep_interval_seconds: u64,

    /// Hours without activity after which an open ticket is closed.
    #[validate(range(min = 1, max = 720, message = "Inactivity threshold must be between 1 and 720 hours"))]
    pub inactivity_hours: u64,

    /// Category under which ticket channels are created.
    #[validate(length(min = 1, max = 100, message = "Category name must be 1 to 100 characters"))]
    pub category_name: String,

    /// Channel receiving transcripts of closed tickets.
    pub archive_channel_id: Option<u64>,
}

/// Poll configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PollConfig {
    /// Reactions the bot adds itself to every option, subtracted at tally time.
    #[validate(range(max = 1, message = "Baseline votes must be 0 or 1"))]
    pub baseline_votes: u64,
}

/// Gemini configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AiConfig {
    /// Google AI Studio API key; `ask` is disabled without one.
    pub api_key: Option<String>,

    /// Model name.
    #[validate(length(min = 1, message = "Model name cannot be empty"))]
    pub model: String,

    /// API root, without trailing slash.
    #[validate(length(min = 1, message = "AI base URL cannot be empty"))]
    pub base_url: String,

    /// Sampling temperature.
    #[validate(range(min = 0.0, max = 2.0, message = "Temperature must be between 0 and 2"))]
    pub temperature: f32,

    /// Nucleus sampling mass.
    #[validate(range(min = 0.0, max = 1.0, message = "top_p must be between 0 and 1"))]
    pub top_p: f32,

    /// Top-k sampling.
    #[validate(range(min = 1, max = 100, message = "top_k must be between 1 and 100"))]
    pub top_k: u32,

    /// Upper bound on generated tokens.
    #[validate(range(min = 1, max = 8192, message = "max_output_tokens must be between 1 and 8192"))]
    pub max_output_tokens: u32,

    /// HTTP timeout in seconds.
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub request_timeout_seconds: u64,
}

impl AiConfig {
    /// The API key, if one is configured and non-blank.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Liveness endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct HealthConfig {
    /// Whether to serve the endpoint at all.
    pub enabled: bool,

    /// Socket address to bind.
    #[validate(custom(function = "crate::validation::validate_socket_addr", message = "Bind address must look like 0.0.0.0:8080"))]
    pub bind_address: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[validate(custom(function = "crate::validation::validate_log_level", message = "Log level must be one of: trace, debug, info, warn, error"))]
    pub level: String,

    /// Output format (pretty, compact, json).
    #[validate(custom(function = "crate::validation::validate_log_format", message = "Log format must be one of: pretty, compact, json"))]
    pub format: String,

    /// Optional log file path.
    pub file: Option<String>,
}

impl Config {
    /// Validates every section of the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first section's validation errors.
    pub fn validate_all(&self) -> Result<(), validator::ValidationErrors> {
        self.discord.validate()?;
        self.storage.validate()?;
        self.reminders.validate()?;
        self.tickets.validate()?;
        self.polls.validate()?;
        self.ai.validate()?;
        self.health.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
