//! Default values for every configuration section.

use crate::schema::{
    AiConfig, DiscordConfig, HealthConfig, LoggingConfig, PollConfig, ReminderConfig,
    StorageConfig, TicketConfig,
};

/// Default command prefix.
pub const DEFAULT_PREFIX: &str = "!";

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default Gemini API root.
pub const DEFAULT_AI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            sweep_interval_seconds: 30,
        }
    }
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            sweep_interval_seconds: 3600,
            inactivity_hours: 24,
            category_name: "Tickets".to_string(),
            archive_channel_id: None,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { baseline_votes: 1 }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_AI_BASE_URL.to_string(),
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 1024,
            request_timeout_seconds: 60,
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}
