//! Application-wide error types using thiserror.

use poise::serenity_prelude as serenity;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum BotError {
    /// No Discord token was configured.
    #[error("No Discord token found. Please set DISCORD_TOKEN in your environment or config file.")]
    MissingToken,

    /// Discord/Serenity error.
    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),

    /// Liveness endpoint failure.
    #[error("Health endpoint error: {0}")]
    Health(String),
}

/// Result type for the bot application.
pub type BotResult<T> = Result<T, BotError>;
