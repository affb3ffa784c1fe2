//! Poise framework setup and command registration logic.

use chrono::{DateTime, Utc};
use concierge_ai::{GenerationConfig, TextGenerator};
use concierge_config::Config;
use concierge_workflows::{PollManager, ReminderScheduler, TicketManager};
use std::sync::Arc;
use tracing::error;

/// Application data accessible in all commands.
pub struct Data {
    /// Application configuration.
    pub config: Arc<Config>,
    /// Reminder scheduler.
    pub reminders: Arc<ReminderScheduler>,
    /// Ticket lifecycle manager.
    pub tickets: Arc<TicketManager>,
    /// Poll manager.
    pub polls: Arc<PollManager>,
    /// Text generator for `ask`, absent when no API key is configured.
    pub generator: Option<Arc<dyn TextGenerator>>,
    /// Sampling parameters for `ask`.
    pub generation: GenerationConfig,
    /// When the bot connected.
    pub started_at: DateTime<Utc>,
}

impl Data {
    /// Whether `ask` is available.
    #[must_use]
    pub fn ai_enabled(&self) -> bool {
        self.generator.is_some()
    }

    /// Command prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.config.discord.prefix
    }
}

/// Application error type for commands.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Command context type.
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Every command the bot registers.
#[must_use]
pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        crate::general::hello(),
        crate::general::commands_list(),
        crate::general::info(),
        crate::ask::ask(),
        crate::roll::roll(),
        crate::poll::poll(),
        crate::poll::endpoll(),
        crate::remind::remind(),
        crate::remind::reminders(),
        crate::ticket::ticket(),
        crate::ticket::close(),
    ]
}

/// Creates a new Poise framework.
#[must_use]
pub fn create_framework(prefix: &str) -> poise::FrameworkBuilder<Data, Error> {
    poise::Framework::builder().options(poise::FrameworkOptions {
        commands: commands(),
        on_error: |error| Box::pin(on_error(error)),
        event_handler: |ctx, event, framework, data| {
            Box::pin(crate::events::event_handler(ctx, event, framework, data))
        },
        prefix_options: poise::PrefixFrameworkOptions {
            prefix: Some(prefix.to_string()),
            ..Default::default()
        },
        ..Default::default()
    })
}

/// Reply for an unknown prefix command.
#[must_use]
pub fn command_not_found(prefix: &str) -> String {
    format!("Command not found. Type `{prefix}commands` to see available commands.")
}

/// Global error handler for the framework.
pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command '{}': {}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("An error occurred: {error}")).await {
                error!("Failed to report command error: {}", e);
            }
        }
        poise::FrameworkError::UnknownCommand { ctx, msg, prefix, .. } => {
            if let Err(e) = msg.channel_id.say(ctx, command_not_found(prefix)).await {
                error!("Failed to answer unknown command: {}", e);
            }
        }
        poise::FrameworkError::EventHandler { error, event, .. } => {
            error!(
                "Error in event handler for {:?}: {}",
                event.snake_case_name(),
                error
            );
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_command_has_a_unique_name() {
        let commands = commands();
        let mut names: Vec<&str> = commands.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), commands.len());
        assert!(names.contains(&"commands"));
        assert!(names.contains(&"endpoll"));
    }

    #[test]
    fn test_command_not_found_uses_prefix() {
        assert_eq!(
            command_not_found("!"),
            "Command not found. Type `!commands` to see available commands."
        );
    }
}
