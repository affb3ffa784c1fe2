//! Core bot logic using the Poise framework.

use crate::error::{BotError, BotResult};
use crate::health::{self, HealthState};
use chrono::Utc;
use concierge_ai::{AiError, GeminiClient, GenerationConfig, TextGenerator};
use concierge_commands::{create_framework, Data, DiscordGateway};
use concierge_common::ChannelId;
use concierge_config::{AiConfig, Config};
use concierge_workflows::{
    JsonStore, PollManager, ReminderScheduler, TicketGateway, TicketManager, TicketSettings,
};
use poise::serenity_prelude as serenity;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Ticket tunables from configuration.
#[must_use]
pub fn ticket_settings(config: &Config) -> TicketSettings {
    let hours = i64::try_from(config.tickets.inactivity_hours).unwrap_or(i64::MAX);
    TicketSettings {
        inactivity_threshold: chrono::Duration::hours(hours),
        sweep_interval: Duration::from_secs(config.tickets.sweep_interval_seconds),
        archive_channel: config
            .tickets
            .archive_channel_id
            .filter(|id| *id > 0)
            .map(ChannelId),
    }
}

/// Builds the text generator, or `None` when `ask` is unavailable.
#[must_use]
pub fn build_generator(config: &AiConfig) -> Option<Arc<dyn TextGenerator>> {
    match GeminiClient::from_config(config) {
        Ok(client) => {
            info!("Using model: {}", config.model);
            Some(Arc::new(client))
        }
        Err(AiError::NotConfigured) => {
            info!("No Google AI key configured, ask is disabled");
            None
        }
        Err(e) => {
            error!("Error initializing Google AI: {}", e);
            None
        }
    }
}

/// Gateway intents the bot needs.
#[must_use]
pub fn intents() -> serenity::GatewayIntents {
    serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_MESSAGE_REACTIONS
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT
}

/// Main bot structure.
pub struct ConciergeBot {
    config: Arc<Config>,
}

impl ConciergeBot {
    /// Creates a new bot instance.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// The configuration the bot runs with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Starts the bot and runs until the gateway connection ends.
    ///
    /// # Errors
    ///
    /// Fails without a token, when the health endpoint cannot bind, or when
    /// the Discord client cannot start.
    pub async fn start(&self) -> BotResult<()> {
        let token = self.config.discord.token.trim().to_string();
        if token.is_empty() {
            return Err(BotError::MissingToken);
        }

        if self.config.health.enabled {
            self.spawn_health().await?;
        }

        let config = Arc::clone(&self.config);
        let framework = create_framework(&self.config.discord.prefix)
            .setup(move |ctx, ready, framework| {
                Box::pin(async move {
                    info!("Bot connected as: {}", ready.user.name);
                    poise::builtins::register_globally(ctx, &framework.options().commands)
                        .await?;
                    info!("Slash commands registered globally");
                    Ok(build_data(config, Arc::clone(&ctx.http), ready.user.id).await)
                })
            })
            .build();

        let mut client = serenity::ClientBuilder::new(&token, intents())
            .framework(framework)
            .await?;

        let shard_manager = Arc::clone(&client.shard_manager);
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {:?}", e);
                return;
            }
            info!("Received shutdown signal, starting graceful shutdown");
            shard_manager.shutdown_all().await;
        });

        info!("Concierge is starting up...");
        client.start().await?;
        info!("Concierge has shut down");
        Ok(())
    }

    async fn spawn_health(&self) -> BotResult<()> {
        let addr: SocketAddr = self
            .config
            .health
            .bind_address
            .parse()
            .map_err(|e| BotError::Health(format!("invalid bind address: {e}")))?;
        let listener = health::bind(addr).await?;

        tokio::spawn(async move {
            if let Err(e) = health::serve(listener, HealthState::new()).await {
                warn!("{}", e);
            }
        });
        Ok(())
    }
}

/// Loads the managers, starts their sweeps and assembles command data.
async fn build_data(
    config: Arc<Config>,
    http: Arc<serenity::Http>,
    bot_id: serenity::UserId,
) -> Data {
    let gateway = Arc::new(DiscordGateway::new(
        http,
        bot_id,
        config.tickets.category_name.clone(),
    ));
    let store = Arc::new(JsonStore::new(config.storage.data_path()));
    info!("Using data directory {}", store.dir().display());

    let reminders = Arc::new(
        ReminderScheduler::load(
            Arc::clone(&store),
            gateway.clone(),
            Duration::from_secs(config.reminders.sweep_interval_seconds),
        )
        .await,
    );
    let ticket_gateway: Arc<dyn TicketGateway> = gateway.clone();
    let tickets = Arc::new(
        TicketManager::load(Arc::clone(&store), ticket_gateway, ticket_settings(&config)).await,
    );
    let polls = Arc::new(PollManager::load(store, gateway, config.polls.baseline_votes).await);

    tokio::spawn(Arc::clone(&reminders).run());
    tokio::spawn(Arc::clone(&tickets).run());

    Data {
        generator: build_generator(&config.ai),
        generation: GenerationConfig::from(&config.ai),
        config,
        reminders,
        tickets,
        polls,
        started_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_settings_from_config() {
        let mut config = Config::default();
        config.tickets.inactivity_hours = 48;
        config.tickets.archive_channel_id = Some(0);

        let settings = ticket_settings(&config);
        assert_eq!(settings.inactivity_threshold, chrono::Duration::hours(48));
        assert_eq!(settings.archive_channel, None);

        config.tickets.archive_channel_id = Some(55);
        assert_eq!(ticket_settings(&config).archive_channel, Some(ChannelId(55)));
    }

    #[test]
    fn test_generator_needs_key() {
        assert!(build_generator(&AiConfig::default()).is_none());

        let config = AiConfig {
            api_key: Some("key".to_string()),
            ..AiConfig::default()
        };
        let generator = build_generator(&config).unwrap();
        assert_eq!(generator.model(), config.model);
    }

    #[test]
    fn test_intents_include_message_content() {
        assert!(intents().contains(serenity::GatewayIntents::MESSAGE_CONTENT));
    }

    #[tokio::test]
    async fn test_start_without_token_fails() {
        let bot = ConciergeBot::new(Config::default());
        assert!(matches!(bot.start().await, Err(BotError::MissingToken)));
    }
}
