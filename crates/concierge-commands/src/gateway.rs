//! Serenity implementation of the workflow capability traits.

use crate::ids;
use async_trait::async_trait;
use concierge_common::{ChannelId, GuildId, MessageId, UserId};
use concierge_workflows::{
    HistoryEntry, Notice, Notifier, Reactions, TicketChannels, TranscriptSource, UserProfile,
    WorkflowError, WorkflowResult,
};
use futures::StreamExt;
use poise::serenity_prelude as serenity;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Permissions granted in a ticket channel to its owner and staff.
fn participant_permissions() -> serenity::Permissions {
    serenity::Permissions::VIEW_CHANNEL
        | serenity::Permissions::SEND_MESSAGES
        | serenity::Permissions::READ_MESSAGE_HISTORY
        | serenity::Permissions::ATTACH_FILES
        | serenity::Permissions::EMBED_LINKS
}

/// Renders a notice as an embed.
#[must_use]
pub fn to_embed(notice: &Notice) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title(&notice.title)
        .colour(notice.colour)
        .timestamp(serenity::Timestamp::now());

    if let Some(description) = &notice.description {
        embed = embed.description(description);
    }
    for field in &notice.fields {
        embed = embed.field(&field.name, &field.value, field.inline);
    }
    if let Some(footer) = &notice.footer {
        embed = embed.footer(serenity::CreateEmbedFooter::new(footer));
    }
    embed
}

fn to_message(content: &str, notice: Option<&Notice>) -> serenity::CreateMessage {
    let mut message = serenity::CreateMessage::new();
    if !content.is_empty() {
        message = message.content(content);
    }
    if let Some(notice) = notice {
        message = message.embed(to_embed(notice));
    }
    message
}

fn marker_of(reaction: &serenity::ReactionType) -> String {
    match reaction {
        serenity::ReactionType::Unicode(marker) => marker.clone(),
        other => other.to_string(),
    }
}

/// Gateway adapter over serenity's HTTP client.
pub struct DiscordGateway {
    http: Arc<serenity::Http>,
    bot_id: serenity::UserId,
    category_name: String,
}

impl DiscordGateway {
    /// Creates the adapter. `bot_id` is granted access to every ticket channel.
    pub fn new(
        http: Arc<serenity::Http>,
        bot_id: serenity::UserId,
        category_name: impl Into<String>,
    ) -> Self {
        Self {
            http,
            bot_id,
            category_name: category_name.into(),
        }
    }

    async fn ticket_category(
        &self,
        guild: serenity::GuildId,
    ) -> WorkflowResult<serenity::ChannelId> {
        let channels = guild
            .channels(&*self.http)
            .await
            .map_err(|e| WorkflowError::collaborator("list channels", e))?;

        if let Some(category) = channels.values().find(|c| {
            c.kind == serenity::ChannelType::Category
                && c.name.eq_ignore_ascii_case(&self.category_name)
        }) {
            return Ok(category.id);
        }

        let category = guild
            .create_channel(
                &*self.http,
                serenity::CreateChannel::new(&self.category_name)
                    .kind(serenity::ChannelType::Category),
            )
            .await
            .map_err(|e| WorkflowError::collaborator("create category", e))?;
        info!(guild_id = %guild, category = %self.category_name, "Created ticket category");
        Ok(category.id)
    }

    async fn overwrites(
        &self,
        guild: serenity::GuildId,
        owner: serenity::UserId,
    ) -> WorkflowResult<Vec<serenity::PermissionOverwrite>> {
        let everyone = serenity::RoleId::new(guild.get());
        let mut overwrites = vec![
            serenity::PermissionOverwrite {
                allow: serenity::Permissions::empty(),
                deny: serenity::Permissions::VIEW_CHANNEL,
                kind: serenity::PermissionOverwriteType::Role(everyone),
            },
            serenity::PermissionOverwrite {
                allow: participant_permissions(),
                deny: serenity::Permissions::empty(),
                kind: serenity::PermissionOverwriteType::Member(owner),
            },
            serenity::PermissionOverwrite {
                allow: participant_permissions() | serenity::Permissions::MANAGE_CHANNELS,
                deny: serenity::Permissions::empty(),
                kind: serenity::PermissionOverwriteType::Member(self.bot_id),
            },
        ];

        let roles = guild
            .roles(&*self.http)
            .await
            .map_err(|e| WorkflowError::collaborator("list roles", e))?;
        overwrites.extend(
            roles
                .values()
                .filter(|role| role.id != everyone && role.permissions.manage_channels())
                .map(|role| serenity::PermissionOverwrite {
                    allow: participant_permissions(),
                    deny: serenity::Permissions::empty(),
                    kind: serenity::PermissionOverwriteType::Role(role.id),
                }),
        );
        Ok(overwrites)
    }
}

#[async_trait]
impl Notifier for DiscordGateway {
    async fn resolve_user(&self, user: UserId) -> WorkflowResult<UserProfile> {
        let resolved = ids::discord_user(user)?
            .to_user(&*self.http)
            .await
            .map_err(|e| WorkflowError::collaborator("resolve user", e))?;
        Ok(UserProfile {
            id: user,
            display_name: resolved.display_name().to_string(),
        })
    }

    async fn resolve_channel(&self, channel: ChannelId) -> WorkflowResult<()> {
        ids::discord_channel(channel)?
            .to_channel(&*self.http)
            .await
            .map(|_| ())
            .map_err(|e| WorkflowError::collaborator("resolve channel", e))
    }

    async fn send_message<'a>(
        &self,
        channel: ChannelId,
        content: &str,
        notice: Option<&'a Notice>,
    ) -> WorkflowResult<MessageId> {
        let sent = ids::discord_channel(channel)?
            .send_message(&*self.http, to_message(content, notice))
            .await
            .map_err(|e| WorkflowError::collaborator("send message", e))?;
        Ok(ids::message(sent.id))
    }

    async fn direct_message<'a>(
        &self,
        user: UserId,
        content: &str,
        notice: Option<&'a Notice>,
    ) -> WorkflowResult<()> {
        ids::discord_user(user)?
            .direct_message(&*self.http, to_message(content, notice))
            .await
            .map(|_| ())
            .map_err(|e| WorkflowError::collaborator("direct message", e))
    }
}

#[async_trait]
impl TranscriptSource for DiscordGateway {
    async fn fetch_history(&self, channel: ChannelId) -> WorkflowResult<Vec<HistoryEntry>> {
        let mut messages = ids::discord_channel(channel)?.messages_iter(&*self.http).boxed();
        let mut history = Vec::new();

        while let Some(message) = messages.next().await {
            let message = message.map_err(|e| WorkflowError::collaborator("fetch history", e))?;
            history.push(HistoryEntry {
                speaker: message.author.display_name().to_string(),
                text: message.content,
            });
        }

        // newest first from the API
        history.reverse();
        debug!(channel_id = %channel, messages = history.len(), "Fetched channel history");
        Ok(history)
    }
}

#[async_trait]
impl TicketChannels for DiscordGateway {
    async fn create_ticket_channel(
        &self,
        guild: GuildId,
        owner: UserId,
        name: &str,
    ) -> WorkflowResult<ChannelId> {
        let guild = ids::discord_guild(guild)?;
        let owner = ids::discord_user(owner)?;
        let category = self.ticket_category(guild).await?;
        let overwrites = self.overwrites(guild, owner).await?;

        let channel = guild
            .create_channel(
                &*self.http,
                serenity::CreateChannel::new(name)
                    .kind(serenity::ChannelType::Text)
                    .category(category)
                    .topic(format!("Support ticket for <@{owner}>"))
                    .permissions(overwrites),
            )
            .await
            .map_err(|e| WorkflowError::collaborator("create channel", e))?;
        Ok(ids::channel(channel.id))
    }

    async fn delete_channel(&self, channel: ChannelId) -> WorkflowResult<()> {
        ids::discord_channel(channel)?
            .delete(&*self.http)
            .await
            .map(|_| ())
            .map_err(|e| WorkflowError::collaborator("delete channel", e))
    }
}

#[async_trait]
impl Reactions for DiscordGateway {
    async fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        marker: &str,
    ) -> WorkflowResult<()> {
        ids::discord_channel(channel)?
            .create_reaction(
                &*self.http,
                ids::discord_message(message)?,
                serenity::ReactionType::Unicode(marker.to_string()),
            )
            .await
            .map_err(|e| WorkflowError::collaborator("add reaction", e))
    }

    async fn reaction_counts(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> WorkflowResult<HashMap<String, u64>> {
        let fetched = ids::discord_channel(channel)?
            .message(&*self.http, ids::discord_message(message)?)
            .await
            .map_err(|e| WorkflowError::collaborator("fetch message", e))?;

        Ok(fetched
            .reactions
            .iter()
            .map(|reaction| (marker_of(&reaction.reaction_type), reaction.count))
            .collect())
    }
}
