//! Narrow interfaces onto the messaging gateway.
//!
//! The managers never see serenity types. Every call is fallible and may be
//! slow or rate limited.

use crate::error::WorkflowResult;
use async_trait::async_trait;
use concierge_common::{ChannelId, GuildId, MessageId, UserId};
use std::collections::HashMap;

/// Embed colours used across notices.
pub mod colours {
    /// Neutral information.
    pub const INFO: u32 = 0x0058_65F2;
    /// Successful action.
    pub const SUCCESS: u32 = 0x0057_F287;
    /// Something needs attention.
    pub const WARNING: u32 = 0x00FE_E75C;
    /// Something was closed or failed.
    pub const DANGER: u32 = 0x00ED_4245;
}

/// One field of a [`Notice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeField {
    /// Field heading.
    pub name: String,
    /// Field body.
    pub value: String,
    /// Whether the field may share a row.
    pub inline: bool,
}

/// Structured message body, rendered as an embed by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Notice {
    /// Heading.
    pub title: String,
    /// Main text.
    pub description: Option<String>,
    /// Extra fields.
    pub fields: Vec<NoticeField>,
    /// Small trailing text.
    pub footer: Option<String>,
    /// Side colour.
    pub colour: u32,
}

impl Notice {
    /// A notice with a title and the default colour.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            colour: colours::INFO,
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(NoticeField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    /// Sets the footer.
    #[must_use]
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Sets the colour.
    #[must_use]
    pub const fn colour(mut self, colour: u32) -> Self {
        self.colour = colour;
        self
    }
}

/// A resolved member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Member id.
    pub id: UserId,
    /// Display name.
    pub display_name: String,
}

impl UserProfile {
    /// Mention string for the member.
    #[must_use]
    pub fn mention(&self) -> String {
        self.id.mention()
    }
}

/// One message of a channel's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Author display name.
    pub speaker: String,
    /// Message text.
    pub text: String,
}

/// Resolving members/channels and sending messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Looks a user up by id.
    async fn resolve_user(&self, user: UserId) -> WorkflowResult<UserProfile>;

    /// Checks that a channel exists and is reachable.
    async fn resolve_channel(&self, channel: ChannelId) -> WorkflowResult<()>;

    /// Posts a message, optionally with a structured notice, and returns its id.
    async fn send_message<'a>(
        &self,
        channel: ChannelId,
        content: &str,
        notice: Option<&'a Notice>,
    ) -> WorkflowResult<MessageId>;

    /// Sends a direct message to a member.
    async fn direct_message<'a>(
        &self,
        user: UserId,
        content: &str,
        notice: Option<&'a Notice>,
    ) -> WorkflowResult<()>;
}

/// Reading a channel's history for transcripts.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Full history of a channel, oldest first.
    async fn fetch_history(&self, channel: ChannelId) -> WorkflowResult<Vec<HistoryEntry>>;
}

/// Provisioning and tearing down ticket channels.
#[async_trait]
pub trait TicketChannels: Send + Sync {
    /// Creates a private channel visible to the owner and staff only.
    async fn create_ticket_channel(
        &self,
        guild: GuildId,
        owner: UserId,
        name: &str,
    ) -> WorkflowResult<ChannelId>;

    /// Deletes a channel.
    async fn delete_channel(&self, channel: ChannelId) -> WorkflowResult<()>;
}

/// Adding and counting reactions.
#[async_trait]
pub trait Reactions: Send + Sync {
    /// Adds the bot's own reaction with `marker`.
    async fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        marker: &str,
    ) -> WorkflowResult<()>;

    /// Current reaction counts on a message, keyed by marker.
    async fn reaction_counts(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> WorkflowResult<HashMap<String, u64>>;
}

/// What the ticket manager needs from the gateway.
pub trait TicketGateway: Notifier + TranscriptSource + TicketChannels {}

impl<T> TicketGateway for T where T: Notifier + TranscriptSource + TicketChannels {}

/// What the poll manager needs from the gateway.
pub trait PollGateway: Notifier + Reactions {}

impl<T> PollGateway for T where T: Notifier + Reactions {}
