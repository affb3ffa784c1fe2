//! Persisted records: reminders, tickets and polls.

use chrono::{DateTime, Duration, Utc};
use concierge_common::{ChannelId, GuildId, MessageId, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A one-shot notification delivered to a channel once `due_at` has passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Stable identifier, used in logs.
    pub id: Uuid,
    /// Who asked for the reminder.
    pub owner_id: UserId,
    /// Channel the reminder is delivered to.
    pub destination_id: ChannelId,
    /// Free text to deliver.
    pub message: String,
    /// When the reminder becomes deliverable.
    pub due_at: DateTime<Utc>,
    /// When the reminder was requested.
    pub created_at: DateTime<Utc>,
}

impl Reminder {
    /// Whether the reminder should fire at `now`.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due_at <= now
    }
}

/// Ticket lifecycle state. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// Accepting messages.
    Open,
    /// Closed by a member or by the inactivity sweep.
    Closed,
}

/// Who closed a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosedBy {
    /// A member closed it explicitly.
    User(UserId),
    /// The inactivity sweep closed it.
    System,
}

impl ClosedBy {
    /// Human readable form for notices.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::User(id) => id.mention(),
            Self::System => "Automatic (inactivity)".to_string(),
        }
    }
}

/// Identifies a ticket: one record per (guild, channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TicketKey {
    /// Owning guild.
    pub guild_id: GuildId,
    /// Ticket channel.
    pub channel_id: ChannelId,
}

/// A support ticket backed by a private channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Owning guild.
    pub guild_id: GuildId,
    /// Ticket channel.
    pub channel_id: ChannelId,
    /// Per-guild sequence number, used for the channel name.
    pub number: u32,
    /// Member who opened the ticket.
    pub owner_id: UserId,
    /// Reason given when opening.
    pub reason: String,
    /// Lifecycle state.
    pub status: TicketStatus,
    /// When the ticket was opened.
    pub created_at: DateTime<Utc>,
    /// Last message observed in the ticket channel.
    pub last_activity_at: DateTime<Utc>,
    /// Who closed it, once closed.
    #[serde(default)]
    pub closed_by: Option<ClosedBy>,
    /// When it was closed, once closed.
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// A freshly opened ticket.
    #[must_use]
    pub const fn open(
        guild_id: GuildId,
        channel_id: ChannelId,
        number: u32,
        owner_id: UserId,
        reason: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            guild_id,
            channel_id,
            number,
            owner_id,
            reason,
            status: TicketStatus::Open,
            created_at: now,
            last_activity_at: now,
            closed_by: None,
            closed_at: None,
        }
    }

    /// The record's key.
    #[must_use]
    pub const fn key(&self) -> TicketKey {
        TicketKey {
            guild_id: self.guild_id,
            channel_id: self.channel_id,
        }
    }

    /// Whether the ticket still accepts messages.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == TicketStatus::Open
    }

    /// Time elapsed since the last observed message.
    #[must_use]
    pub fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.last_activity_at)
    }

    /// Channel name for a ticket number.
    #[must_use]
    pub fn channel_name_for(number: u32) -> String {
        format!("ticket-{number:04}")
    }

    /// Channel name of this ticket.
    #[must_use]
    pub fn channel_name(&self) -> String {
        Self::channel_name_for(self.number)
    }
}

/// A reaction poll attached to the message that displays it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    /// Message showing the poll.
    pub message_id: MessageId,
    /// Channel of that message.
    pub channel_id: ChannelId,
    /// Member who created the poll.
    pub owner_id: UserId,
    /// Question.
    pub title: String,
    /// Option labels, in display order.
    pub options: Vec<String>,
    /// Reaction marker per option, same length and order as `options`.
    pub markers: Vec<String>,
    /// Markers the bot failed to react with, so they carry no baseline vote.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unseeded_markers: Vec<String>,
    /// When the poll was posted.
    pub created_at: DateTime<Utc>,
}
