//! Conversions between serenity ids and the workspace's id newtypes.

use concierge_common::{ChannelId, GuildId, MessageId, UserId};
use concierge_workflows::{WorkflowError, WorkflowResult};
use poise::serenity_prelude as serenity;
use std::num::NonZeroU64;

/// Workspace channel id.
#[must_use]
pub const fn channel(id: serenity::ChannelId) -> ChannelId {
    ChannelId(id.get())
}

/// Workspace user id.
#[must_use]
pub const fn user(id: serenity::UserId) -> UserId {
    UserId(id.get())
}

/// Workspace guild id.
#[must_use]
pub const fn guild(id: serenity::GuildId) -> GuildId {
    GuildId(id.get())
}

/// Workspace message id.
#[must_use]
pub const fn message(id: serenity::MessageId) -> MessageId {
    MessageId(id.get())
}

fn non_zero(raw: u64, what: &'static str) -> WorkflowResult<NonZeroU64> {
    NonZeroU64::new(raw).ok_or_else(|| WorkflowError::collaborator(what, "id must not be zero"))
}

/// Serenity channel id.
///
/// # Errors
///
/// Fails for a zero id, which Discord never assigns.
pub fn discord_channel(id: ChannelId) -> WorkflowResult<serenity::ChannelId> {
    non_zero(id.get(), "resolve channel").map(serenity::ChannelId::from)
}

/// Serenity user id.
///
/// # Errors
///
/// Fails for a zero id.
pub fn discord_user(id: UserId) -> WorkflowResult<serenity::UserId> {
    non_zero(id.get(), "resolve user").map(serenity::UserId::from)
}

/// Serenity guild id.
///
/// # Errors
///
/// Fails for a zero id.
pub fn discord_guild(id: GuildId) -> WorkflowResult<serenity::GuildId> {
    non_zero(id.get(), "resolve guild").map(serenity::GuildId::from)
}

/// Serenity message id.
///
/// # Errors
///
/// Fails for a zero id.
pub fn discord_message(id: MessageId) -> WorkflowResult<serenity::MessageId> {
    non_zero(id.get(), "resolve message").map(serenity::MessageId::from)
}
