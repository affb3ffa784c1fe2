//! Support ticket commands.

use crate::framework::{Context, Error};
use crate::ids;
use concierge_workflows::{CloseOutcome, Closer};
use tracing::debug;

/// Reply when closing a ticket twice.
pub const ALREADY_CLOSED: &str = "This ticket is already closed.";

/// Whether the author may manage channels here.
async fn has_manage_channels(ctx: Context<'_>) -> bool {
    let Some(member) = ctx.author_member().await else {
        return false;
    };
    if let Some(permissions) = member.permissions {
        return permissions.manage_channels();
    }

    let Some(guild) = ctx.guild() else {
        return false;
    };
    guild
        .channels
        .get(&ctx.channel_id())
        .is_some_and(|channel| guild.user_permissions_in(channel, &member).manage_channels())
}

/// Opens a private support ticket.
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn ticket(
    ctx: Context<'_>,
    #[description = "What do you need help with?"]
    #[rest]
    reason: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };
    ctx.defer().await?;

    let result = ctx
        .data()
        .tickets
        .open(
            ids::guild(guild_id),
            ids::user(ctx.author().id),
            reason.as_deref(),
        )
        .await;

    match result {
        Ok(ticket) => {
            ctx.say(format!(
                "🎫 Your ticket is ready: {}",
                ticket.channel_id.mention()
            ))
            .await?;
        }
        Err(e) if e.is_user_facing() => {
            ctx.say(e.to_string()).await?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Closes the ticket this channel belongs to.
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn close(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };
    let closer = Closer::Member {
        id: ids::user(ctx.author().id),
        elevated: has_manage_channels(ctx).await,
    };
    ctx.defer().await?;

    let result = ctx
        .data()
        .tickets
        .close(ids::guild(guild_id), ids::channel(ctx.channel_id()), closer)
        .await;

    match result {
        Ok(CloseOutcome::Closed(ticket)) => {
            debug!(channel_id = %ticket.channel_id, "Ticket closed on request");
        }
        Ok(CloseOutcome::AlreadyClosed) => {
            ctx.say(ALREADY_CLOSED).await?;
        }
        Err(e) if e.is_user_facing() => {
            ctx.say(e.to_string()).await?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
