//! Reminder commands.

use crate::framework::{Context, Error};
use crate::ids;
use chrono::{DateTime, Utc};
use concierge_common::{format_duration, format_timestamp, parse_duration, truncate_string};
use concierge_workflows::Reminder;

/// At most this many reminders are listed.
pub const LIST_LIMIT: usize = 15;

/// Confirmation sent after scheduling.
#[must_use]
pub fn confirmation(reminder: &Reminder) -> String {
    format!(
        "⏰ Got it! I'll remind you in {} ({}).",
        format_duration(reminder.due_at - reminder.created_at),
        format_timestamp(reminder.due_at)
    )
}

/// Listing of a member's pending reminders, soonest first.
#[must_use]
pub fn describe_pending(reminders: &[Reminder], now: DateTime<Utc>) -> String {
    if reminders.is_empty() {
        return "You have no pending reminders.".to_string();
    }

    let mut lines = vec![format!("**Your reminders ({}):**", reminders.len())];
    lines.extend(reminders.iter().take(LIST_LIMIT).map(|r| {
        format!(
            "• in {} in {}: {}",
            format_duration(r.due_at - now),
            r.destination_id.mention(),
            truncate_string(&r.message, 80)
        )
    }));
    if reminders.len() > LIST_LIMIT {
        lines.push(format!("…and {} more", reminders.len() - LIST_LIMIT));
    }
    lines.join("\n")
}

/// Sets a reminder, e.g. `remind 1h30m stretch`.
#[poise::command(prefix_command, slash_command)]
pub async fn remind(
    ctx: Context<'_>,
    #[description = "When, like 10m, 2h or 1d12h"] time: String,
    #[description = "What to remind you about"]
    #[rest]
    message: String,
) -> Result<(), Error> {
    let delay = match parse_duration(&time) {
        Ok(delay) => delay,
        Err(e) => {
            ctx.say(e.to_string()).await?;
            return Ok(());
        }
    };

    let result = ctx
        .data()
        .reminders
        .schedule(
            ids::user(ctx.author().id),
            ids::channel(ctx.channel_id()),
            &message,
            delay,
        )
        .await;

    match result {
        Ok(reminder) => {
            ctx.say(confirmation(&reminder)).await?;
        }
        Err(e) if e.is_user_facing() => {
            ctx.say(e.to_string()).await?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Lists your pending reminders.
#[poise::command(prefix_command, slash_command)]
pub async fn reminders(ctx: Context<'_>) -> Result<(), Error> {
    let pending = ctx
        .data()
        .reminders
        .pending_for(ids::user(ctx.author().id))
        .await;
    ctx.say(describe_pending(&pending, Utc::now())).await?;
    Ok(())
}
