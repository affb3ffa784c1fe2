//! Handling of gateway events outside commands.

use crate::ask::answer;
use crate::framework::{Data, Error};
use crate::ids;
use crate::keywords::{match_keyword, strip_mentions};
use poise::serenity_prelude as serenity;
use tracing::{debug, info};

/// What to do with a plain message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Answer the text as a question.
    Ask(String),
    /// Send a canned keyword reply.
    Keyword(&'static str),
}

/// Decides how to answer a message from a member.
///
/// A mention outside a command is treated as a question when the generator is
/// available and text remains once mentions are removed. Otherwise the first
/// matching keyword, if any, gets its reply.
#[must_use]
pub fn plan_reply(
    content: &str,
    mentioned: bool,
    prefix: &str,
    ai_enabled: bool,
) -> Option<Reply> {
    if mentioned && !content.starts_with(prefix) {
        let question = strip_mentions(content);
        if !question.is_empty() && ai_enabled {
            return Some(Reply::Ask(question));
        }
    }

    match_keyword(content).map(Reply::Keyword)
}

/// Central event handler for Discord events.
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!("{} has connected to Discord!", data_about_bot.user.name);
            info!("Bot is connected to {} guilds", data_about_bot.guilds.len());
            ctx.set_activity(Some(serenity::ActivityData::listening(format!(
                "{}commands for help",
                data.prefix()
            ))));
        }
        serenity::FullEvent::Message { new_message } => {
            handle_message(ctx, new_message, data).await?;
        }
        _ => {}
    }
    Ok(())
}

async fn handle_message(
    ctx: &serenity::Context,
    message: &serenity::Message,
    data: &Data,
) -> Result<(), Error> {
    if message.author.bot {
        return Ok(());
    }

    if let Some(guild_id) = message.guild_id {
        let channel = ids::channel(message.channel_id);
        if data.tickets.touch(ids::guild(guild_id), channel).await {
            debug!(channel_id = %channel, "Ticket activity");
        }
    }

    let bot_id = ctx.cache.current_user().id;
    let mentioned = message.mentions_user_id(bot_id);

    match plan_reply(&message.content, mentioned, data.prefix(), data.ai_enabled()) {
        Some(Reply::Ask(question)) => {
            let typing = message.channel_id.start_typing(&ctx.http);
            let replies = answer(
                data.generator.as_deref(),
                &data.generation,
                Some(&question),
                data.prefix(),
            )
            .await;
            typing.stop();

            for reply in replies {
                message.channel_id.say(ctx, reply).await?;
            }
        }
        Some(Reply::Keyword(reply)) => {
            message.channel_id.say(ctx, reply).await?;
        }
        None => {}
    }
    Ok(())
}
