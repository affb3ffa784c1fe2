//! Greeting, help and about commands.

use crate::framework::{Context, Error};
use chrono::Utc;
use concierge_common::format_duration;

/// Help listing for `commands`.
#[must_use]
pub fn help_text(prefix: &str, ai_enabled: bool) -> String {
    let mut text = format!(
        "**Bot Commands:**\n\
         `{prefix}hello` - Get a friendly greeting\n\
         `{prefix}commands` - Show this help message\n\
         `{prefix}info` - Learn about this bot\n\
         `{prefix}roll [NdM]` - Roll some dice\n\
         `{prefix}poll <question> | <option> | <option>...` - Start a reaction poll\n\
         `{prefix}endpoll <message id>` - End a poll and show the results\n\
         `{prefix}remind <time> <message>` - Get reminded, e.g. `{prefix}remind 1h30m stretch`\n\
         `{prefix}reminders` - List your pending reminders\n\
         `{prefix}ticket [reason]` - Open a private support ticket\n\
         `{prefix}close` - Close the ticket you are in\n"
    );

    if ai_enabled {
        text.push_str(&format!(
            "`{prefix}ask <question>` - Ask the bot a question using Google AI\n"
        ));
    }

    text.push_str("\nThe bot also responds to keywords like: python, discord, project, and hello.");
    text
}

/// Description for `info`.
#[must_use]
pub fn info_text(prefix: &str, ai_enabled: bool) -> String {
    let mut text = format!(
        "I'm a helpful Discord bot built in Rust!\n\
         I can respond to commands and detect keywords in your messages.\n\
         Use `{prefix}commands` to see what I can do.\n"
    );

    if ai_enabled {
        text.push_str(&format!(
            "I can also answer general questions using Google AI with the `{prefix}ask` command.\n"
        ));
    }
    text
}

/// Says hello.
#[poise::command(prefix_command, slash_command)]
pub async fn hello(ctx: Context<'_>) -> Result<(), Error> {
    let name = match ctx.author_member().await {
        Some(member) => member.display_name().to_string(),
        None => ctx.author().display_name().to_string(),
    };
    ctx.say(format!("Hello, {name}!")).await?;
    Ok(())
}

/// Lists available commands.
#[poise::command(prefix_command, slash_command, rename = "commands")]
pub async fn commands_list(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    ctx.say(help_text(data.prefix(), data.ai_enabled())).await?;
    Ok(())
}

/// Shows information about the bot.
#[poise::command(prefix_command, slash_command)]
pub async fn info(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let uptime = format_duration(Utc::now() - data.started_at);
    let text = format!(
        "{}Online for {uptime}.",
        info_text(data.prefix(), data.ai_enabled())
    );
    ctx.say(text).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_listed_only_with_ai() {
        assert!(!help_text("!", false).contains("`!ask"));
        assert!(help_text("!", true).contains("`!ask <question>`"));
        assert!(info_text("!", true).contains("`!ask` command"));
        assert!(!info_text("!", false).contains("ask"));
    }

    #[test]
    fn test_uses_prefix() {
        let text = help_text("?", false);
        assert!(text.contains("`?hello`"));
        assert!(text.ends_with("python, discord, project, and hello."));
    }
}
