//! Poll commands.

use crate::framework::{Context, Error};
use crate::ids;
use concierge_common::MessageId;
use concierge_workflows::WorkflowError;

/// Splits `question | option | option...` into the question and its options.
#[must_use]
pub fn parse_poll_input(input: &str) -> (String, Vec<String>) {
    let mut parts = input.split('|').map(str::trim);
    let title = parts.next().unwrap_or_default().to_string();
    let options = parts.map(ToString::to_string).collect();
    (title, options)
}

/// Reads a message id typed by a member, accepting a message link too.
#[must_use]
pub fn parse_message_id(input: &str) -> Option<MessageId> {
    input
        .trim()
        .rsplit('/')
        .next()
        .and_then(|raw| raw.parse::<u64>().ok())
        .filter(|id| *id > 0)
        .map(MessageId)
}

/// Starts a reaction poll: `question | option | option...`.
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn poll(
    ctx: Context<'_>,
    #[description = "Question and options separated by |"]
    #[rest]
    input: String,
) -> Result<(), Error> {
    let (title, options) = parse_poll_input(&input);
    ctx.defer().await?;

    let result = ctx
        .data()
        .polls
        .create(
            ids::user(ctx.author().id),
            ids::channel(ctx.channel_id()),
            &title,
            &options,
        )
        .await;

    match result {
        Ok(poll) => {
            if ctx.prefix() == "/" {
                ctx.say(format!("Poll posted. End it with `endpoll {}`.", poll.message_id))
                    .await?;
            }
        }
        Err(e) if e.is_user_facing() => {
            ctx.say(e.to_string()).await?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Ends a poll and posts the results.
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn endpoll(
    ctx: Context<'_>,
    #[description = "Id or link of the poll message"] message: String,
) -> Result<(), Error> {
    let Some(message_id) = parse_message_id(&message) else {
        ctx.say("That doesn't look like a message id.").await?;
        return Ok(());
    };

    ctx.defer().await?;
    match ctx.data().polls.end(message_id).await {
        Ok((poll, _)) => {
            if ctx.prefix() == "/" {
                ctx.say(format!("Ended poll: {}", poll.title)).await?;
            }
        }
        Err(e @ WorkflowError::PollNotFound(_)) => {
            ctx.say(e.to_string()).await?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_poll_input() {
        let (title, options) = parse_poll_input("Lunch? | Pizza |Tacos| ");
        assert_eq!(title, "Lunch?");
        assert_eq!(options, vec!["Pizza", "Tacos", ""]);

        let (title, options) = parse_poll_input("Just a question");
        assert_eq!(title, "Just a question");
        assert!(options.is_empty());
    }

    #[test]
    fn test_parse_message_id() {
        assert_eq!(parse_message_id("123456"), Some(MessageId(123_456)));
        assert_eq!(
            parse_message_id("https://discord.com/channels/1/2/987654321"),
            Some(MessageId(987_654_321))
        );
        assert_eq!(parse_message_id("abc"), None);
        assert_eq!(parse_message_id("0"), None);
    }
}
