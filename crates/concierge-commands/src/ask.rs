//! Questions answered by the text generator.

use crate::framework::{Context, Error};
use concierge_ai::{GenerationConfig, TextGenerator};
use concierge_common::split_reply;
use tracing::{debug, error};

/// Reply when no generator is configured.
pub const AI_UNAVAILABLE: &str = "Sorry, Google AI integration is not available at the moment.";

/// Reply for `ask` without a question.
#[must_use]
pub fn usage_hint(prefix: &str) -> String {
    format!("Please provide a question. Example: `{prefix}ask what is the capital of France?`")
}

/// Messages to send in answer to `question`, in order.
///
/// Long answers are split into chunks that fit a single message.
pub async fn answer(
    generator: Option<&dyn TextGenerator>,
    config: &GenerationConfig,
    question: Option<&str>,
    prefix: &str,
) -> Vec<String> {
    let Some(generator) = generator else {
        return vec![AI_UNAVAILABLE.to_string()];
    };

    let Some(question) = question.map(str::trim).filter(|q| !q.is_empty()) else {
        return vec![usage_hint(prefix)];
    };

    match generator.generate(question, config).await {
        Ok(text) => {
            debug!(model = generator.model(), chars = text.chars().count(), "Generated answer");
            split_reply(&text)
        }
        Err(e) => {
            error!("Error with Google AI: {}", e);
            vec![format!(
                "Sorry, I encountered an error while processing your question: {e}"
            )]
        }
    }
}

/// Asks the bot a question.
#[poise::command(prefix_command, slash_command)]
pub async fn ask(
    ctx: Context<'_>,
    #[description = "What do you want to know?"]
    #[rest]
    question: Option<String>,
) -> Result<(), Error> {
    let data = ctx.data();
    if data.ai_enabled() && question.is_some() {
        ctx.defer_or_broadcast().await?;
    }

    let replies = answer(
        data.generator.as_deref(),
        &data.generation,
        question.as_deref(),
        data.prefix(),
    )
    .await;

    for reply in replies {
        ctx.say(reply).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use concierge_ai::{AiError, AiResult};

    struct Canned(Result<String, u16>);

    #[async_trait]
    impl TextGenerator for Canned {
        async fn generate(&self, _prompt: &str, _config: &GenerationConfig) -> AiResult<String> {
            self.0.clone().map_err(|status| AiError::Api {
                status,
                message: "quota exceeded".to_string(),
            })
        }

        fn model(&self) -> &str {
            "canned"
        }
    }

    #[tokio::test]
    async fn test_unavailable_comes_first() {
        let replies = answer(None, &GenerationConfig::default(), None, "!").await;
        assert_eq!(replies, vec![AI_UNAVAILABLE.to_string()]);
    }

    #[tokio::test]
    async fn test_missing_question_gets_usage() {
        let generator = Canned(Ok("unused".to_string()));
        let replies = answer(Some(&generator), &GenerationConfig::default(), Some("  "), "!").await;
        assert_eq!(
            replies,
            vec!["Please provide a question. Example: `!ask what is the capital of France?`"]
        );
    }

    #[tokio::test]
    async fn test_long_answer_is_chunked_in_order() {
        let text: String = "abcdefghij".repeat(250);
        let generator = Canned(Ok(text.clone()));

        let replies = answer(Some(&generator), &GenerationConfig::default(), Some("q"), "!").await;

        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0].chars().count(), 1900);
        assert_eq!(replies.concat(), text);
    }

    #[tokio::test]
    async fn test_generator_error_is_reported() {
        let generator = Canned(Err(429));
        let replies = answer(Some(&generator), &GenerationConfig::default(), Some("q"), "!").await;
        assert_eq!(
            replies,
            vec!["Sorry, I encountered an error while processing your question: API returned 429: quota exceeded"]
        );
    }
}
