//! Rendering channel history into archivable text.

use crate::capabilities::HistoryEntry;
use concierge_common::{chunk_lines, MESSAGE_CHUNK_SIZE};

/// Placeholder for messages without text (attachments, embeds, stickers).
pub const EMPTY_MESSAGE: &str = "[no text content]";

/// One `speaker: text` line per message, oldest first.
#[must_use]
pub fn render_transcript(history: &[HistoryEntry]) -> Vec<String> {
    history
        .iter()
        .map(|entry| {
            let text = entry.text.trim();
            let text = if text.is_empty() { EMPTY_MESSAGE } else { text };
            format!("{}: {}", entry.speaker, text)
        })
        .collect()
}

/// Transcript lines packed into message-sized chunks.
#[must_use]
pub fn transcript_chunks(history: &[HistoryEntry]) -> Vec<String> {
    chunk_lines(&render_transcript(history), MESSAGE_CHUNK_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(speaker: &str, text: &str) -> HistoryEntry {
        HistoryEntry {
            speaker: speaker.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_lines_keep_order() {
        let history = vec![entry("alice", "my printer is on fire"), entry("staff", "  have you tried water?  ")];
        assert_eq!(
            render_transcript(&history),
            vec!["alice: my printer is on fire", "staff: have you tried water?"]
        );
    }

    #[test]
    fn test_empty_message_placeholder() {
        let history = vec![entry("bob", "")];
        assert_eq!(render_transcript(&history), vec![format!("bob: {EMPTY_MESSAGE}")]);
    }

    #[test]
    fn test_chunks_respect_message_limit() {
        let history: Vec<_> = (0..200)
            .map(|i| entry("member", &format!("message number {i} with some padding text")))
            .collect();
        let chunks = transcript_chunks(&history);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|chunk| chunk.chars().count() <= MESSAGE_CHUNK_SIZE));
        assert!(chunks[0].starts_with("member: message number 0 "));
        assert!(chunks.last().unwrap().ends_with("message number 199 with some padding text"));
    }

    #[test]
    fn test_no_history_no_chunks() {
        assert!(transcript_chunks(&[]).is_empty());
    }
}
