//! Shared text and time helpers.

use crate::error::{ConciergeError, Result};
use chrono::{DateTime, Duration, Utc};

/// Hard limit of a single Discord message, in characters.
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

/// Chunk size used when a reply has to be split over several messages.
pub const MESSAGE_CHUNK_SIZE: usize = 1900;

/// Longest delay accepted by [`parse_duration`].
pub const MAX_DURATION_SECONDS: i64 = 365 * 24 * 60 * 60;

/// Formats a timestamp for display.
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Truncates a string to a maximum number of characters with ellipsis.
#[must_use]
pub fn truncate_string(input: &str, max_length: usize) -> String {
    if input.chars().count() <= max_length {
        input.to_string()
    } else {
        let kept: String = input.chars().take(max_length.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Splits text into ordered chunks of at most `limit` characters.
///
/// Splits land on character boundaries, never inside a multi-byte code point.
/// Concatenating the chunks yields the original text.
#[must_use]
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for c in text.chars() {
        if count == limit {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(c);
        count += 1;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Packs lines into newline-joined chunks of at most `limit` characters.
///
/// Whole lines are kept together where possible; a single line longer than
/// `limit` is split with [`split_message`].
#[must_use]
pub fn chunk_lines<S: AsRef<str>>(lines: &[S], limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for line in lines {
        let line = line.as_ref();
        let len = line.chars().count();

        if len > limit {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                count = 0;
            }
            chunks.extend(split_message(line, limit));
            continue;
        }

        let needed = if current.is_empty() { len } else { len + 1 };
        if count + needed > limit {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        if !current.is_empty() {
            current.push('\n');
            count += 1;
        }
        current.push_str(line);
        count += len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Splits a reply only when it exceeds Discord's single-message limit.
#[must_use]
pub fn split_reply(text: &str) -> Vec<String> {
    if text.chars().count() > DISCORD_MESSAGE_LIMIT {
        split_message(text, MESSAGE_CHUNK_SIZE)
    } else {
        vec![text.to_string()]
    }
}

/// Parses a compact delay such as `30s`, `10m`, `2h`, `1d` or `1h30m`.
///
/// # Errors
///
/// Returns a validation error for empty input, unknown units, a number
/// without a unit, a zero delay, or a delay beyond [`MAX_DURATION_SECONDS`].
pub fn parse_duration(input: &str) -> Result<Duration> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ConciergeError::validation(
            "Please provide a time like `10m`, `2h` or `1d12h`.",
        ));
    }

    let mut total: i64 = 0;
    let mut digits = String::new();

    for c in trimmed.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }

        let unit = match c.to_ascii_lowercase() {
            's' => 1,
            'm' => 60,
            'h' => 60 * 60,
            'd' => 24 * 60 * 60,
            _ => {
                return Err(ConciergeError::validation_field(
                    format!("Unknown time unit '{c}'. Use s, m, h or d."),
                    input,
                ))
            }
        };

        if digits.is_empty() {
            return Err(ConciergeError::validation_field(
                format!("Expected a number before '{c}'."),
                input,
            ));
        }

        let value: i64 = digits.parse().map_err(|_| {
            ConciergeError::validation_field("That delay is too long.", input)
        })?;
        total = value
            .checked_mul(unit)
            .and_then(|seconds| total.checked_add(seconds))
            .ok_or_else(|| ConciergeError::validation_field("That delay is too long.", input))?;
        digits.clear();
    }

    if !digits.is_empty() {
        return Err(ConciergeError::validation_field(
            "Missing time unit. Use s, m, h or d (for example `10m`).",
            input,
        ));
    }

    if total == 0 {
        return Err(ConciergeError::validation_field(
            "The delay must be greater than zero.",
            input,
        ));
    }

    if total > MAX_DURATION_SECONDS {
        return Err(ConciergeError::validation_field(
            "Reminders can be at most 365 days in the future.",
            input,
        ));
    }

    Ok(Duration::seconds(total))
}

/// Formats a duration compactly, e.g. `1d 2h 30m`.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let parts: Vec<String> = [(days, "d"), (hours, "h"), (minutes, "m"), (seconds, "s")]
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect();

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}
