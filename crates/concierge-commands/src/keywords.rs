//! Keyword auto-replies and mention handling for plain messages.

use once_cell::sync::Lazy;
use regex::Regex;

/// Trigger words and their replies, checked in this order.
pub const KEYWORDS: [(&str, &str); 4] = [
    ("hello", "Hello there!"),
    ("project", "Need help with your project?"),
    ("python", "Python is a great programming language!"),
    ("discord", "Discord bots are fun to make!"),
];

static KEYWORD_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    KEYWORDS
        .iter()
        .map(|(keyword, reply)| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(keyword));
            (
                Regex::new(&pattern).expect("Invalid keyword regex pattern"),
                *reply,
            )
        })
        .collect()
});

static MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<@!?\d+>").expect("Invalid mention regex pattern"));

/// Reply for the first keyword found as a whole word, if any.
#[must_use]
pub fn match_keyword(content: &str) -> Option<&'static str> {
    KEYWORD_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(content))
        .map(|(_, reply)| *reply)
}

/// Message text with every user mention removed and trimmed.
#[must_use]
pub fn strip_mentions(content: &str) -> String {
    MENTION.replace_all(content, "").trim().to_string()
}
