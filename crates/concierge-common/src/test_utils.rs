//! Test utilities and shared test helpers for Concierge.
//!
//! Common fixtures used by unit and integration tests across the workspace.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize logging for tests. Safe to call multiple times.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));

        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(filter)
            .try_init();
    });
}

/// Test fixture for creating a fixed timestamp.
///
/// # Panics
///
/// Panics if the components do not form a valid UTC date-time.
#[must_use]
pub fn mock_timestamp(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    min: u32,
    sec: u32,
) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .single()
        .expect("invalid mock timestamp")
}

/// Create a temporary directory for tests that automatically cleans up.
///
/// # Panics
///
/// Panics if the directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Discord-related test fixtures.
pub mod discord_fixtures {
    use crate::types::{ChannelId, GuildId, MessageId, UserId};

    /// A guild used throughout the tests.
    #[must_use]
    pub const fn test_guild_id() -> GuildId {
        GuildId(100_000_000_000_000_001)
    }

    /// A generic text channel.
    #[must_use]
    pub const fn test_channel_id() -> ChannelId {
        ChannelId(200_000_000_000_000_001)
    }

    /// A second text channel, used as the transcript archive.
    #[must_use]
    pub const fn test_archive_channel_id() -> ChannelId {
        ChannelId(200_000_000_000_000_999)
    }

    /// A regular member.
    #[must_use]
    pub const fn test_user_id() -> UserId {
        UserId(300_000_000_000_000_001)
    }

    /// Another regular member.
    #[must_use]
    pub const fn other_user_id() -> UserId {
        UserId(300_000_000_000_000_002)
    }

    /// A message.
    #[must_use]
    pub const fn test_message_id() -> MessageId {
        MessageId(400_000_000_000_000_001)
    }
}
