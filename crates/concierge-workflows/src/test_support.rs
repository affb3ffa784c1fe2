//! In-memory gateway used by tests across the workspace.

use crate::capabilities::{
    HistoryEntry, Notice, Notifier, Reactions, TicketChannels, TranscriptSource, UserProfile,
};
use crate::error::{WorkflowError, WorkflowResult};
use async_trait::async_trait;
use concierge_common::{ChannelId, GuildId, MessageId, UserId};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// A message the fake gateway was asked to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Target channel.
    pub channel: ChannelId,
    /// Assigned message id.
    pub message_id: MessageId,
    /// Plain content.
    pub content: String,
    /// Attached notice, if any.
    pub notice: Option<Notice>,
}

/// A direct message the fake gateway was asked to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentDirectMessage {
    /// Recipient.
    pub user: UserId,
    /// Plain content.
    pub content: String,
    /// Attached notice, if any.
    pub notice: Option<Notice>,
}

#[derive(Debug, Default)]
struct State {
    sent: Vec<SentMessage>,
    direct: Vec<SentDirectMessage>,
    send_attempts: Vec<ChannelId>,
    created_channels: Vec<(GuildId, UserId, String, ChannelId)>,
    deleted_channels: Vec<ChannelId>,
    reactions_added: Vec<(MessageId, String)>,
    history: HashMap<ChannelId, Vec<HistoryEntry>>,
    reaction_counts: HashMap<MessageId, HashMap<String, u64>>,
    unknown_channels: HashSet<ChannelId>,
    failing_channels: HashSet<ChannelId>,
    unreachable_users: HashSet<UserId>,
    failing_markers: HashSet<String>,
    fail_channel_creation: bool,
    channel_gate: Option<Arc<Notify>>,
    fail_history: bool,
}

/// Records every call and fails on demand.
#[derive(Debug)]
pub struct RecordingMessenger {
    state: Mutex<State>,
    next_id: AtomicU64,
}

impl Default for RecordingMessenger {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingMessenger {
    /// A gateway where every call succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            next_id: AtomicU64::new(900_000),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Makes `resolve_channel` fail for a channel.
    pub fn mark_channel_unknown(&self, channel: ChannelId) {
        self.state().unknown_channels.insert(channel);
    }

    /// Makes `send_message` fail for a channel.
    pub fn fail_sends_to(&self, channel: ChannelId) {
        self.state().failing_channels.insert(channel);
    }

    /// Makes direct messages to a user fail.
    pub fn mark_user_unreachable(&self, user: UserId) {
        self.state().unreachable_users.insert(user);
    }

    /// Makes adding the bot's reaction with `marker` fail.
    pub fn fail_reaction(&self, marker: &str) {
        self.state().failing_markers.insert(marker.to_string());
    }

    /// Makes ticket channel creation fail.
    pub fn fail_channel_creation(&self) {
        self.state().fail_channel_creation = true;
    }

    /// Makes channel creation wait until the returned gate is notified.
    pub fn hold_channel_creation(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state().channel_gate = Some(Arc::clone(&gate));
        gate
    }

    /// Makes history fetches fail.
    pub fn fail_history(&self) {
        self.state().fail_history = true;
    }

    /// Seeds a channel's history.
    pub fn set_history(&self, channel: ChannelId, entries: Vec<HistoryEntry>) {
        self.state().history.insert(channel, entries);
    }

    /// Seeds raw reaction counts on a message.
    pub fn set_reaction_counts(&self, message: MessageId, counts: &[(&str, u64)]) {
        let counts = counts
            .iter()
            .map(|(marker, count)| ((*marker).to_string(), *count))
            .collect();
        self.state().reaction_counts.insert(message, counts);
    }

    /// Messages successfully sent.
    #[must_use]
    pub fn sent(&self) -> Vec<SentMessage> {
        self.state().sent.clone()
    }

    /// Messages successfully sent to one channel.
    #[must_use]
    pub fn sent_to(&self, channel: ChannelId) -> Vec<SentMessage> {
        self.state()
            .sent
            .iter()
            .filter(|m| m.channel == channel)
            .cloned()
            .collect()
    }

    /// Every send attempt, successful or not.
    #[must_use]
    pub fn send_attempts(&self) -> Vec<ChannelId> {
        self.state().send_attempts.clone()
    }

    /// Direct messages successfully sent.
    #[must_use]
    pub fn direct_messages(&self) -> Vec<SentDirectMessage> {
        self.state().direct.clone()
    }

    /// Channels created, as (guild, owner, name, id).
    #[must_use]
    pub fn created_channels(&self) -> Vec<(GuildId, UserId, String, ChannelId)> {
        self.state().created_channels.clone()
    }

    /// Channels deleted.
    #[must_use]
    pub fn deleted_channels(&self) -> Vec<ChannelId> {
        self.state().deleted_channels.clone()
    }

    /// Reactions added, as (message, marker).
    #[must_use]
    pub fn reactions_added(&self) -> Vec<(MessageId, String)> {
        self.state().reactions_added.clone()
    }
}

#[async_trait]
impl Notifier for RecordingMessenger {
    async fn resolve_user(&self, user: UserId) -> WorkflowResult<UserProfile> {
        Ok(UserProfile {
            id: user,
            display_name: format!("user-{user}"),
        })
    }

    async fn resolve_channel(&self, channel: ChannelId) -> WorkflowResult<()> {
        if self.state().unknown_channels.contains(&channel) {
            return Err(WorkflowError::collaborator("resolve channel", "Unknown Channel"));
        }
        Ok(())
    }

    async fn send_message<'a>(
        &self,
        channel: ChannelId,
        content: &str,
        notice: Option<&'a Notice>,
    ) -> WorkflowResult<MessageId> {
        let message_id = MessageId(self.next_id());
        let mut state = self.state();
        state.send_attempts.push(channel);
        if state.failing_channels.contains(&channel) {
            return Err(WorkflowError::collaborator("send message", "Missing Access"));
        }
        state.sent.push(SentMessage {
            channel,
            message_id,
            content: content.to_string(),
            notice: notice.cloned(),
        });
        Ok(message_id)
    }

    async fn direct_message<'a>(
        &self,
        user: UserId,
        content: &str,
        notice: Option<&'a Notice>,
    ) -> WorkflowResult<()> {
        let mut state = self.state();
        if state.unreachable_users.contains(&user) {
            return Err(WorkflowError::collaborator(
                "direct message",
                "Cannot send messages to this user",
            ));
        }
        state.direct.push(SentDirectMessage {
            user,
            content: content.to_string(),
            notice: notice.cloned(),
        });
        Ok(())
    }
}

#[async_trait]
impl TranscriptSource for RecordingMessenger {
    async fn fetch_history(&self, channel: ChannelId) -> WorkflowResult<Vec<HistoryEntry>> {
        let state = self.state();
        if state.fail_history {
            return Err(WorkflowError::collaborator("fetch history", "Missing Access"));
        }
        Ok(state.history.get(&channel).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl TicketChannels for RecordingMessenger {
    async fn create_ticket_channel(
        &self,
        guild: GuildId,
        owner: UserId,
        name: &str,
    ) -> WorkflowResult<ChannelId> {
        let gate = self.state().channel_gate.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let channel = ChannelId(self.next_id());
        let mut state = self.state();
        if state.fail_channel_creation {
            return Err(WorkflowError::collaborator("create channel", "Missing Permissions"));
        }
        state
            .created_channels
            .push((guild, owner, name.to_string(), channel));
        Ok(channel)
    }

    async fn delete_channel(&self, channel: ChannelId) -> WorkflowResult<()> {
        self.state().deleted_channels.push(channel);
        Ok(())
    }
}

#[async_trait]
impl Reactions for RecordingMessenger {
    async fn add_reaction(
        &self,
        _channel: ChannelId,
        message: MessageId,
        marker: &str,
    ) -> WorkflowResult<()> {
        let mut state = self.state();
        if state.failing_markers.contains(marker) {
            return Err(WorkflowError::collaborator("add reaction", "Unknown Emoji"));
        }
        state.reactions_added.push((message, marker.to_string()));
        Ok(())
    }

    async fn reaction_counts(
        &self,
        _channel: ChannelId,
        message: MessageId,
    ) -> WorkflowResult<HashMap<String, u64>> {
        let state = self.state();
        if let Some(counts) = state.reaction_counts.get(&message) {
            return Ok(counts.clone());
        }

        let mut counts = HashMap::new();
        for (reacted, marker) in &state.reactions_added {
            if *reacted == message {
                *counts.entry(marker.clone()).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}
