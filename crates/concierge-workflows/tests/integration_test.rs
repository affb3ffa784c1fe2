//! End-to-end tests for the workflow managers over a real data directory.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use concierge_common::{ChannelId, GuildId, MessageId, UserId};
use concierge_workflows::{
    CloseOutcome, Closer, HistoryEntry, JsonStore, Notice, Notifier, Reminder, ReminderScheduler,
    StoreKind, Ticket, TicketChannels, TicketManager, TicketSettings, TranscriptSource,
    UserProfile, WorkflowResult,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Gateway {
    sent: Mutex<Vec<(ChannelId, String)>>,
    next: AtomicU64,
}

impl Gateway {
    fn sent(&self) -> Vec<(ChannelId, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for Gateway {
    async fn resolve_user(&self, user: UserId) -> WorkflowResult<UserProfile> {
        Ok(UserProfile {
            id: user,
            display_name: "member".to_string(),
        })
    }

    async fn resolve_channel(&self, _channel: ChannelId) -> WorkflowResult<()> {
        Ok(())
    }

    async fn send_message<'a>(
        &self,
        channel: ChannelId,
        content: &str,
        _notice: Option<&'a Notice>,
    ) -> WorkflowResult<MessageId> {
        self.sent.lock().unwrap().push((channel, content.to_string()));
        Ok(MessageId(self.next.fetch_add(1, Ordering::SeqCst) + 1))
    }

    async fn direct_message<'a>(
        &self,
        _user: UserId,
        _content: &str,
        _notice: Option<&'a Notice>,
    ) -> WorkflowResult<()> {
        Ok(())
    }
}

#[async_trait]
impl TranscriptSource for Gateway {
    async fn fetch_history(&self, _channel: ChannelId) -> WorkflowResult<Vec<HistoryEntry>> {
        Ok(vec![HistoryEntry {
            speaker: "member".to_string(),
            text: "hello?".to_string(),
        }])
    }
}

#[async_trait]
impl TicketChannels for Gateway {
    async fn create_ticket_channel(
        &self,
        _guild: GuildId,
        _owner: UserId,
        _name: &str,
    ) -> WorkflowResult<ChannelId> {
        Ok(ChannelId(7_000 + self.next.fetch_add(1, Ordering::SeqCst)))
    }

    async fn delete_channel(&self, _channel: ChannelId) -> WorkflowResult<()> {
        Ok(())
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap()
}

#[tokio::test]
async fn test_reminder_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonStore::new(dir.path()));
    let gateway = Arc::new(Gateway::default());
    let scheduler = ReminderScheduler::load(
        Arc::clone(&store),
        gateway.clone(),
        std::time::Duration::from_secs(30),
    )
    .await;

    let destination = ChannelId(42);
    scheduler
        .schedule_at(
            UserId(1),
            destination,
            "stand up",
            Duration::seconds(30),
            t0(),
        )
        .await
        .unwrap();

    let early = scheduler.sweep_at(t0() + Duration::seconds(29)).await;
    assert_eq!(early.due, 0);
    assert!(gateway.sent().is_empty());
    let stored: Vec<Reminder> = store.load(StoreKind::Reminders).await;
    assert_eq!(stored.len(), 1);

    let on_time = scheduler.sweep_at(t0() + Duration::seconds(31)).await;
    assert_eq!(on_time.delivered, 1);
    let sent = gateway.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, destination);

    let stored: Vec<Reminder> = store.load(StoreKind::Reminders).await;
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_store_resilience() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::new(dir.path());

    let missing: Vec<Ticket> = store.load(StoreKind::Tickets).await;
    assert!(missing.is_empty());

    std::fs::write(store.path(StoreKind::Reminders), b"[{\"id\": \"abc\", \"own").unwrap();
    let truncated: Vec<Reminder> = store.load(StoreKind::Reminders).await;
    assert!(truncated.is_empty());

    let gateway = Arc::new(Gateway::default());
    let scheduler = ReminderScheduler::load(
        Arc::new(store),
        gateway,
        std::time::Duration::from_secs(30),
    )
    .await;
    assert!(scheduler.pending().await.is_empty());
}

#[tokio::test]
async fn test_ticket_lifecycle_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonStore::new(dir.path()));
    let gateway = Arc::new(Gateway::default());
    let settings = TicketSettings {
        archive_channel: Some(ChannelId(99)),
        ..TicketSettings::default()
    };
    let guild = GuildId(5);
    let owner = UserId(11);

    let manager = TicketManager::load(Arc::clone(&store), gateway.clone(), settings).await;
    let ticket = manager
        .open_at(guild, owner, Some("refund"), t0())
        .await
        .unwrap();
    manager
        .touch_at(guild, ticket.channel_id, t0() + Duration::hours(3))
        .await;
    drop(manager);

    let manager = TicketManager::load(Arc::clone(&store), gateway.clone(), settings).await;
    let idle = manager.sweep_at(t0() + Duration::hours(26)).await;
    assert_eq!(idle.eligible, 0);

    let report = manager.sweep_at(t0() + Duration::hours(28)).await;
    assert_eq!(report.closed, 1);

    let closer = Closer::Member {
        id: owner,
        elevated: false,
    };
    let again = manager
        .close_at(guild, ticket.channel_id, closer, t0() + Duration::hours(29))
        .await
        .unwrap();
    assert_eq!(again, CloseOutcome::AlreadyClosed);

    assert!(gateway
        .sent()
        .iter()
        .any(|(channel, text)| *channel == ChannelId(99) && text == "member: hello?"));

    let stored: Vec<Ticket> = store.load(StoreKind::Tickets).await;
    assert_eq!(stored.len(), 1);
    assert!(!stored[0].is_open());
}
