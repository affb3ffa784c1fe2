//! Reminder scheduler.
//!
//! A recurring sweep, `sleep -> scan due -> deliver each -> persist`, running
//! for the lifetime of the process. Delivery is at most once: a due reminder
//! is removed from the collection before its delivery is attempted and is
//! never requeued, even if the attempt fails. Latency between `due_at` and
//! delivery is bounded by the sweep interval.

use crate::capabilities::{colours, Notice, Notifier};
use crate::error::{WorkflowError, WorkflowResult};
use crate::model::Reminder;
use crate::store::{JsonStore, StoreKind};
use chrono::{DateTime, Duration, Utc};
use concierge_common::{format_timestamp, truncate_string, ChannelId, UserId};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Longest reminder text kept.
pub const MAX_REMINDER_LENGTH: usize = 1000;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderSweepReport {
    /// Reminders found due.
    pub due: usize,
    /// Delivered successfully.
    pub delivered: usize,
    /// Delivery attempted and failed; the reminder is gone regardless.
    pub failed: usize,
}

/// Owns pending reminders and delivers them when due.
pub struct ReminderScheduler {
    store: Arc<JsonStore>,
    reminders: Mutex<Vec<Reminder>>,
    notifier: Arc<dyn Notifier>,
    interval: std::time::Duration,
}

impl ReminderScheduler {
    /// Builds the scheduler from the persisted collection.
    pub async fn load(
        store: Arc<JsonStore>,
        notifier: Arc<dyn Notifier>,
        interval: std::time::Duration,
    ) -> Self {
        let reminders: Vec<Reminder> = store.load(StoreKind::Reminders).await;
        info!("Loaded {} pending reminders", reminders.len());

        Self {
            store,
            reminders: Mutex::new(reminders),
            notifier,
            interval,
        }
    }

    /// Schedules a reminder `delay` from now.
    ///
    /// # Errors
    ///
    /// See [`ReminderScheduler::schedule_at`].
    pub async fn schedule(
        &self,
        owner: UserId,
        destination: ChannelId,
        message: &str,
        delay: Duration,
    ) -> WorkflowResult<Reminder> {
        self.schedule_at(owner, destination, message, delay, Utc::now())
            .await
    }

    /// Schedules a reminder `delay` after `now`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::InvalidReminder`] for a non-positive delay or
    /// an empty message. Nothing is stored in that case.
    pub async fn schedule_at(
        &self,
        owner: UserId,
        destination: ChannelId,
        message: &str,
        delay: Duration,
        now: DateTime<Utc>,
    ) -> WorkflowResult<Reminder> {
        if delay <= Duration::zero() {
            return Err(WorkflowError::InvalidReminder(
                "The delay must be greater than zero.".to_string(),
            ));
        }

        let message = message.trim();
        if message.is_empty() {
            return Err(WorkflowError::InvalidReminder(
                "Tell me what to remind you about.".to_string(),
            ));
        }

        let reminder = Reminder {
            id: Uuid::new_v4(),
            owner_id: owner,
            destination_id: destination,
            message: truncate_string(message, MAX_REMINDER_LENGTH),
            due_at: now + delay,
            created_at: now,
        };

        let mut reminders = self.reminders.lock().await;
        reminders.push(reminder.clone());
        self.store.persist(StoreKind::Reminders, &*reminders).await;

        info!(
            reminder_id = %reminder.id,
            owner_id = %owner,
            due_at = %reminder.due_at,
            "Scheduled reminder"
        );
        Ok(reminder)
    }

    /// Every pending reminder.
    pub async fn pending(&self) -> Vec<Reminder> {
        self.reminders.lock().await.clone()
    }

    /// Pending reminders of one member, soonest first.
    pub async fn pending_for(&self, owner: UserId) -> Vec<Reminder> {
        let mut mine: Vec<Reminder> = self
            .reminders
            .lock()
            .await
            .iter()
            .filter(|r| r.owner_id == owner)
            .cloned()
            .collect();
        mine.sort_by_key(|r| r.due_at);
        mine
    }

    /// Runs one sweep against the current time.
    pub async fn sweep(&self) -> ReminderSweepReport {
        self.sweep_at(Utc::now()).await
    }

    /// Runs one sweep as of `now`.
    ///
    /// Due reminders are drained under the lock, delivered one by one without
    /// it, and the collection is persisted once at the end. A failing
    /// delivery is logged and does not stop the others.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> ReminderSweepReport {
        let due: Vec<Reminder> = {
            let mut reminders = self.reminders.lock().await;
            let (due, pending): (Vec<_>, Vec<_>) =
                reminders.drain(..).partition(|r| r.is_due(now));
            *reminders = pending;
            due
        };

        let mut report = ReminderSweepReport {
            due: due.len(),
            ..ReminderSweepReport::default()
        };
        if due.is_empty() {
            debug!("No reminders due");
            return report;
        }

        for reminder in &due {
            match self.deliver(reminder).await {
                Ok(()) => {
                    report.delivered += 1;
                    debug!(reminder_id = %reminder.id, "Delivered reminder");
                }
                Err(e) => {
                    report.failed += 1;
                    error!(
                        reminder_id = %reminder.id,
                        channel_id = %reminder.destination_id,
                        error = %e,
                        "Reminder delivery failed, dropping it"
                    );
                }
            }
        }

        let reminders = self.reminders.lock().await;
        self.store.persist(StoreKind::Reminders, &*reminders).await;

        info!(
            due = report.due,
            delivered = report.delivered,
            failed = report.failed,
            "Reminder sweep finished"
        );
        report
    }

    async fn deliver(&self, reminder: &Reminder) -> WorkflowResult<()> {
        self.notifier.resolve_channel(reminder.destination_id).await?;
        let owner = self.notifier.resolve_user(reminder.owner_id).await?;

        let notice = Notice::new("⏰ Reminder")
            .description(reminder.message.clone())
            .field("Set", format_timestamp(reminder.created_at), true)
            .colour(colours::INFO);
        let content = format!("{}, here is your reminder!", owner.mention());

        self.notifier
            .send_message(reminder.destination_id, &content, Some(&notice))
            .await?;
        Ok(())
    }

    /// Sweeps forever on a fixed interval.
    ///
    /// Each sweep runs in its own task so that a panic inside one sweep is
    /// logged and the loop carries on.
    pub async fn run(self: Arc<Self>) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Reminder scheduler started"
        );

        loop {
            tokio::time::sleep(self.interval).await;

            let scheduler = Arc::clone(&self);
            if let Err(e) = tokio::spawn(async move { scheduler.sweep().await }).await {
                warn!(error = %e, "Reminder sweep aborted");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{MockNotifier, UserProfile};
    use crate::test_support::RecordingMessenger;
    use concierge_common::test_utils::{discord_fixtures, mock_timestamp};
    use concierge_common::MessageId;

    async fn scheduler_with(
        messenger: Arc<dyn Notifier>,
    ) -> (ReminderScheduler, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonStore::new(dir.path()));
        let scheduler =
            ReminderScheduler::load(store, messenger, std::time::Duration::from_secs(30)).await;
        (scheduler, dir)
    }

    #[tokio::test]
    async fn test_rejects_non_positive_delay_and_empty_text() {
        let (scheduler, _dir) = scheduler_with(Arc::new(RecordingMessenger::new())).await;
        let now = mock_timestamp(2024, 5, 1, 12, 0, 0);
        let user = discord_fixtures::test_user_id();
        let channel = discord_fixtures::test_channel_id();

        let zero = scheduler
            .schedule_at(user, channel, "x", Duration::zero(), now)
            .await;
        assert!(matches!(zero, Err(WorkflowError::InvalidReminder(_))));

        let blank = scheduler
            .schedule_at(user, channel, "   ", Duration::minutes(1), now)
            .await;
        assert!(matches!(blank, Err(WorkflowError::InvalidReminder(_))));

        assert!(scheduler.pending().await.is_empty());
    }

    #[tokio::test]
    async fn test_due_after_created() {
        let (scheduler, _dir) = scheduler_with(Arc::new(RecordingMessenger::new())).await;
        let now = mock_timestamp(2024, 5, 1, 12, 0, 0);

        let reminder = scheduler
            .schedule_at(
                discord_fixtures::test_user_id(),
                discord_fixtures::test_channel_id(),
                "water the plants",
                Duration::seconds(30),
                now,
            )
            .await
            .unwrap();

        assert!(reminder.due_at > reminder.created_at);
        assert_eq!(reminder.due_at - reminder.created_at, Duration::seconds(30));
    }

    #[tokio::test]
    async fn test_every_due_reminder_gets_exactly_one_attempt() {
        let messenger = Arc::new(RecordingMessenger::new());
        let (scheduler, _dir) = scheduler_with(messenger.clone()).await;
        let now = mock_timestamp(2024, 5, 1, 12, 0, 0);
        let user = discord_fixtures::test_user_id();

        for (i, channel) in [10_u64, 11, 12].into_iter().enumerate() {
            scheduler
                .schedule_at(
                    user,
                    ChannelId(channel),
                    &format!("task {i}"),
                    Duration::minutes(1),
                    now,
                )
                .await
                .unwrap();
        }
        scheduler
            .schedule_at(user, ChannelId(13), "later", Duration::hours(1), now)
            .await
            .unwrap();

        let report = scheduler.sweep_at(now + Duration::minutes(2)).await;

        assert_eq!(report.due, 3);
        assert_eq!(report.delivered, 3);
        assert_eq!(messenger.send_attempts().len(), 3);
        let pending = scheduler.pending().await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].message, "later");

        let again = scheduler.sweep_at(now + Duration::minutes(3)).await;
        assert_eq!(again.due, 0);
        assert_eq!(messenger.send_attempts().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_delivery_is_dropped_and_others_delivered() {
        let messenger = Arc::new(RecordingMessenger::new());
        messenger.mark_channel_unknown(ChannelId(10));
        messenger.fail_sends_to(ChannelId(11));
        let (scheduler, _dir) = scheduler_with(messenger.clone()).await;
        let now = mock_timestamp(2024, 5, 1, 12, 0, 0);
        let user = discord_fixtures::test_user_id();

        for channel in [10_u64, 11, 12] {
            scheduler
                .schedule_at(user, ChannelId(channel), "ping", Duration::seconds(5), now)
                .await
                .unwrap();
        }

        let report = scheduler.sweep_at(now + Duration::seconds(10)).await;

        assert_eq!(report.due, 3);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 2);
        assert!(scheduler.pending().await.is_empty());
        assert_eq!(messenger.sent_to(ChannelId(12)).len(), 1);
    }

    #[tokio::test]
    async fn test_delivery_mentions_owner_and_carries_message() {
        let messenger = Arc::new(RecordingMessenger::new());
        let (scheduler, _dir) = scheduler_with(messenger.clone()).await;
        let now = mock_timestamp(2024, 5, 1, 12, 0, 0);
        let user = discord_fixtures::test_user_id();
        let channel = discord_fixtures::test_channel_id();

        scheduler
            .schedule_at(user, channel, "call mum", Duration::seconds(1), now)
            .await
            .unwrap();
        scheduler.sweep_at(now + Duration::seconds(1)).await;

        let sent = messenger.sent_to(channel);
        assert_eq!(sent.len(), 1);
        assert!(sent[0].content.starts_with(&user.mention()));
        let notice = sent[0].notice.as_ref().unwrap();
        assert_eq!(notice.description.as_deref(), Some("call mum"));
    }

    #[tokio::test]
    async fn test_unresolvable_owner_counts_as_failure() {
        let mut notifier = MockNotifier::new();
        notifier.expect_resolve_channel().times(1).returning(|_| Ok(()));
        notifier
            .expect_resolve_user()
            .times(1)
            .returning(|_| Err(WorkflowError::collaborator("resolve user", "Unknown User")));
        notifier.expect_send_message().never();

        let (scheduler, _dir) = scheduler_with(Arc::new(notifier)).await;
        let now = mock_timestamp(2024, 5, 1, 12, 0, 0);
        scheduler
            .schedule_at(
                discord_fixtures::test_user_id(),
                discord_fixtures::test_channel_id(),
                "ghost",
                Duration::seconds(1),
                now,
            )
            .await
            .unwrap();

        let report = scheduler.sweep_at(now + Duration::seconds(2)).await;
        assert_eq!(report.failed, 1);
        assert!(scheduler.pending().await.is_empty());
    }

    #[tokio::test]
    async fn test_mock_notifier_delivery_path() {
        let mut notifier = MockNotifier::new();
        notifier.expect_resolve_channel().returning(|_| Ok(()));
        notifier.expect_resolve_user().returning(|id| {
            Ok(UserProfile {
                id,
                display_name: "someone".to_string(),
            })
        });
        notifier
            .expect_send_message()
            .withf(|_, content, notice| {
                content.contains("here is your reminder")
                    && notice.is_some_and(|n| n.title == "⏰ Reminder")
            })
            .times(1)
            .returning(|_, _, _| Ok(MessageId(1)));

        let (scheduler, _dir) = scheduler_with(Arc::new(notifier)).await;
        let now = mock_timestamp(2024, 5, 1, 12, 0, 0);
        scheduler
            .schedule_at(
                discord_fixtures::test_user_id(),
                discord_fixtures::test_channel_id(),
                "stretch",
                Duration::seconds(1),
                now,
            )
            .await
            .unwrap();

        assert_eq!(scheduler.sweep_at(now + Duration::seconds(1)).await.delivered, 1);
    }

    #[tokio::test]
    async fn test_pending_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonStore::new(dir.path()));
        let messenger: Arc<dyn Notifier> = Arc::new(RecordingMessenger::new());
        let now = mock_timestamp(2024, 5, 1, 12, 0, 0);

        let first = ReminderScheduler::load(
            Arc::clone(&store),
            Arc::clone(&messenger),
            std::time::Duration::from_secs(30),
        )
        .await;
        let reminder = first
            .schedule_at(
                discord_fixtures::test_user_id(),
                discord_fixtures::test_channel_id(),
                "renew passport",
                Duration::days(30),
                now,
            )
            .await
            .unwrap();
        drop(first);

        let second =
            ReminderScheduler::load(store, messenger, std::time::Duration::from_secs(30)).await;
        assert_eq!(second.pending().await, vec![reminder]);
    }
}
