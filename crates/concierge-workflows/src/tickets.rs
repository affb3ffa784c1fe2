//! Ticket lifecycle: open, touch, close and the inactivity sweep.
//!
//! Tickets are keyed by (guild, channel). Closing is terminal and the closed
//! record is kept. A close marks and persists the record first, then archives
//! the transcript and deletes the channel as best-effort follow-ups, so a
//! second close racing the first always observes `AlreadyClosed`.

use crate::capabilities::{colours, Notice, TicketGateway};
use crate::error::{WorkflowError, WorkflowResult};
use crate::model::{ClosedBy, Ticket, TicketKey, TicketStatus};
use crate::store::{JsonStore, StoreKind};
use crate::transcript::transcript_chunks;
use chrono::{DateTime, Duration, Utc};
use concierge_common::{
    format_duration, format_timestamp, truncate_string, ChannelId, GuildId, UserId,
};
use std::sync::{Arc, PoisonError};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Longest reason kept on a ticket.
pub const MAX_REASON_LENGTH: usize = 500;

/// Reason stored when none is given.
pub const DEFAULT_REASON: &str = "No reason provided";

/// Tunables of the lifecycle manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketSettings {
    /// Idle time after which the sweep closes a ticket.
    pub inactivity_threshold: Duration,
    /// Time between sweeps.
    pub sweep_interval: std::time::Duration,
    /// Where transcripts go. Archiving is skipped when unset.
    pub archive_channel: Option<ChannelId>,
}

impl Default for TicketSettings {
    fn default() -> Self {
        Self {
            inactivity_threshold: Duration::hours(24),
            sweep_interval: std::time::Duration::from_secs(3600),
            archive_channel: None,
        }
    }
}

/// Who is asking for a close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closer {
    /// A guild member. `elevated` is true when they hold channel management
    /// rights.
    Member {
        /// Requesting member.
        id: UserId,
        /// Whether the member holds management rights.
        elevated: bool,
    },
    /// The inactivity sweep.
    System,
}

impl Closer {
    fn may_close(&self, ticket: &Ticket) -> bool {
        match self {
            Self::Member { id, elevated } => *elevated || *id == ticket.owner_id,
            Self::System => true,
        }
    }

    const fn closed_by(&self) -> ClosedBy {
        match self {
            Self::Member { id, .. } => ClosedBy::User(*id),
            Self::System => ClosedBy::System,
        }
    }
}

/// Result of a permitted close request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The ticket was open and is now closed.
    Closed(Box<Ticket>),
    /// The ticket was already closed; nothing changed.
    AlreadyClosed,
}

/// Outcome of one inactivity sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TicketSweepReport {
    /// Open tickets idle past the threshold at sweep start.
    pub eligible: usize,
    /// Tickets this sweep closed.
    pub closed: usize,
    /// Eligible tickets that could not be closed.
    pub failed: usize,
}

/// A ticket whose channel is still being created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingOpen {
    guild: GuildId,
    owner: UserId,
    number: u32,
}

/// Holds a ticket number until the open finishes, however it finishes.
struct Reservation<'a> {
    pending: &'a std::sync::Mutex<Vec<PendingOpen>>,
    entry: PendingOpen,
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|p| *p != self.entry);
    }
}

/// Owns ticket records and drives their lifecycle.
pub struct TicketManager {
    store: Arc<JsonStore>,
    tickets: Mutex<Vec<Ticket>>,
    pending: std::sync::Mutex<Vec<PendingOpen>>,
    gateway: Arc<dyn TicketGateway>,
    settings: TicketSettings,
}

impl TicketManager {
    /// Builds the manager from the persisted collection.
    pub async fn load(
        store: Arc<JsonStore>,
        gateway: Arc<dyn TicketGateway>,
        settings: TicketSettings,
    ) -> Self {
        let tickets: Vec<Ticket> = store.load(StoreKind::Tickets).await;
        let open = tickets.iter().filter(|t| t.is_open()).count();
        info!("Loaded {} tickets ({} open)", tickets.len(), open);

        Self {
            store,
            tickets: Mutex::new(tickets),
            pending: std::sync::Mutex::new(Vec::new()),
            gateway,
            settings,
        }
    }

    /// Opens a ticket for `owner` in `guild`.
    ///
    /// # Errors
    ///
    /// See [`TicketManager::open_at`].
    pub async fn open(
        &self,
        guild: GuildId,
        owner: UserId,
        reason: Option<&str>,
    ) -> WorkflowResult<Ticket> {
        self.open_at(guild, owner, reason, Utc::now()).await
    }

    /// Opens a ticket as of `now`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::TicketAlreadyOpen`] when the owner already has
    /// an open ticket in the guild, [`WorkflowError::TicketOpening`] while
    /// their previous request is still creating its channel, or the
    /// collaborator error when the channel cannot be created. No record is
    /// stored in any of these cases.
    ///
    /// The ticket number is reserved up front and the channel is created
    /// without holding the ticket lock.
    pub async fn open_at(
        &self,
        guild: GuildId,
        owner: UserId,
        reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> WorkflowResult<Ticket> {
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map_or_else(
                || DEFAULT_REASON.to_string(),
                |r| truncate_string(r, MAX_REASON_LENGTH),
            );

        let reservation = self.reserve(guild, owner).await?;
        let number = reservation.entry.number;

        let channel = self
            .gateway
            .create_ticket_channel(guild, owner, &Ticket::channel_name_for(number))
            .await?;

        let ticket = Ticket::open(guild, channel, number, owner, reason, now);
        let mut tickets = self.tickets.lock().await;
        let duplicate = open_ticket_of(&tickets, guild, owner).map(|t| t.channel_id);
        if let Some(existing) = duplicate {
            drop(tickets);
            if let Err(e) = self.gateway.delete_channel(channel).await {
                warn!(channel_id = %channel, error = %e, "Failed to delete duplicate ticket channel");
            }
            return Err(WorkflowError::TicketAlreadyOpen(existing));
        }
        tickets.push(ticket.clone());
        self.store.persist(StoreKind::Tickets, &*tickets).await;
        drop(tickets);
        drop(reservation);

        info!(
            guild_id = %guild,
            channel_id = %channel,
            owner_id = %owner,
            number,
            "Opened ticket"
        );

        let welcome = Notice::new(format!("🎫 Ticket #{number:04}"))
            .description("Support will be with you shortly. Use `close` when you are done.")
            .field("Opened by", owner.mention(), true)
            .field("Reason", ticket.reason.clone(), false)
            .colour(colours::SUCCESS);
        if let Err(e) = self
            .gateway
            .send_message(channel, &owner.mention(), Some(&welcome))
            .await
        {
            warn!(channel_id = %channel, error = %e, "Failed to post ticket welcome");
        }

        Ok(ticket)
    }

    async fn reserve(&self, guild: GuildId, owner: UserId) -> WorkflowResult<Reservation<'_>> {
        let tickets = self.tickets.lock().await;
        if let Some(existing) = open_ticket_of(&tickets, guild, owner) {
            return Err(WorkflowError::TicketAlreadyOpen(existing.channel_id));
        }

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if pending.iter().any(|p| p.guild == guild && p.owner == owner) {
            return Err(WorkflowError::TicketOpening);
        }

        let number = tickets
            .iter()
            .filter(|t| t.guild_id == guild)
            .map(|t| t.number)
            .chain(pending.iter().filter(|p| p.guild == guild).map(|p| p.number))
            .max()
            .unwrap_or(0)
            + 1;

        let entry = PendingOpen {
            guild,
            owner,
            number,
        };
        pending.push(entry);
        Ok(Reservation {
            pending: &self.pending,
            entry,
        })
    }

    /// Records activity in a ticket channel.
    ///
    /// Returns whether a tracked open ticket was updated. Untracked channels
    /// are ignored.
    pub async fn touch(&self, guild: GuildId, channel: ChannelId) -> bool {
        self.touch_at(guild, channel, Utc::now()).await
    }

    /// Records activity as of `now`.
    pub async fn touch_at(&self, guild: GuildId, channel: ChannelId, now: DateTime<Utc>) -> bool {
        let key = TicketKey {
            guild_id: guild,
            channel_id: channel,
        };

        let mut tickets = self.tickets.lock().await;
        let Some(ticket) = tickets.iter_mut().find(|t| t.key() == key && t.is_open()) else {
            return false;
        };

        if now > ticket.last_activity_at {
            ticket.last_activity_at = now;
        }
        self.store.persist(StoreKind::Tickets, &*tickets).await;
        true
    }

    /// Closes the ticket backed by `channel`.
    ///
    /// # Errors
    ///
    /// See [`TicketManager::close_at`].
    pub async fn close(
        &self,
        guild: GuildId,
        channel: ChannelId,
        closer: Closer,
    ) -> WorkflowResult<CloseOutcome> {
        self.close_at(guild, channel, closer, Utc::now()).await
    }

    /// Closes a ticket as of `now`.
    ///
    /// A closed ticket stays closed: closing it again returns
    /// [`CloseOutcome::AlreadyClosed`] and leaves `closed_at` untouched.
    /// Transcript archiving and channel deletion run after the record is
    /// persisted and never undo the close.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::TicketNotFound`] for an untracked channel and
    /// [`WorkflowError::Forbidden`] when the closer is neither the owner nor
    /// elevated.
    pub async fn close_at(
        &self,
        guild: GuildId,
        channel: ChannelId,
        closer: Closer,
        now: DateTime<Utc>,
    ) -> WorkflowResult<CloseOutcome> {
        let key = TicketKey {
            guild_id: guild,
            channel_id: channel,
        };

        let closed = {
            let mut tickets = self.tickets.lock().await;
            let ticket = tickets
                .iter_mut()
                .find(|t| t.key() == key)
                .ok_or(WorkflowError::TicketNotFound)?;

            if !ticket.is_open() {
                return Ok(CloseOutcome::AlreadyClosed);
            }
            if !closer.may_close(ticket) {
                return Err(WorkflowError::Forbidden);
            }

            ticket.status = TicketStatus::Closed;
            ticket.closed_by = Some(closer.closed_by());
            ticket.closed_at = Some(now);
            let closed = ticket.clone();
            self.store.persist(StoreKind::Tickets, &*tickets).await;
            closed
        };

        info!(
            guild_id = %guild,
            channel_id = %channel,
            closed_by = %closed.closed_by.map(|c| c.describe()).unwrap_or_default(),
            "Closed ticket"
        );

        self.archive(&closed).await;

        if let Err(e) = self.gateway.delete_channel(channel).await {
            warn!(channel_id = %channel, error = %e, "Failed to delete ticket channel");
        }

        Ok(CloseOutcome::Closed(Box::new(closed)))
    }

    async fn archive(&self, ticket: &Ticket) {
        let Some(archive) = self.settings.archive_channel else {
            debug!(channel_id = %ticket.channel_id, "No archive channel, skipping transcript");
            return;
        };

        let history = match self.gateway.fetch_history(ticket.channel_id).await {
            Ok(history) => history,
            Err(e) => {
                error!(channel_id = %ticket.channel_id, error = %e, "Failed to fetch ticket history");
                return;
            }
        };

        let mut header = Notice::new(format!("📁 Transcript of {}", ticket.channel_name()))
            .field("Owner", ticket.owner_id.mention(), true)
            .field("Opened", format_timestamp(ticket.created_at), true)
            .field("Reason", ticket.reason.clone(), false)
            .footer(format!("{} messages", history.len()))
            .colour(colours::DANGER);
        if let Some(closed_by) = ticket.closed_by {
            header = header.field("Closed by", closed_by.describe(), true);
        }

        if let Err(e) = self.gateway.send_message(archive, "", Some(&header)).await {
            error!(channel_id = %archive, error = %e, "Failed to archive ticket transcript");
            return;
        }

        for chunk in transcript_chunks(&history) {
            if let Err(e) = self.gateway.send_message(archive, &chunk, None).await {
                error!(channel_id = %archive, error = %e, "Transcript archive incomplete");
                return;
            }
        }
    }

    /// Runs one inactivity sweep against the current time.
    pub async fn sweep(&self) -> TicketSweepReport {
        self.sweep_at(Utc::now()).await
    }

    /// Runs one inactivity sweep as of `now`.
    ///
    /// Eligibility is decided from one snapshot taken at sweep start: a ticket
    /// touched after the snapshot is still closed. Each eligible ticket is
    /// closed independently and its owner is told by direct message.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> TicketSweepReport {
        let threshold = self.settings.inactivity_threshold;
        let eligible: Vec<(TicketKey, UserId, Duration)> = self
            .tickets
            .lock()
            .await
            .iter()
            .filter(|t| t.is_open() && t.idle_for(now) > threshold)
            .map(|t| (t.key(), t.owner_id, t.idle_for(now)))
            .collect();

        let mut report = TicketSweepReport {
            eligible: eligible.len(),
            ..TicketSweepReport::default()
        };
        if eligible.is_empty() {
            debug!("No idle tickets");
            return report;
        }

        for (key, owner, idle) in eligible {
            match self
                .close_at(key.guild_id, key.channel_id, Closer::System, now)
                .await
            {
                Ok(CloseOutcome::Closed(ticket)) => {
                    report.closed += 1;
                    self.notify_owner(&ticket, owner, idle).await;
                }
                Ok(CloseOutcome::AlreadyClosed) => {
                    debug!(channel_id = %key.channel_id, "Ticket closed before the sweep reached it");
                }
                Err(e) => {
                    report.failed += 1;
                    error!(channel_id = %key.channel_id, error = %e, "Auto-close failed");
                }
            }
        }

        info!(
            eligible = report.eligible,
            closed = report.closed,
            failed = report.failed,
            "Ticket sweep finished"
        );
        report
    }

    async fn notify_owner(&self, ticket: &Ticket, owner: UserId, idle: Duration) {
        let notice = Notice::new("🔒 Ticket closed")
            .description(format!(
                "Your ticket {} was closed after {} without activity.",
                ticket.channel_name(),
                format_duration(idle)
            ))
            .field("Reason", ticket.reason.clone(), false)
            .colour(colours::WARNING);

        if let Err(e) = self.gateway.direct_message(owner, "", Some(&notice)).await {
            warn!(owner_id = %owner, error = %e, "Could not tell owner about auto-close");
        }
    }

    /// Looks a ticket up by its channel.
    pub async fn get(&self, guild: GuildId, channel: ChannelId) -> Option<Ticket> {
        self.tickets
            .lock()
            .await
            .iter()
            .find(|t| t.guild_id == guild && t.channel_id == channel)
            .cloned()
    }

    /// Whether `channel` backs an open ticket.
    pub async fn is_ticket_channel(&self, guild: GuildId, channel: ChannelId) -> bool {
        self.get(guild, channel)
            .await
            .is_some_and(|t| t.is_open())
    }

    /// Every open ticket.
    pub async fn open_tickets(&self) -> Vec<Ticket> {
        self.tickets
            .lock()
            .await
            .iter()
            .filter(|t| t.is_open())
            .cloned()
            .collect()
    }

    /// Sweeps forever on the configured interval, isolating panics per sweep.
    pub async fn run(self: Arc<Self>) {
        info!(
            interval_secs = self.settings.sweep_interval.as_secs(),
            threshold = %format_duration(self.settings.inactivity_threshold),
            "Ticket sweep started"
        );

        loop {
            tokio::time::sleep(self.settings.sweep_interval).await;

            let manager = Arc::clone(&self);
            if let Err(e) = tokio::spawn(async move { manager.sweep().await }).await {
                warn!(error = %e, "Ticket sweep aborted");
            }
        }
    }
}

fn open_ticket_of(tickets: &[Ticket], guild: GuildId, owner: UserId) -> Option<&Ticket> {
    tickets
        .iter()
        .find(|t| t.guild_id == guild && t.owner_id == owner && t.is_open())
}
