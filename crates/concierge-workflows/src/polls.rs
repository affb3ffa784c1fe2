//! Reaction polls.
//!
//! A poll is posted as a notice, each option gets a numbered marker reaction
//! from the bot, and ending the poll counts the reactions once, reports the
//! ranking and forgets the poll.

use crate::capabilities::{colours, Notice, PollGateway};
use crate::error::{WorkflowError, WorkflowResult};
use crate::model::Poll;
use crate::store::{JsonStore, StoreKind};
use chrono::{DateTime, Utc};
use concierge_common::{truncate_string, ChannelId, MessageId, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Markers handed out to options, in order.
pub const POLL_MARKERS: [&str; 10] = [
    "1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣", "7️⃣", "8️⃣", "9️⃣", "🔟",
];

/// Fewest options a poll may have.
pub const MIN_OPTIONS: usize = 2;

/// Most options a poll may have.
pub const MAX_OPTIONS: usize = POLL_MARKERS.len();

/// Longest title kept.
pub const MAX_TITLE_LENGTH: usize = 256;

/// Longest option label kept.
pub const MAX_OPTION_LENGTH: usize = 100;

/// Votes for one option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollResult {
    /// Option label.
    pub option: String,
    /// Its marker.
    pub marker: String,
    /// Votes, excluding the bot's own reaction.
    pub votes: u64,
}

/// Orders options by votes, highest first.
///
/// `counts` holds raw reaction counts per marker; `baseline` is subtracted
/// from each marker the bot reacted with. Equal counts keep the options'
/// original order.
#[must_use]
pub fn rank_options(poll: &Poll, counts: &HashMap<String, u64>, baseline: u64) -> Vec<PollResult> {
    let mut results: Vec<PollResult> = poll
        .options
        .iter()
        .zip(&poll.markers)
        .map(|(option, marker)| {
            let seeded = if poll.unseeded_markers.contains(marker) {
                0
            } else {
                baseline
            };
            PollResult {
                option: option.clone(),
                marker: marker.clone(),
                votes: counts
                    .get(marker)
                    .copied()
                    .unwrap_or(0)
                    .saturating_sub(seeded),
            }
        })
        .collect();

    // stable
    results.sort_by(|a, b| b.votes.cmp(&a.votes));
    results
}

/// Notice announcing a poll's final ranking.
#[must_use]
pub fn results_notice(poll: &Poll, results: &[PollResult]) -> Notice {
    let total: u64 = results.iter().map(|r| r.votes).sum();

    let lines: Vec<String> = results
        .iter()
        .map(|r| {
            let noun = if r.votes == 1 { "vote" } else { "votes" };
            format!("{} **{}** {} {}", r.marker, r.option, r.votes, noun)
        })
        .collect();

    let mut notice = Notice::new(format!("📊 Results: {}", poll.title))
        .description(lines.join("\n"))
        .footer(format!("{total} votes in total"))
        .colour(colours::SUCCESS);

    if let Some(winner) = results.first().filter(|r| r.votes > 0) {
        let tied = results.iter().filter(|r| r.votes == winner.votes).count();
        let verdict = if tied > 1 {
            format!("Tie between {tied} options")
        } else {
            winner.option.clone()
        };
        notice = notice.field("Winner", verdict, false);
    }
    notice
}

/// Owns active polls.
pub struct PollManager {
    store: Arc<JsonStore>,
    polls: Mutex<Vec<Poll>>,
    gateway: Arc<dyn PollGateway>,
    baseline: u64,
}

impl PollManager {
    /// Builds the manager from the persisted collection.
    ///
    /// `baseline` is the number of reactions per option the bot adds itself.
    pub async fn load(store: Arc<JsonStore>, gateway: Arc<dyn PollGateway>, baseline: u64) -> Self {
        let polls: Vec<Poll> = store.load(StoreKind::Polls).await;
        info!("Loaded {} active polls", polls.len());

        Self {
            store,
            polls: Mutex::new(polls),
            gateway,
            baseline,
        }
    }

    /// Posts a poll in `channel`.
    ///
    /// # Errors
    ///
    /// See [`PollManager::create_at`].
    pub async fn create(
        &self,
        owner: UserId,
        channel: ChannelId,
        title: &str,
        options: &[String],
    ) -> WorkflowResult<Poll> {
        self.create_at(owner, channel, title, options, Utc::now()).await
    }

    /// Posts a poll as of `now`.
    ///
    /// Blank options are ignored before counting.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::InvalidPollOptions`] unless 2 to 10 options
    /// remain, [`WorkflowError::InvalidPoll`] for a blank title, or the
    /// collaborator error when the poll message cannot be posted.
    pub async fn create_at(
        &self,
        owner: UserId,
        channel: ChannelId,
        title: &str,
        options: &[String],
        now: DateTime<Utc>,
    ) -> WorkflowResult<Poll> {
        let title = title.trim();
        if title.is_empty() {
            return Err(WorkflowError::InvalidPoll(
                "A poll needs a question.".to_string(),
            ));
        }

        let options: Vec<String> = options
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .map(|o| truncate_string(o, MAX_OPTION_LENGTH))
            .collect();
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&options.len()) {
            return Err(WorkflowError::InvalidPollOptions {
                got: options.len(),
                min: MIN_OPTIONS,
                max: MAX_OPTIONS,
            });
        }

        let markers: Vec<String> = POLL_MARKERS[..options.len()]
            .iter()
            .map(|m| (*m).to_string())
            .collect();
        let title = truncate_string(title, MAX_TITLE_LENGTH);

        let body: Vec<String> = markers
            .iter()
            .zip(&options)
            .map(|(marker, option)| format!("{marker} {option}"))
            .collect();
        let notice = Notice::new(format!("📊 {title}"))
            .description(body.join("\n"))
            .field("Asked by", owner.mention(), true)
            .footer("React to vote")
            .colour(colours::INFO);

        let message_id = self.gateway.send_message(channel, "", Some(&notice)).await?;

        let mut unseeded_markers = Vec::new();
        for marker in &markers {
            if let Err(e) = self.gateway.add_reaction(channel, message_id, marker).await {
                warn!(message_id = %message_id, marker, error = %e, "Failed to add poll marker");
                unseeded_markers.push(marker.clone());
            }
        }

        let poll = Poll {
            message_id,
            channel_id: channel,
            owner_id: owner,
            title,
            options,
            markers,
            unseeded_markers,
            created_at: now,
        };

        let mut polls = self.polls.lock().await;
        polls.push(poll.clone());
        self.store.persist(StoreKind::Polls, &*polls).await;

        info!(message_id = %message_id, options = poll.options.len(), "Created poll");
        Ok(poll)
    }

    /// Counts the votes of a poll, then removes it.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::PollNotFound`] for an unknown or already ended
    /// poll, or the collaborator error when reactions cannot be read. The poll
    /// stays active in the latter case.
    ///
    /// Reactions are read without holding the poll lock; when two tallies of
    /// the same poll overlap, the one that removes it first wins.
    pub async fn tally(&self, message_id: MessageId) -> WorkflowResult<(Poll, Vec<PollResult>)> {
        let channel = self
            .polls
            .lock()
            .await
            .iter()
            .find(|p| p.message_id == message_id)
            .map(|p| p.channel_id)
            .ok_or(WorkflowError::PollNotFound(message_id))?;

        let counts = self.gateway.reaction_counts(channel, message_id).await?;

        let mut polls = self.polls.lock().await;
        let index = polls
            .iter()
            .position(|p| p.message_id == message_id)
            .ok_or(WorkflowError::PollNotFound(message_id))?;
        let poll = polls.remove(index);
        self.store.persist(StoreKind::Polls, &*polls).await;
        drop(polls);

        let results = rank_options(&poll, &counts, self.baseline);
        info!(message_id = %message_id, "Ended poll");
        Ok((poll, results))
    }

    /// Ends a poll and posts its results where it was asked.
    ///
    /// # Errors
    ///
    /// As [`PollManager::tally`]. Posting the results is best-effort.
    pub async fn end(&self, message_id: MessageId) -> WorkflowResult<(Poll, Vec<PollResult>)> {
        let (poll, results) = self.tally(message_id).await?;

        let notice = results_notice(&poll, &results);
        if let Err(e) = self.gateway.send_message(poll.channel_id, "", Some(&notice)).await {
            warn!(message_id = %message_id, error = %e, "Failed to post poll results");
        }
        Ok((poll, results))
    }

    /// Active polls.
    pub async fn active(&self) -> Vec<Poll> {
        self.polls.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingMessenger;
    use concierge_common::test_utils::{discord_fixtures, mock_timestamp};

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn sample_poll() -> Poll {
        Poll {
            message_id: discord_fixtures::test_message_id(),
            channel_id: discord_fixtures::test_channel_id(),
            owner_id: discord_fixtures::test_user_id(),
            title: "Lunch?".to_string(),
            options: labels(&["A", "B", "C"]),
            markers: labels(&POLL_MARKERS[..3]),
            unseeded_markers: Vec::new(),
            created_at: mock_timestamp(2024, 5, 1, 12, 0, 0),
        }
    }

    async fn manager() -> (PollManager, Arc<RecordingMessenger>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonStore::new(dir.path()));
        let messenger = Arc::new(RecordingMessenger::new());
        let manager = PollManager::load(store, messenger.clone(), 1).await;
        (manager, messenger, dir)
    }

    #[test]
    fn test_ties_keep_option_order() {
        let poll = sample_poll();
        let counts: HashMap<String, u64> = [("1️⃣", 4), ("2️⃣", 4), ("3️⃣", 2)]
            .into_iter()
            .map(|(m, c)| (m.to_string(), c))
            .collect();

        let ranked: Vec<(String, u64)> = rank_options(&poll, &counts, 1)
            .into_iter()
            .map(|r| (r.option, r.votes))
            .collect();

        assert_eq!(
            ranked,
            vec![("A".to_string(), 3), ("B".to_string(), 3), ("C".to_string(), 1)]
        );
    }

    #[test]
    fn test_missing_counts_do_not_underflow() {
        let poll = sample_poll();
        let counts = HashMap::from([("3️⃣".to_string(), 5)]);

        let ranked = rank_options(&poll, &counts, 1);

        assert_eq!(ranked[0].option, "C");
        assert_eq!(ranked[0].votes, 4);
        assert_eq!(ranked[1].votes, 0);
        assert_eq!(ranked[2].votes, 0);
    }

    #[test]
    fn test_unseeded_marker_keeps_its_votes() {
        let mut poll = sample_poll();
        poll.unseeded_markers = labels(&["2️⃣"]);
        let counts: HashMap<String, u64> = [("1️⃣", 3), ("2️⃣", 3), ("3️⃣", 1)]
            .into_iter()
            .map(|(m, c)| (m.to_string(), c))
            .collect();

        let ranked: Vec<(String, u64)> = rank_options(&poll, &counts, 1)
            .into_iter()
            .map(|r| (r.option, r.votes))
            .collect();

        assert_eq!(
            ranked,
            vec![("B".to_string(), 3), ("A".to_string(), 2), ("C".to_string(), 0)]
        );
    }

    #[test]
    fn test_results_notice_reports_tie() {
        let poll = sample_poll();
        let results = vec![
            PollResult {
                option: "A".to_string(),
                marker: "1️⃣".to_string(),
                votes: 2,
            },
            PollResult {
                option: "B".to_string(),
                marker: "2️⃣".to_string(),
                votes: 2,
            },
        ];

        let notice = results_notice(&poll, &results);
        assert_eq!(notice.fields[0].value, "Tie between 2 options");
        assert_eq!(notice.footer.as_deref(), Some("4 votes in total"));
    }

    #[tokio::test]
    async fn test_option_count_bounds() {
        let (manager, messenger, _dir) = manager().await;
        let user = discord_fixtures::test_user_id();
        let channel = discord_fixtures::test_channel_id();

        let one = manager.create(user, channel, "Q", &labels(&["only"])).await;
        assert!(matches!(
            one,
            Err(WorkflowError::InvalidPollOptions { got: 1, min: 2, max: 10 })
        ));

        let eleven: Vec<String> = (0..11).map(|i| format!("option {i}")).collect();
        let too_many = manager.create(user, channel, "Q", &eleven).await;
        assert!(matches!(too_many, Err(WorkflowError::InvalidPollOptions { got: 11, .. })));

        let blank = manager.create(user, channel, "Q", &labels(&["a", "  ", ""])).await;
        assert!(matches!(blank, Err(WorkflowError::InvalidPollOptions { got: 1, .. })));

        assert!(messenger.sent().is_empty());
        assert!(manager.active().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_posts_and_reacts() {
        let (manager, messenger, _dir) = manager().await;

        let poll = manager
            .create(
                discord_fixtures::test_user_id(),
                discord_fixtures::test_channel_id(),
                "Pizza or tacos?",
                &labels(&["Pizza", "Tacos", "Both"]),
            )
            .await
            .unwrap();

        assert_eq!(poll.options.len(), poll.markers.len());
        let reactions: Vec<String> = messenger
            .reactions_added()
            .into_iter()
            .filter(|(m, _)| *m == poll.message_id)
            .map(|(_, marker)| marker)
            .collect();
        assert_eq!(reactions, poll.markers);
        assert_eq!(manager.active().await, vec![poll]);
    }

    #[tokio::test]
    async fn test_end_twice_is_not_found() {
        let (manager, messenger, _dir) = manager().await;
        let poll = manager
            .create(
                discord_fixtures::test_user_id(),
                discord_fixtures::test_channel_id(),
                "Ship it?",
                &labels(&["Yes", "No"]),
            )
            .await
            .unwrap();
        messenger.set_reaction_counts(poll.message_id, &[("1️⃣", 1), ("2️⃣", 3)]);

        let (_, results) = manager.end(poll.message_id).await.unwrap();
        assert_eq!(results[0].option, "No");
        assert_eq!(results[0].votes, 2);
        assert_eq!(results[1].votes, 0);

        let again = manager.end(poll.message_id).await;
        assert!(matches!(again, Err(WorkflowError::PollNotFound(id)) if id == poll.message_id));
        assert!(manager.active().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_marker_reaction_is_not_discounted() {
        let (manager, messenger, _dir) = manager().await;
        messenger.fail_reaction("2️⃣");
        let poll = manager
            .create(
                discord_fixtures::test_user_id(),
                discord_fixtures::test_channel_id(),
                "Tea or coffee?",
                &labels(&["Tea", "Coffee"]),
            )
            .await
            .unwrap();
        assert_eq!(poll.unseeded_markers, labels(&["2️⃣"]));
        assert_eq!(manager.active().await[0].unseeded_markers, labels(&["2️⃣"]));

        messenger.set_reaction_counts(poll.message_id, &[("1️⃣", 1), ("2️⃣", 1)]);
        let (_, results) = manager.tally(poll.message_id).await.unwrap();

        assert_eq!(results[0].option, "Coffee");
        assert_eq!(results[0].votes, 1);
        assert_eq!(results[1].votes, 0);
    }

    #[tokio::test]
    async fn test_overlapping_tallies_end_poll_once() {
        let (manager, _messenger, _dir) = manager().await;
        let poll = manager
            .create(
                discord_fixtures::test_user_id(),
                discord_fixtures::test_channel_id(),
                "Deploy today?",
                &labels(&["Yes", "No"]),
            )
            .await
            .unwrap();

        let (first, second) = tokio::join!(
            manager.tally(poll.message_id),
            manager.tally(poll.message_id)
        );

        let ended = [&first, &second].iter().filter(|r| r.is_ok()).count();
        assert_eq!(ended, 1);
        let not_found = [first, second]
            .into_iter()
            .filter(|r| matches!(r, Err(WorkflowError::PollNotFound(_))))
            .count();
        assert_eq!(not_found, 1);
        assert!(manager.active().await.is_empty());
    }

    #[tokio::test]
    async fn test_unvoted_poll_counts_zero() {
        let (manager, _messenger, _dir) = manager().await;
        let poll = manager
            .create(
                discord_fixtures::test_user_id(),
                discord_fixtures::test_channel_id(),
                "Anyone?",
                &labels(&["Yes", "No"]),
            )
            .await
            .unwrap();

        let (_, results) = manager.tally(poll.message_id).await.unwrap();
        assert!(results.iter().all(|r| r.votes == 0));
        assert_eq!(results[0].option, "Yes");
    }
}
