//! Error types for workflow operations.

use crate::store::StoreKind;
use concierge_common::{ChannelId, MessageId};
use std::fmt;
use thiserror::Error;

/// Result type alias for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Everything a workflow operation can fail with.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// A Discord call failed (network, rate limit, permissions, unknown entity).
    #[error("{operation} failed: {message}")]
    Collaborator {
        /// What was being attempted.
        operation: &'static str,
        /// Collaborator-provided description.
        message: String,
    },

    /// Poll created with too few or too many options.
    #[error("A poll needs between {min} and {max} options, got {got}.")]
    InvalidPollOptions {
        /// Number of usable options supplied.
        got: usize,
        /// Lower bound.
        min: usize,
        /// Upper bound.
        max: usize,
    },

    /// Poll rejected for a reason other than its option count.
    #[error("{0}")]
    InvalidPoll(String),

    /// Reminder rejected at creation.
    #[error("{0}")]
    InvalidReminder(String),

    /// The channel is not a tracked ticket.
    #[error("This channel is not a ticket.")]
    TicketNotFound,

    /// The requester already owns an open ticket in this guild.
    #[error("You already have an open ticket: <#{0}>")]
    TicketAlreadyOpen(ChannelId),

    /// The requester's previous ticket is still being set up.
    #[error("Your ticket is already being opened.")]
    TicketOpening,

    /// No active poll is attached to this message.
    #[error("No active poll found for message {0}.")]
    PollNotFound(MessageId),

    /// The requester may not perform this action.
    #[error("Only the ticket owner or staff can close this ticket.")]
    Forbidden,

    /// Writing a collection to disk failed.
    #[error("Failed to persist {kind}: {message}")]
    Persistence {
        /// Collection that failed to save.
        kind: StoreKind,
        /// Underlying failure.
        message: String,
    },
}

impl WorkflowError {
    /// Wraps a collaborator failure.
    pub fn collaborator(operation: &'static str, error: impl fmt::Display) -> Self {
        Self::Collaborator {
            operation,
            message: error.to_string(),
        }
    }

    /// Wraps a persistence failure.
    pub fn persistence(kind: StoreKind, error: impl fmt::Display) -> Self {
        Self::Persistence {
            kind,
            message: error.to_string(),
        }
    }

    /// Validation and authorization errors are reported to the requester as-is.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::InvalidPollOptions { .. }
                | Self::InvalidPoll(_)
                | Self::InvalidReminder(_)
                | Self::TicketNotFound
                | Self::TicketAlreadyOpen(_)
                | Self::TicketOpening
                | Self::PollNotFound(_)
                | Self::Forbidden
        )
    }
}
