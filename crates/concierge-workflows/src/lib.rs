//! # Concierge Workflows
//!
//! The stateful part of Concierge: reaction polls, timed reminders and
//! support tickets with inactivity-based auto-closure.
//!
//! Each manager owns its collection behind an async mutex, persists the whole
//! collection through [`JsonStore`] after every mutation, and talks to Discord
//! only through the narrow capability traits in [`capabilities`], so the
//! whole crate runs against in-memory fakes in tests.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod capabilities;
pub mod error;
pub mod model;
pub mod polls;
pub mod reminders;
pub mod store;
pub mod tickets;
pub mod transcript;

#[cfg(any(test, feature = "testing"))]
pub mod test_support;

pub use capabilities::*;
pub use error::*;
pub use model::*;
pub use polls::{PollManager, PollResult};
pub use reminders::{ReminderScheduler, ReminderSweepReport};
pub use store::{JsonStore, StoreKind};
pub use tickets::{CloseOutcome, Closer, TicketManager, TicketSettings, TicketSweepReport};
