//! # Concierge Bot
//!
//! Discord community bot with reaction polls, timed reminders and support
//! tickets.
//!
//! This is the main binary crate that wires configuration, persistence, the
//! background sweeps and the Poise framework together and runs them until
//! shutdown.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bot;
pub mod error;
pub mod health;

pub use bot::*;
pub use error::*;
