//! # Concierge Commands
//!
//! Discord front end for Concierge using the Poise framework.
//!
//! Commands work both as prefix commands (`!remind 10m stretch`) and as slash
//! commands. The [`gateway`] module implements the workflow capability traits
//! on top of serenity's HTTP client, and [`events`] handles plain messages:
//! ticket activity, mentions and keyword replies.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod ask;
pub mod events;
pub mod framework;
pub mod gateway;
pub mod general;
pub mod ids;
pub mod keywords;
pub mod poll;
pub mod remind;
pub mod roll;
pub mod ticket;

pub use framework::*;
pub use gateway::DiscordGateway;
