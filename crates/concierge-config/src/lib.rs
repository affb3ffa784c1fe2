//! # Concierge Config
//!
//! Type-safe configuration management for Concierge.
//!
//! Configuration is read from YAML, overlaid with environment variables and
//! validated before the bot starts.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::*;
pub use schema::*;
