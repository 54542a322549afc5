//! Core domain + application logic for the group manager bot.
//!
//! This crate is framework-agnostic. Telegram lives behind the messaging port
//! implemented in the adapter crate; everything here can be driven by a test double.

pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod handlers;
pub mod logging;
pub mod messaging;
pub mod router;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{Error, Result};
