//! Core domain + application logic for the channel relay bot.
//!
//! This crate is framework-agnostic. Telegram lives behind the messaging port
//! (`messaging::port::MessagingPort`) implemented in the adapter crate.

pub mod admin;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod relay;
pub mod replace;
pub mod store;

pub use errors::{Error, Result};
