//! Telegram sessions for the bot fleet.
//!
//! [`TelegramConnector`] implements the runtime's platform boundary on top of
//! teloxide long polling. Every session registers `/start` and `/help` and
//! answers other text through a [`Responder`].

pub mod commands;
pub mod connector;
pub mod error;
mod handlers;
pub mod responder;

pub use commands::Command;
pub use connector::{TelegramConnection, TelegramConnector};
pub use error::{Result, TelegramError};
pub use responder::{OpenAiResponder, Responder, FALLBACK_REPLY};
