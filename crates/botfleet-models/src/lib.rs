//! Core data models for the bot fleet.
//!
//! This crate provides the types shared between the registry (desired
//! state), the supervisor (actual state) and the introspection API.

pub mod bot;
pub mod ids;
pub mod session;

pub use bot::{BehaviorSettings, BotConfig, BotStatus};
pub use ids::BotId;
pub use session::{SessionSnapshot, SessionState};
