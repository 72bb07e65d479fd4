//! Desired-state source for the bot fleet.
//!
//! The supervisor only needs one question answered: which bots should be
//! running right now? [`BotRegistry`] is that contract. Two implementations
//! are provided:
//!
//! - [`SupabaseRegistry`] - queries a PostgREST row store over HTTP
//! - [`InMemoryRegistry`] - a mutable list, for tests and local runs
//!
//! Transport failures are reported as [`RegistryError`], never as an empty
//! list, so callers can tell "nothing should run" from "could not ask".

pub mod error;
pub mod memory;
pub mod supabase;

use async_trait::async_trait;
use botfleet_models::BotConfig;

pub use error::{RegistryError, Result};
pub use memory::InMemoryRegistry;
pub use supabase::SupabaseRegistry;

/// Source of the bots that should currently be running.
#[async_trait]
pub trait BotRegistry: Send + Sync {
    /// List every bot whose status is `active`.
    ///
    /// Called on every refresh tick, so it must be cheap enough to poll.
    async fn list_active_bots(&self) -> Result<Vec<BotConfig>>;
}
