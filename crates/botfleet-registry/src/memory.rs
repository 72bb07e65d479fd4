//! In-memory registry.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use botfleet_models::{BotConfig, BotId};
use tokio::sync::RwLock;

use crate::error::{RegistryError, Result};
use crate::BotRegistry;

/// A registry backed by a mutable list of rows.
///
/// Rows of every status are stored; only active ones are listed, mirroring
/// the row store query. Can be switched into an unavailable mode to
/// exercise the failure path.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    bots: RwLock<Vec<BotConfig>>,
    unavailable: AtomicBool,
    calls: AtomicUsize,
}

impl InMemoryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding `bots`.
    pub fn with_bots(bots: Vec<BotConfig>) -> Self {
        Self {
            bots: RwLock::new(bots),
            ..Self::default()
        }
    }

    /// Replaces every row.
    pub async fn set_bots(&self, bots: Vec<BotConfig>) {
        *self.bots.write().await = bots;
    }

    /// Inserts a row, replacing any row with the same id.
    pub async fn upsert(&self, bot: BotConfig) {
        let mut bots = self.bots.write().await;
        match bots.iter_mut().find(|b| b.id == bot.id) {
            Some(existing) => *existing = bot,
            None => bots.push(bot),
        }
    }

    /// Removes a row. Returns true if it existed.
    pub async fn remove(&self, id: &BotId) -> bool {
        let mut bots = self.bots.write().await;
        let before = bots.len();
        bots.retain(|b| &b.id != id);
        bots.len() != before
    }

    /// Makes subsequent listings fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of times the registry has been listed.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BotRegistry for InMemoryRegistry {
    async fn list_active_bots(&self) -> Result<Vec<BotConfig>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RegistryError::Unavailable);
        }

        let bots = self.bots.read().await;
        Ok(bots.iter().filter(|b| b.is_active()).cloned().collect())
    }
}
