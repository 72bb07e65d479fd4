//! Scriptable platform connector for runtime tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use botfleet_cipher::{TokenCipher, TokenShape, KEY_LEN};
use botfleet_models::{BehaviorSettings, BotId};
use botfleet_runtime::{Connection, ConnectorError, PlatformConnector, RuntimeConfig, SessionSupervisor};

pub fn cipher() -> Arc<TokenCipher> {
    Arc::new(TokenCipher::with_key([42u8; KEY_LEN], TokenShape::telegram()))
}

pub fn supervisor(connector: Arc<FakeConnector>) -> Arc<SessionSupervisor> {
    supervisor_with(RuntimeConfig::default(), connector)
}

pub fn supervisor_with(config: RuntimeConfig, connector: Arc<FakeConnector>) -> Arc<SessionSupervisor> {
    Arc::new(SessionSupervisor::new(config, cipher(), connector))
}

#[derive(Default)]
struct Counters {
    opens: HashMap<BotId, usize>,
    closes: HashMap<BotId, usize>,
    credentials: HashMap<BotId, String>,
}

/// Records every open and close; can be told to fail, stall, or hang.
#[derive(Default)]
pub struct FakeConnector {
    counters: Arc<Mutex<Counters>>,
    failing: Mutex<HashSet<BotId>>,
    links: Mutex<HashMap<BotId, Arc<AtomicBool>>>,
    open_delay: Mutex<Option<Duration>>,
    hang_on_close: Arc<AtomicBool>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail(&self, id: &str) {
        self.failing.lock().unwrap().insert(BotId::from(id));
    }

    pub fn recover(&self, id: &str) {
        self.failing.lock().unwrap().remove(&BotId::from(id));
    }

    pub fn set_open_delay(&self, delay: Duration) {
        *self.open_delay.lock().unwrap() = Some(delay);
    }

    pub fn hang_on_close(&self) {
        self.hang_on_close.store(true, Ordering::SeqCst);
    }

    /// Simulate the platform dropping the connection.
    pub fn drop_link(&self, id: &str) {
        if let Some(alive) = self.links.lock().unwrap().get(&BotId::from(id)) {
            alive.store(false, Ordering::SeqCst);
        }
    }

    pub fn opens(&self, id: &str) -> usize {
        let counters = self.counters.lock().unwrap();
        counters.opens.get(&BotId::from(id)).copied().unwrap_or(0)
    }

    pub fn closes(&self, id: &str) -> usize {
        let counters = self.counters.lock().unwrap();
        counters.closes.get(&BotId::from(id)).copied().unwrap_or(0)
    }

    pub fn last_credential(&self, id: &str) -> Option<String> {
        let counters = self.counters.lock().unwrap();
        counters.credentials.get(&BotId::from(id)).cloned()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlatformConnector for FakeConnector {
    fn platform(&self) -> &'static str {
        "fake"
    }

    async fn open(
        &self,
        bot_id: &BotId,
        credential: &str,
        _settings: &BehaviorSettings,
    ) -> Result<Box<dyn Connection>, ConnectorError> {
        {
            let mut counters = self.counters.lock().unwrap();
            *counters.opens.entry(bot_id.clone()).or_default() += 1;
            counters.credentials.insert(bot_id.clone(), credential.to_string());
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.open_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.lock().unwrap().contains(bot_id) {
            return Err(ConnectorError::Handshake("401 Unauthorized".to_string()));
        }

        let alive = Arc::new(AtomicBool::new(true));
        self.links
            .lock()
            .unwrap()
            .insert(bot_id.clone(), Arc::clone(&alive));

        Ok(Box::new(FakeConnection {
            bot_id: bot_id.clone(),
            username: format!("{}_bot", bot_id),
            alive,
            counters: Arc::clone(&self.counters),
            hang: Arc::clone(&self.hang_on_close),
        }))
    }
}

struct FakeConnection {
    bot_id: BotId,
    username: String,
    alive: Arc<AtomicBool>,
    counters: Arc<Mutex<Counters>>,
    hang: Arc<AtomicBool>,
}

#[async_trait]
impl Connection for FakeConnection {
    fn is_connected(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn username(&self) -> Option<&str> {
        Some(&self.username)
    }

    async fn close(&mut self) -> Result<(), ConnectorError> {
        {
            let mut counters = self.counters.lock().unwrap();
            *counters.closes.entry(self.bot_id.clone()).or_default() += 1;
        }
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.alive.store(false, Ordering::SeqCst);
        Ok(())
    }
}
