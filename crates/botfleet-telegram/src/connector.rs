//! Telegram implementation of the platform connector.

use std::sync::Arc;

use async_trait::async_trait;
use botfleet_models::{BehaviorSettings, BotId};
use botfleet_runtime::{Connection, ConnectorError, PlatformConnector};
use teloxide::dispatching::ShutdownToken;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::commands::Command;
use crate::error::{connector_error, Phase};
use crate::handlers::{schema, BotContext};
use crate::responder::Responder;

/// Opens long-polling Telegram sessions.
pub struct TelegramConnector {
    responder: Arc<dyn Responder>,
    api_url: Option<reqwest::Url>,
}

impl TelegramConnector {
    /// Create a connector that answers messages with `responder`.
    pub fn new(responder: Arc<dyn Responder>) -> Self {
        Self {
            responder,
            api_url: None,
        }
    }

    /// Use another Bot API server (local Bot API server, tests).
    pub fn with_api_url(mut self, api_url: reqwest::Url) -> Self {
        self.api_url = Some(api_url);
        self
    }

    fn bot(&self, token: &str) -> Bot {
        let bot = Bot::new(token);
        match &self.api_url {
            Some(url) => bot.set_api_url(url.clone()),
            None => bot,
        }
    }
}

#[async_trait]
impl PlatformConnector for TelegramConnector {
    fn platform(&self) -> &'static str {
        "telegram"
    }

    async fn open(
        &self,
        bot_id: &BotId,
        credential: &str,
        settings: &BehaviorSettings,
    ) -> Result<Box<dyn Connection>, ConnectorError> {
        let bot = self.bot(credential);

        let me = bot
            .get_me()
            .await
            .map_err(|e| connector_error(e, Phase::Handshake))?;
        let username = me.user.username.clone();

        // Long polling and a webhook cannot coexist.
        bot.delete_webhook()
            .await
            .map_err(|e| connector_error(e, Phase::Setup))?;
        bot.set_my_commands(Command::bot_commands())
            .await
            .map_err(|e| connector_error(e, Phase::Setup))?;

        let context = Arc::new(BotContext {
            bot_id: bot_id.clone(),
            settings: settings.clone(),
            responder: Arc::clone(&self.responder),
        });

        let mut dispatcher = Dispatcher::builder(bot, schema())
            .dependencies(dptree::deps![context])
            .default_handler(|_| async {})
            .build();
        let shutdown = dispatcher.shutdown_token();

        let task_bot_id = bot_id.clone();
        let task = tokio::spawn(async move {
            dispatcher.dispatch().await;
            debug!(bot_id = %task_bot_id, "dispatcher exited");
        });

        info!(
            bot_id = %bot_id,
            username = username.as_deref().unwrap_or("-"),
            "telegram session polling"
        );

        Ok(Box::new(TelegramConnection {
            bot_id: bot_id.clone(),
            username,
            shutdown,
            task,
        }))
    }
}

/// A running dispatcher for one bot.
pub struct TelegramConnection {
    bot_id: BotId,
    username: Option<String>,
    shutdown: ShutdownToken,
    task: JoinHandle<()>,
}

#[async_trait]
impl Connection for TelegramConnection {
    fn is_connected(&self) -> bool {
        !self.task.is_finished()
    }

    fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    async fn close(&mut self) -> Result<(), ConnectorError> {
        if self.task.is_finished() {
            return Ok(());
        }

        match self.shutdown.shutdown() {
            Ok(stopped) => {
                stopped.await;
                debug!(bot_id = %self.bot_id, "dispatcher shut down");
            }
            Err(_) => {
                // Not dispatching yet, nothing to drain.
                warn!(bot_id = %self.bot_id, "dispatcher idle, aborting");
                self.task.abort();
            }
        }

        // Aborted tasks report a cancelled JoinError.
        let _ = (&mut self.task).await;

        Ok(())
    }
}

impl Drop for TelegramConnection {
    fn drop(&mut self) {
        self.task.abort();
    }
}
