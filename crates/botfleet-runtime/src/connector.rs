//! Chat platform boundary.
//!
//! The supervisor does not speak any platform protocol. It asks a
//! [`PlatformConnector`] to open a session for a bot and gets back a
//! [`Connection`] it exclusively owns until it closes it.

use async_trait::async_trait;
use botfleet_models::{BehaviorSettings, BotId};

use crate::error::ConnectorError;

/// A live connection to a chat platform for one bot.
///
/// Dropping a connection must release its resources even if
/// [`close`](Connection::close) was never awaited to completion.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Returns false once the inbound loop has stopped for any reason.
    fn is_connected(&self) -> bool;

    /// Account name reported by the platform handshake.
    fn username(&self) -> Option<&str> {
        None
    }

    /// Close the connection. Calling it more than once is a no-op.
    async fn close(&mut self) -> Result<(), ConnectorError>;
}

/// Opens platform sessions.
///
/// # Example
///
/// ```ignore
/// use botfleet_runtime::{Connection, PlatformConnector};
///
/// async fn connect(connector: &dyn PlatformConnector) {
///     let id = "bot-1".into();
///     match connector.open(&id, "123456:ABC", &Default::default()).await {
///         Ok(conn) => println!("connected as {:?}", conn.username()),
///         Err(e) => println!("failed: {}", e),
///     }
/// }
/// ```
#[async_trait]
pub trait PlatformConnector: Send + Sync {
    /// Platform name, used in logs.
    fn platform(&self) -> &'static str;

    /// Perform the handshake, register handlers, and start the inbound loop.
    ///
    /// `credential` is already decrypted.
    async fn open(
        &self,
        bot_id: &BotId,
        credential: &str,
        settings: &BehaviorSettings,
    ) -> Result<Box<dyn Connection>, ConnectorError>;
}
