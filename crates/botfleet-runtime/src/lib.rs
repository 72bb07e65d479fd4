//! Session supervision for a fleet of chat bots.
//!
//! This crate keeps one live platform session per active bot and converges
//! the live set onto whatever the registry says should be running:
//! - `SessionSupervisor` - owns sessions, starts, stops and reconciles them
//! - `RefreshLoop` - re-reads the registry on an interval and reconciles
//! - `FleetRuntime` - main entry point combining the two
//!
//! The chat platform itself sits behind [`PlatformConnector`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use botfleet_runtime::{FleetRuntime, RuntimeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut runtime = FleetRuntime::new(RuntimeConfig::default(), cipher, connector, registry);
//!
//!     let mut events = runtime.supervisor().subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     runtime.start().await?;
//!     tokio::signal::ctrl_c().await?;
//!     runtime.shutdown().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Guarantees
//!
//! - At most one live session per bot id.
//! - Operations on the same bot are serialized; different bots run in parallel.
//! - One bot failing to start never blocks the others; it is retried every pass.
//! - A registry outage leaves running sessions alone.

pub mod config;
pub mod connector;
pub mod error;
pub mod event;
pub mod refresh;
pub mod runtime;
mod session;
pub mod supervisor;

pub use config::RuntimeConfig;
pub use connector::{Connection, PlatformConnector};
pub use error::{ConnectorError, Result, RuntimeError};
pub use event::SupervisorEvent;
pub use refresh::{RefreshHandle, RefreshLoop};
pub use runtime::FleetRuntime;
pub use supervisor::{config_fingerprint, ReconcileReport, SessionSupervisor};
