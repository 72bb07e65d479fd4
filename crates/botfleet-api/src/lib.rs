//! Introspection API for the bot fleet.
//!
//! Read-only HTTP endpoints over the session supervisor:
//! - `GET /api/health` - liveness plus session counts
//! - `GET /api/sessions` - every tracked session
//! - `GET /api/sessions/:id` - one session, 404 when untracked
//!
//! # Example
//!
//! ```ignore
//! use botfleet_api::{serve, ApiConfig, AppState};
//!
//! let state = AppState::new(ApiConfig::default(), runtime.supervisor());
//! serve(&ApiConfig::default(), state, async { shutdown.await }).await?;
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
pub mod types;

pub use config::ApiConfig;
pub use error::{ApiError, Result};
pub use router::{create_router, serve};
pub use state::AppState;
