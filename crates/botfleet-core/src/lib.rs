//! Botfleet Core - configuration shared by every fleet component.
//!
//! - **config**: config directory location and `.env` loading
//! - **settings**: typed settings read from the environment, with startup validation

pub mod config;
pub mod error;
pub mod settings;

pub use config::{config_dir, env_file, load_env_files};
pub use error::{ConfigError, Result};
pub use settings::{Environment, Settings};
