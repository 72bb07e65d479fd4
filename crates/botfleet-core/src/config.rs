//! Config directory and `.env` file handling.
//!
//! Secrets are usually provided by the deployment environment. For local
//! runs they can live in a `.env` file:
//!
//! ```text
//! ~/.config/botfleet/.env     # per-user secrets
//! ./.env.local, ./.env        # per-checkout overrides
//! ```
//!
//! # Environment Variables
//!
//! - `BOTFLEET_CONFIG_DIR`: Override the config directory

use std::path::{Path, PathBuf};

use tracing::debug;

/// Environment variable for a custom config directory.
pub const CONFIG_DIR_ENV: &str = "BOTFLEET_CONFIG_DIR";

/// Directory name under the platform config dir.
const APP_DIR: &str = "botfleet";

/// Get the botfleet config directory.
///
/// Resolved as:
/// 1. `BOTFLEET_CONFIG_DIR` if set
/// 2. `<platform config dir>/botfleet` (e.g. `~/.config/botfleet`)
/// 3. `.botfleet` in the current directory as fallback
pub fn config_dir() -> PathBuf {
    std::env::var(CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::config_dir()
                .map(|d| d.join(APP_DIR))
                .unwrap_or_else(|| PathBuf::from(".botfleet"))
        })
}

/// Get the per-user `.env` file path.
pub fn env_file() -> PathBuf {
    config_dir().join(".env")
}

/// Load environment files, never overriding variables that are already set.
///
/// Returns the files that were actually loaded. Missing files are not an
/// error; files that exist but fail to parse are logged and skipped.
pub fn load_env_files() -> Vec<PathBuf> {
    let mut loaded = Vec::new();

    let user_env = env_file();
    if load_env_file(&user_env) {
        loaded.push(user_env);
    }

    for name in [".env.local", ".env"] {
        let path = PathBuf::from(name);
        if load_env_file(&path) {
            loaded.push(path);
        }
    }

    loaded
}

/// Load a single env file if it exists. Returns true if it was loaded.
pub fn load_env_file(path: &Path) -> bool {
    if !path.exists() {
        return false;
    }

    match dotenvy::from_path(path) {
        Ok(()) => {
            debug!(path = %path.display(), "loaded env file");
            true
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "failed to load env file");
            false
        }
    }
}
