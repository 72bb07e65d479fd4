//! Typed settings read from the process environment.

use std::fmt;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Row store base URL (required).
pub const ROW_STORE_URL_ENV: &str = "SUPABASE_URL";
/// Row store service credential (required).
pub const ROW_STORE_KEY_ENV: &str = "SUPABASE_SERVICE_ROLE_KEY";
/// Master secret for credential encryption (required in production).
pub const ENCRYPTION_KEY_ENV: &str = "BOT_TOKEN_ENCRYPTION_KEY";
/// Language-model API key (optional).
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Language-model name (optional).
pub const OPENAI_MODEL_ENV: &str = "OPENAI_MODEL";
/// Deployment environment.
pub const ENVIRONMENT_ENV: &str = "BOTFLEET_ENV";
/// Fallback deployment environment variable.
pub const NODE_ENV: &str = "NODE_ENV";
/// Table holding the bot rows.
pub const BOTS_TABLE_ENV: &str = "BOTFLEET_BOTS_TABLE";
/// Seconds between reconciliation passes.
pub const REFRESH_INTERVAL_ENV: &str = "BOTFLEET_REFRESH_INTERVAL_SECS";
/// Seconds each session gets to close during shutdown.
pub const SHUTDOWN_TIMEOUT_ENV: &str = "BOTFLEET_SHUTDOWN_TIMEOUT_SECS";
/// Port of the introspection API.
pub const API_PORT_ENV: &str = "BOTFLEET_API_PORT";

/// Default language model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
/// Default bots table.
pub const DEFAULT_BOTS_TABLE: &str = "telegram_bots";
/// Default refresh interval.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);
/// Default per-session shutdown timeout.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);
/// Default introspection API port.
pub const DEFAULT_API_PORT: u16 = 8787;

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Local or staging deployment; insecure fallbacks are allowed.
    #[default]
    Development,
    /// Production; every secret must be configured.
    Production,
}

impl Environment {
    /// Parses an environment name. Only `production`/`prod` select production.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }

    /// Returns true for production deployments.
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => f.write_str("development"),
            Environment::Production => f.write_str("production"),
        }
    }
}

/// Settings for the fleet daemon.
#[derive(Clone)]
pub struct Settings {
    /// Row store base URL.
    pub row_store_url: String,
    /// Row store service credential.
    pub row_store_key: String,
    /// Master secret for credential encryption.
    pub encryption_secret: Option<String>,
    /// Language-model API key.
    pub openai_api_key: Option<String>,
    /// Language-model name.
    pub openai_model: String,
    /// Deployment environment.
    pub environment: Environment,
    /// Table holding the bot rows.
    pub bots_table: String,
    /// Time between reconciliation passes.
    pub refresh_interval: Duration,
    /// Time each session gets to close during shutdown.
    pub shutdown_timeout: Duration,
    /// Introspection API port.
    pub api_port: u16,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("row_store_url", &self.row_store_url)
            .field("row_store_key", &"<redacted>")
            .field("encryption_secret", &self.encryption_secret.as_ref().map(|_| "<redacted>"))
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("openai_model", &self.openai_model)
            .field("environment", &self.environment)
            .field("bots_table", &self.bots_table)
            .field("refresh_interval", &self.refresh_interval)
            .field("shutdown_timeout", &self.shutdown_timeout)
            .field("api_port", &self.api_port)
            .finish()
    }
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary lookup function.
    ///
    /// Empty or whitespace-only values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let row_store_url = get(ROW_STORE_URL_ENV).ok_or(ConfigError::MissingVar(ROW_STORE_URL_ENV))?;
        let row_store_key = get(ROW_STORE_KEY_ENV).ok_or(ConfigError::MissingVar(ROW_STORE_KEY_ENV))?;

        let environment = get(ENVIRONMENT_ENV)
            .or_else(|| get(NODE_ENV))
            .map(|v| Environment::parse(&v))
            .unwrap_or_default();

        let refresh_interval = match get(REFRESH_INTERVAL_ENV) {
            Some(v) => parse_secs(REFRESH_INTERVAL_ENV, &v)?,
            None => DEFAULT_REFRESH_INTERVAL,
        };

        let shutdown_timeout = match get(SHUTDOWN_TIMEOUT_ENV) {
            Some(v) => parse_secs(SHUTDOWN_TIMEOUT_ENV, &v)?,
            None => DEFAULT_SHUTDOWN_TIMEOUT,
        };

        let api_port = match get(API_PORT_ENV) {
            Some(v) => v.parse::<u16>().map_err(|e| ConfigError::InvalidVar {
                name: API_PORT_ENV,
                value: v.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_API_PORT,
        };

        Ok(Self {
            row_store_url,
            row_store_key,
            encryption_secret: get(ENCRYPTION_KEY_ENV),
            openai_api_key: get(OPENAI_API_KEY_ENV),
            openai_model: get(OPENAI_MODEL_ENV).unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            environment,
            bots_table: get(BOTS_TABLE_ENV).unwrap_or_else(|| DEFAULT_BOTS_TABLE.to_string()),
            refresh_interval,
            shutdown_timeout,
            api_port,
        })
    }

    /// Non-fatal configuration problems worth logging at startup.
    ///
    /// A missing encryption secret is reported by the cipher when it falls
    /// back to the development key.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.openai_api_key.is_none() {
            warnings.push(format!(
                "{} not set; bots will answer with a fallback message",
                OPENAI_API_KEY_ENV
            ));
        }

        warnings
    }
}

fn parse_secs(name: &'static str, value: &str) -> Result<Duration> {
    match value.parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidVar {
            name,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::InvalidVar {
            name,
            value: value.to_string(),
            reason: e.to_string(),
        }),
    }
}
