//! Bot configuration rows as read from the row store.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::BotId;

/// Lifecycle status of a bot row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BotStatus {
    /// Configured but never launched.
    #[default]
    Draft,
    /// Should be running.
    Active,
    /// Turned off by the owner.
    Inactive,
    /// Flagged as broken by the dashboard.
    Error,
}

impl BotStatus {
    /// Returns true if bots in this status are eligible to run.
    pub fn is_active(self) -> bool {
        self == BotStatus::Active
    }
}

/// Opaque behavior configuration (tone, response mode, rate limits, module toggles).
///
/// The supervisor passes it through to the session without interpreting it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BehaviorSettings(Map<String, Value>);

impl BehaviorSettings {
    /// Creates empty settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns a raw value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a string value, ignoring non-string entries.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Returns a boolean toggle, defaulting to `default` when absent or not a bool.
    pub fn flag(&self, key: &str, default: bool) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    /// Returns true if no settings are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical serialization used for change detection.
    ///
    /// `serde_json::Map` is ordered by key, so equal settings always produce
    /// the same string.
    pub fn canonical(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_default()
    }
}

impl From<Map<String, Value>> for BehaviorSettings {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A bot row from the desired-state source.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Reconciliation key.
    pub id: BotId,
    /// Display name, if the row has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Row status; only `active` rows run.
    #[serde(default)]
    pub status: BotStatus,
    /// Platform access token, plaintext or ciphertext.
    #[serde(alias = "bot_token", alias = "token")]
    pub credential: String,
    /// Pass-through behavior settings.
    #[serde(default, alias = "behavior", deserialize_with = "null_as_default")]
    pub settings: BehaviorSettings,
}

fn null_as_default<'de, D>(deserializer: D) -> std::result::Result<BehaviorSettings, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<BehaviorSettings>::deserialize(deserializer)?.unwrap_or_default())
}

impl BotConfig {
    /// Creates an active bot config with empty settings.
    pub fn new(id: impl Into<BotId>, credential: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            status: BotStatus::Active,
            credential: credential.into(),
            settings: BehaviorSettings::new(),
        }
    }

    /// Sets the status.
    pub fn with_status(mut self, status: BotStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the behavior settings.
    pub fn with_settings(mut self, settings: BehaviorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Returns true if this bot should be running.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("status", &self.status)
            .field("credential", &"<redacted>")
            .field("settings", &self.settings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_serde() {
        assert_eq!(serde_json::to_string(&BotStatus::Active).unwrap(), "\"active\"");
        let status: BotStatus = serde_json::from_str("\"inactive\"").unwrap();
        assert_eq!(status, BotStatus::Inactive);
        assert!(BotStatus::Active.is_active());
        assert!(!BotStatus::Error.is_active());
        assert!(!BotStatus::Draft.is_active());
    }

    #[test]
    fn test_bot_config_from_row() {
        let row = json!({
            "id": "b1",
            "name": "Support",
            "status": "active",
            "bot_token": "123456:ABCDEF",
            "settings": { "tone": "friendly", "rate_limit": 10 },
            "created_at": "2024-01-01T00:00:00Z"
        });

        let config: BotConfig = serde_json::from_value(row).unwrap();
        assert_eq!(config.id.as_str(), "b1");
        assert_eq!(config.name.as_deref(), Some("Support"));
        assert!(config.is_active());
        assert_eq!(config.credential, "123456:ABCDEF");
        assert_eq!(config.settings.get_str("tone"), Some("friendly"));
        assert_eq!(config.settings.get("rate_limit"), Some(&json!(10)));
    }

    #[test]
    fn test_bot_config_null_settings() {
        let row = json!({ "id": "b2", "status": "draft", "credential": "x", "settings": null });
        let config: BotConfig = serde_json::from_value(row).unwrap();
        assert!(config.settings.is_empty());
        assert_eq!(config.status, BotStatus::Draft);
    }

    #[test]
    fn test_debug_redacts_credential() {
        let config = BotConfig::new("b3", "123456:SECRET");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("SECRET"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_settings_canonical_is_order_independent() {
        let a = BehaviorSettings::new().with("tone", "calm").with("mode", "short");
        let b = BehaviorSettings::new().with("mode", "short").with("tone", "calm");
        assert_eq!(a.canonical(), b.canonical());
        assert!(a.flag("missing", true));
    }
}
