//! Identifier types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a bot row in the row store.
///
/// Stable across reconciliation cycles; the supervisor keys sessions by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BotId(String);

impl BotId {
    /// Creates an id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BotId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BotId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for BotId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_id_display_and_conversions() {
        let id = BotId::from("bot-1");
        assert_eq!(id.as_str(), "bot-1");
        assert_eq!(id.to_string(), "bot-1");
        assert_eq!(id, BotId::new(String::from("bot-1")));
    }

    #[test]
    fn test_bot_id_serializes_as_plain_string() {
        let id = BotId::from("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");

        let parsed: BotId = serde_json::from_str("\"xyz\"").unwrap();
        assert_eq!(parsed.as_str(), "xyz");
    }
}
