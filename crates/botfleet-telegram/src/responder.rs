//! Reply generation for inbound messages.
//!
//! The session hands every text message to a [`Responder`] together with the
//! bot's behavior settings. [`OpenAiResponder`] forwards it to a
//! chat-completions endpoint.

use std::time::Duration;

use async_trait::async_trait;
use botfleet_models::BehaviorSettings;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{Result, TelegramError};

/// Default chat-completions API base.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Sent when no reply can be generated.
pub const FALLBACK_REPLY: &str =
    "Sorry, I can't answer right now. Please try again in a little while.";

/// Sent on /start when the bot has no welcome message configured.
pub const DEFAULT_WELCOME: &str = "Hi! Send me a message and I'll do my best to help.";

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Answer clearly and briefly.";

const DEFAULT_MAX_TOKENS: u64 = 500;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Produces a reply to one inbound message.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Generate a reply for `message` using the bot's `settings`.
    async fn reply(&self, settings: &BehaviorSettings, message: &str) -> Result<String>;
}

/// Welcome text for /start.
pub fn welcome_text(settings: &BehaviorSettings) -> String {
    settings
        .get_str("welcome_message")
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_WELCOME)
        .to_string()
}

/// System prompt built from `system_prompt` and `tone`.
pub fn system_prompt(settings: &BehaviorSettings) -> String {
    let base = settings
        .get_str("system_prompt")
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_SYSTEM_PROMPT);

    match settings.get_str("tone").filter(|s| !s.trim().is_empty()) {
        Some(tone) => format!("{}\n\nRespond in a {} tone.", base, tone),
        None => base.to_string(),
    }
}

/// Calls an OpenAI-compatible chat-completions API.
#[derive(Clone)]
pub struct OpenAiResponder {
    client: reqwest::Client,
    api_key: Option<String>,
    api_base: String,
    model: String,
}

impl std::fmt::Debug for OpenAiResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiResponder")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiResponder {
    /// Create a responder. Without an API key every reply is an error.
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            api_base: DEFAULT_API_BASE.to_string(),
            model: model.into(),
        }
    }

    /// Point the responder at another API base (proxies, tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns true if an API key is configured.
    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    /// Request body for one message.
    pub fn request_body(&self, settings: &BehaviorSettings, message: &str) -> Value {
        let model = settings
            .get_str("model")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(self.model.as_str());
        let max_tokens = settings
            .get("max_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_MAX_TOKENS);

        json!({
            "model": model,
            "messages": [
                {"role": "system", "content": system_prompt(settings)},
                {"role": "user", "content": message}
            ],
            "max_tokens": max_tokens
        })
    }
}

#[async_trait]
impl Responder for OpenAiResponder {
    async fn reply(&self, settings: &BehaviorSettings, message: &str) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or(TelegramError::NoApiKey)?;
        let body = self.request_body(settings, message);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| TelegramError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TelegramError::RequestFailed(format!("status {}", status)));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| TelegramError::ParseError(e.to_string()))?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| TelegramError::ParseError("no content in response".to_string()))?;

        debug!(chars = content.len(), "generated reply");

        Ok(content)
    }
}
