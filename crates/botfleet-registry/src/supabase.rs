//! PostgREST (Supabase) backed registry.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use botfleet_models::BotConfig;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{RegistryError, Result};
use crate::BotRegistry;

/// Request timeout for row store queries.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest error body kept in [`RegistryError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Lists active bots from a PostgREST table.
pub struct SupabaseRegistry {
    client: reqwest::Client,
    base_url: Url,
    service_key: String,
    table: String,
}

impl fmt::Debug for SupabaseRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseRegistry")
            .field("base_url", &self.base_url.as_str())
            .field("service_key", &"<redacted>")
            .field("table", &self.table)
            .finish()
    }
}

impl SupabaseRegistry {
    /// Create a registry for `table` on the row store at `base_url`.
    pub fn new(
        base_url: &str,
        service_key: impl Into<String>,
        table: impl Into<String>,
    ) -> Result<Self> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| RegistryError::InvalidUrl(e.to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RegistryError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            service_key: service_key.into(),
            table: table.into(),
        })
    }

    /// URL of the "active rows" query.
    pub fn active_rows_url(&self) -> Result<Url> {
        let mut url = self
            .base_url
            .join(&format!("rest/v1/{}", self.table))
            .map_err(|e| RegistryError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("status", "eq.active");
        Ok(url)
    }
}

#[async_trait]
impl BotRegistry for SupabaseRegistry {
    async fn list_active_bots(&self) -> Result<Vec<BotConfig>> {
        let url = self.active_rows_url()?;

        let response = self
            .client
            .get(url)
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let rows: Vec<Value> = response.json().await?;
        let total = rows.len();

        // One malformed row must not hide the others.
        let bots: Vec<BotConfig> = rows
            .into_iter()
            .filter_map(|row| {
                let id = row.get("id").cloned();
                match serde_json::from_value::<BotConfig>(row) {
                    Ok(bot) => Some(bot),
                    Err(e) => {
                        warn!(id = ?id, error = %e, "skipping malformed bot row");
                        None
                    }
                }
            })
            .filter(BotConfig::is_active)
            .collect();

        debug!(table = %self.table, rows = total, active = bots.len(), "listed active bots");

        Ok(bots)
    }
}
