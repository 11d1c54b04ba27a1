use crate::core::RawPayload;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Transport-level failures talking to the listings API
#[derive(Debug, Error)]
pub enum ListingsError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Listings API returned status {0}")]
    Status(u16),
}

/// Listings API client
///
/// Returns whatever the upstream sends as a [`RawPayload`]; shape handling
/// belongs to the normalizer.
pub struct ListingsClient {
    base_url: String,
    client: Client,
}

impl ListingsClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, ListingsError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { base_url, client })
    }

    /// Fetch the raw listings payload
    ///
    /// Bodies that parse as JSON come back as [`RawPayload::Json`]; anything
    /// else (including JSON with bare `NaN` values) as [`RawPayload::Text`].
    pub async fn fetch(&self) -> Result<RawPayload, ListingsError> {
        let url = format!("{}/api/get_data", self.base_url.trim_end_matches('/'));

        tracing::debug!("Fetching listings from: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!("Listings API returned {}", status);
            return Err(ListingsError::Status(status.as_u16()));
        }

        let body = response.text().await?;

        let payload = match serde_json::from_str::<Value>(&body) {
            Ok(value) => RawPayload::Json(value),
            Err(e) => {
                tracing::debug!("Listings body is not strict JSON ({}), passing on as text", e);
                RawPayload::Text(body)
            }
        };

        Ok(payload)
    }
}
