//! REST client for the rate/chart backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};
use url::Url;

use super::DashboardBackend;
use crate::core::{
    ApiError, CurrencyPair, DataStatus, LatestRate, ServerStatus, Settings, TriggerAck,
};

/// Latest rate endpoint
const LATEST_RATE_PATH: &str = "/api/latest_rate";
/// Chart generation trigger endpoint
const PREGENERATE_PATH: &str = "/api/pregenerate_charts";
/// Backend identity endpoint
const SERVER_STATUS_PATH: &str = "/api/server_status";
/// Rate history coverage endpoint
const DATA_STATUS_PATH: &str = "/api/data_status";
/// Push event stream endpoint
pub(crate) const EVENTS_PATH: &str = "/api/events";

/// HTTP client for the backend
#[derive(Debug, Clone)]
pub struct BackendClient {
    /// HTTP client
    client: Client,
    /// Base URL, e.g. `http://127.0.0.1:5000`
    base_url: Url,
}

impl BackendClient {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Create a client from the `api.*` settings
    pub fn from_settings(settings: &Settings) -> Result<Self, ApiError> {
        let base_url = settings
            .get_string("api.base_url")
            .unwrap_or_else(|| "http://127.0.0.1:5000".to_string());
        let timeout_secs = settings.get_int("api.timeout_secs").unwrap_or(30).max(1) as u64;
        Self::new(&base_url, Duration::from_secs(timeout_secs))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Underlying HTTP client, shared with the event feed
    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Build an endpoint URL with pair query parameters
    pub(crate) fn endpoint(
        &self,
        path: &str,
        pair: Option<&CurrencyPair>,
    ) -> Result<Url, ApiError> {
        let mut url = self.base_url.join(path)?;
        if let Some(pair) = pair {
            url.query_pairs_mut()
                .append_pair("buy_currency", &pair.buy)
                .append_pair("sell_currency", &pair.sell);
        }
        Ok(url)
    }

    /// Send a GET request and decode the JSON body
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!(url = %url, "backend request");

        let response = self.client.get(url).send().await?;
        let text = Self::check_status(response).await?;

        Ok(serde_json::from_str(&text)?)
    }

    /// Read the body, turning non-2xx responses into `ApiError::Status`
    async fn check_status(response: Response) -> Result<String, ApiError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = error_message(&text);
            if status.as_u16() == 429 {
                warn!(status = status.as_u16(), message = %message, "backend rate limit hit");
            } else {
                error!(status = status.as_u16(), message = %message, "backend error");
            }
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(text)
    }
}

/// Pull a readable message out of an error body
fn error_message(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for field in ["message", "error"] {
            if let Some(Value::String(message)) = map.get(field) {
                return message.clone();
            }
        }
    }
    body.trim().to_string()
}

#[async_trait]
impl DashboardBackend for BackendClient {
    async fn latest_rate(&self, pair: &CurrencyPair) -> Result<LatestRate, ApiError> {
        let url = self.endpoint(LATEST_RATE_PATH, Some(pair))?;
        self.get(url).await
    }

    async fn trigger_chart(&self, pair: &CurrencyPair) -> Result<TriggerAck, ApiError> {
        let url = self.endpoint(PREGENERATE_PATH, Some(pair))?;
        self.get(url).await
    }

    async fn server_status(&self) -> Result<ServerStatus, ApiError> {
        let url = self.endpoint(SERVER_STATUS_PATH, None)?;
        self.get(url).await
    }

    async fn data_status(&self) -> Result<DataStatus, ApiError> {
        let url = self.endpoint(DATA_STATUS_PATH, None)?;
        self.get(url).await
    }
}
