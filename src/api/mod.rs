//! Backend collaborators: HTTP client, push events and the SSE feed.

mod client;
mod event;
mod sse;

use async_trait::async_trait;

use crate::core::{ApiError, CurrencyPair, DataStatus, LatestRate, ServerStatus, TriggerAck};

pub use client::BackendClient;
pub use event::{
    PushEvent, EVENT_CHART_ERROR, EVENT_CHART_READY, EVENT_CONNECTED, EVENT_HEARTBEAT,
    EVENT_PROGRESS_UPDATE, EVENT_RATE_UPDATED,
};
pub use sse::{EventFeed, SseDecoder, SseFrame};

/// Backend operations the orchestrator depends on
#[async_trait]
pub trait DashboardBackend: Send + Sync {
    /// Fetch the latest rate of a pair
    async fn latest_rate(&self, pair: &CurrencyPair) -> Result<LatestRate, ApiError>;

    /// Ask the backend to generate charts for every period of a pair.
    ///
    /// Only acknowledges the request: charts arrive later on the push feed.
    async fn trigger_chart(&self, pair: &CurrencyPair) -> Result<TriggerAck, ApiError>;

    /// Identity of the running backend instance
    async fn server_status(&self) -> Result<ServerStatus, ApiError>;

    /// Size and date range of the stored rate history
    async fn data_status(&self) -> Result<DataStatus, ApiError>;
}
