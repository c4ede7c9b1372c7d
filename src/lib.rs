//! FX Engine - chart cache and load orchestration for an exchange-rate dashboard
//!
//! This crate provides:
//!
//! - A pair-level LRU cache of chart payloads keyed by (pair, period)
//! - A cooldown gate bounding live backend queries
//! - Pending (unconfirmed) currency selection
//! - Per-channel load sessions for the chart and the latest rate
//! - The `CurrencyManager` orchestrator reconciling HTTP responses,
//!   push events, cache hits and deadlines
//! - A reqwest backend client and an SSE event feed
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fx_engine::{
//!     BackendClient, CurrencyManager, EventFeed, LogView, ManagerConfig, ManagerHandle,
//!     MemorySelectionStore, SystemClock, SETTINGS,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BackendClient::from_settings(&SETTINGS)?;
//!     let (feed_tx, feed_rx) = tokio::sync::mpsc::unbounded_channel();
//!     EventFeed::from_settings(&client, &SETTINGS)?.spawn(feed_tx);
//!
//!     let mut manager = CurrencyManager::new(
//!         ManagerConfig::from_settings(&SETTINGS),
//!         Arc::new(client),
//!         Arc::new(MemorySelectionStore::new()),
//!         Box::new(LogView::new()),
//!         Arc::new(SystemClock),
//!     );
//!     manager.start();
//!
//!     let (handle, command_rx) = ManagerHandle::channel();
//!     tokio::spawn(manager.run(feed_rx, command_rx));
//!     handle.select_period(30.into()).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod core;
pub mod manager;
pub mod selection;
pub mod session;

// Re-export commonly used types
pub use api::{BackendClient, DashboardBackend, EventFeed, PushEvent, SseDecoder};
pub use cache::CacheStore;
pub use self::core::{
    // Constants
    Channel, LoadState, Period, Resolver, Side, SwitchSource, STANDARD_PERIODS,
    // Data objects
    CacheEntry, CacheKey, ChartStatistics, CurrencyPair, DataStatus, LatestRate, ServerStatus,
    TriggerAck,
    // Errors
    ApiError, LoadError, SwitchError,
    // Settings and logging
    init_logger, Settings, SETTINGS,
    // Utilities
    Clock, ManualClock, SystemClock,
};
pub use manager::{
    ChartDispatch, CommandError, CurrencyManager, DashboardView, LogView, ManagerConfig,
    ManagerHandle, ManagerSnapshot, PeriodButton, PreloadOutcome, SwitchOutcome,
};
pub use selection::{
    CooldownGate, JsonFileSelectionStore, MemorySelectionStore, PairHistory, PendingSelection,
    SelectionStore,
};
pub use session::LoadSession;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
