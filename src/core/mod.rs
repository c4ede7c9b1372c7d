//! Core module - shared building blocks of the dashboard.
//!
//! - **constant**: Channels, load states, periods and other enums
//! - **object**: Currency pairs, cache keys and backend payloads
//! - **error**: Error taxonomy
//! - **setting**: Global settings management
//! - **logger**: Logging setup
//! - **utility**: Clock, data directory and JSON helpers

pub mod constant;
pub mod error;
pub mod logger;
pub mod object;
pub mod setting;
pub mod utility;

pub use constant::{
    Channel, LoadState, Period, Resolver, Side, SwitchSource, Trend, DEFAULT_FROM_CURRENCY,
    DEFAULT_TO_CURRENCY, MAX_PAIRS, STANDARD_PERIODS,
};
pub use error::{ApiError, LoadError, SwitchError};
pub use logger::init_logger;
pub use object::{
    CacheEntry, CacheKey, ChartStatistics, CurrencyPair, DataStatus, LatestRate, ServerStatus,
    TriggerAck,
};
pub use setting::{SettingValue, Settings, SETTINGS};
pub use utility::{
    get_file_path, get_folder_path, load_json, save_json, Clock, ManualClock, SystemClock,
};
