//! Data structures exchanged between the orchestrator, the cache and the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::constant::{Period, Trend};

/// Ordered (buy, sell) currency combination.
///
/// Order matters: `TWD/HKD` and `HKD/TWD` are different pairs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CurrencyPair {
    #[serde(rename = "buy_currency")]
    pub buy: String,
    #[serde(rename = "sell_currency")]
    pub sell: String,
}

impl CurrencyPair {
    pub fn new(buy: impl Into<String>, sell: impl Into<String>) -> Self {
        Self {
            buy: buy.into(),
            sell: sell.into(),
        }
    }

    /// Pair identifier ignoring period, e.g. `USD-EUR`
    pub fn pair_id(&self) -> String {
        format!("{}-{}", self.buy, self.sell)
    }

    /// The same pair with buy and sell exchanged
    pub fn swapped(&self) -> Self {
        Self {
            buy: self.sell.clone(),
            sell: self.buy.clone(),
        }
    }

    /// Both sides carry a non-empty currency code
    pub fn is_valid(&self) -> bool {
        !self.buy.trim().is_empty() && !self.sell.trim().is_empty()
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.buy, self.sell)
    }
}

/// Cache key: a pair plus a lookback period.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub pair: CurrencyPair,
    pub period: Period,
}

impl CacheKey {
    pub fn new(pair: CurrencyPair, period: Period) -> Self {
        Self { pair, period }
    }
}

impl fmt::Display for CacheKey {
    /// Canonical `{buy}_{sell}_{period}` form
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.pair.buy, self.pair.sell, self.period)
    }
}

/// Summary statistics computed by the backend for a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartStatistics {
    pub max_rate: f64,
    pub min_rate: f64,
    pub avg_rate: f64,
    pub data_points: u32,
    pub date_range: String,
}

/// A cached chart payload. Replaced as a whole, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    /// Opaque chart URL or blob id
    pub chart_reference: String,
    pub statistics: ChartStatistics,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(
        key: CacheKey,
        chart_reference: impl Into<String>,
        statistics: ChartStatistics,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            key,
            chart_reference: chart_reference.into(),
            statistics,
            fetched_at,
        }
    }
}

/// Latest rate for a pair as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestRate {
    pub rate: f64,
    pub date: String,
    #[serde(default)]
    pub trend: Option<Trend>,
    #[serde(default)]
    pub trend_value: f64,
    #[serde(default)]
    pub updated_time: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub processing_time: Option<f64>,
    /// Current rate is the lowest of `best_period`
    #[serde(default)]
    pub is_best: Option<bool>,
    #[serde(default)]
    pub best_period: Option<u32>,
    #[serde(default)]
    pub lowest_rate: Option<f64>,
    #[serde(default)]
    pub lowest_period: Option<u32>,
}

impl LatestRate {
    pub fn new(rate: f64, date: impl Into<String>) -> Self {
        Self {
            rate,
            date: date.into(),
            trend: None,
            trend_value: 0.0,
            updated_time: None,
            source: None,
            processing_time: None,
            is_best: None,
            best_period: None,
            lowest_rate: None,
            lowest_period: None,
        }
    }
}

/// Acknowledgement of a chart generation trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerAck {
    #[serde(rename = "success")]
    pub accepted: bool,
    #[serde(default)]
    pub skipped: bool,
    #[serde(default)]
    pub message: String,
}

/// Coverage of the backend's rate history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataStatus {
    pub total_records: u64,
    #[serde(default)]
    pub earliest_date: Option<String>,
    #[serde(default)]
    pub latest_date: Option<String>,
    #[serde(default)]
    pub data_span_days: u32,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Backend process identity, used to detect server restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub server_instance_id: String,
}
