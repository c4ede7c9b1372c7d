//! Events pushed by the backend over the event stream.

use serde::Deserialize;

use crate::core::{ChartStatistics, CurrencyPair, Period};

/// A chart finished generating
pub const EVENT_CHART_READY: &str = "chart_ready";
/// A chart failed to generate
pub const EVENT_CHART_ERROR: &str = "chart_error";
/// Background fetch progress for a pair
pub const EVENT_PROGRESS_UPDATE: &str = "progress_update";
/// Scheduled rate refresh completed
pub const EVENT_RATE_UPDATED: &str = "rate_updated";
/// Keep-alive
pub const EVENT_HEARTBEAT: &str = "heartbeat";
/// Sent once when the stream opens
pub const EVENT_CONNECTED: &str = "connected";

/// Inbound push event.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    ChartReady {
        pair: CurrencyPair,
        period: Period,
        chart_url: String,
        stats: ChartStatistics,
        message: Option<String>,
    },
    /// Without a period the error covers every outstanding period of the pair
    ChartError {
        pair: CurrencyPair,
        period: Option<Period>,
        message: String,
    },
    Progress {
        pair: CurrencyPair,
        progress: f64,
        message: String,
    },
    RateUpdated {
        date: String,
        rate: f64,
        message: String,
        updated_time: Option<String>,
    },
    Heartbeat,
    Connected,
    /// Transport opened the stream
    FeedConnected,
    /// Transport lost the stream
    FeedDisconnected,
}

#[derive(Deserialize)]
struct ChartReadyData {
    #[serde(flatten)]
    pair: CurrencyPair,
    period: Period,
    chart_url: String,
    stats: ChartStatistics,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct ChartErrorData {
    #[serde(flatten)]
    pair: CurrencyPair,
    #[serde(default)]
    period: Option<Period>,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct ProgressData {
    #[serde(flatten)]
    pair: CurrencyPair,
    #[serde(default)]
    progress: f64,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct RateUpdatedData {
    date: String,
    rate: f64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    updated_time: Option<String>,
}

impl PushEvent {
    /// Decode an event from its name and JSON data.
    ///
    /// Unknown event names yield `Ok(None)`.
    pub fn from_frame(event: &str, data: &str) -> Result<Option<Self>, serde_json::Error> {
        let event = match event {
            EVENT_CHART_READY => {
                let d: ChartReadyData = serde_json::from_str(data)?;
                PushEvent::ChartReady {
                    pair: d.pair,
                    period: d.period,
                    chart_url: d.chart_url,
                    stats: d.stats,
                    message: d.message,
                }
            }
            EVENT_CHART_ERROR => {
                let d: ChartErrorData = serde_json::from_str(data)?;
                PushEvent::ChartError {
                    pair: d.pair,
                    period: d.period,
                    message: d.message,
                }
            }
            EVENT_PROGRESS_UPDATE => {
                let d: ProgressData = serde_json::from_str(data)?;
                PushEvent::Progress {
                    pair: d.pair,
                    progress: d.progress,
                    message: d.message,
                }
            }
            EVENT_RATE_UPDATED => {
                let d: RateUpdatedData = serde_json::from_str(data)?;
                PushEvent::RateUpdated {
                    date: d.date,
                    rate: d.rate,
                    message: d.message,
                    updated_time: d.updated_time,
                }
            }
            EVENT_HEARTBEAT => PushEvent::Heartbeat,
            EVENT_CONNECTED => PushEvent::Connected,
            _ => return Ok(None),
        };
        Ok(Some(event))
    }

    /// Event name on the wire, `None` for transport markers
    pub fn name(&self) -> Option<&'static str> {
        match self {
            PushEvent::ChartReady { .. } => Some(EVENT_CHART_READY),
            PushEvent::ChartError { .. } => Some(EVENT_CHART_ERROR),
            PushEvent::Progress { .. } => Some(EVENT_PROGRESS_UPDATE),
            PushEvent::RateUpdated { .. } => Some(EVENT_RATE_UPDATED),
            PushEvent::Heartbeat => Some(EVENT_HEARTBEAT),
            PushEvent::Connected => Some(EVENT_CONNECTED),
            PushEvent::FeedConnected | PushEvent::FeedDisconnected => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_ready() {
        let data = r#"{
            "buy_currency": "USD", "sell_currency": "JPY", "period": 30,
            "chart_url": "/static/charts/USD_JPY_30.png",
            "stats": {"max_rate": 151.2, "min_rate": 146.8, "avg_rate": 149.0,
                      "data_points": 30, "date_range": "2024-01-01 至 2024-01-30"}
        }"#;
        let event = PushEvent::from_frame(EVENT_CHART_READY, data).unwrap().unwrap();
        match event {
            PushEvent::ChartReady { pair, period, chart_url, stats, message } => {
                assert_eq!(pair, CurrencyPair::new("USD", "JPY"));
                assert_eq!(period, Period(30));
                assert_eq!(chart_url, "/static/charts/USD_JPY_30.png");
                assert_eq!(stats.data_points, 30);
                assert!(message.is_none());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_chart_error_without_period() {
        let data = r#"{"buy_currency": "USD", "sell_currency": "JPY", "message": "no data"}"#;
        let event = PushEvent::from_frame(EVENT_CHART_ERROR, data).unwrap();
        assert_eq!(
            event,
            Some(PushEvent::ChartError {
                pair: CurrencyPair::new("USD", "JPY"),
                period: None,
                message: "no data".to_string(),
            })
        );
    }

    #[test]
    fn test_keepalive_and_unknown() {
        assert_eq!(
            PushEvent::from_frame(EVENT_HEARTBEAT, "{}").unwrap(),
            Some(PushEvent::Heartbeat)
        );
        assert_eq!(PushEvent::from_frame("message", "hello").unwrap(), None);
        assert_eq!(PushEvent::Heartbeat.name(), Some(EVENT_HEARTBEAT));
        assert_eq!(PushEvent::FeedConnected.name(), None);
    }

    #[test]
    fn test_malformed_payload() {
        assert!(PushEvent::from_frame(EVENT_RATE_UPDATED, r#"{"rate": "x"}"#).is_err());
    }
}
