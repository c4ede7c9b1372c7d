//! General constant enums used by the dashboard core.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default buy-side currency for a fresh session.
pub const DEFAULT_FROM_CURRENCY: &str = "TWD";

/// Default sell-side currency for a fresh session.
pub const DEFAULT_TO_CURRENCY: &str = "HKD";

/// Maximum number of distinct currency pairs held by the chart cache.
pub const MAX_PAIRS: usize = 5;

/// Lookback periods the backend generates charts for.
pub const STANDARD_PERIODS: [Period; 4] = [Period(7), Period(30), Period(90), Period(180)];

/// Chart lookback window, in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Period(pub u32);

impl Period {
    /// Number of days covered by the period
    pub fn days(&self) -> u32 {
        self.0
    }

    /// Whether the backend generates charts for this period
    pub fn is_standard(&self) -> bool {
        STANDARD_PERIODS.contains(self)
    }
}

impl Default for Period {
    fn default() -> Self {
        Period(7)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Period {
    fn from(days: u32) -> Self {
        Period(days)
    }
}

/// Load channel tracked independently by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Chart image and statistics
    Chart,
    /// Latest exchange rate
    Rate,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Chart => write!(f, "chart"),
            Channel::Rate => write!(f, "rate"),
        }
    }
}

/// Load state of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl LoadState {
    /// Succeeded or Failed
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadState::Succeeded | LoadState::Failed)
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::Idle => write!(f, "idle"),
            LoadState::Loading => write!(f, "loading"),
            LoadState::Succeeded => write!(f, "succeeded"),
            LoadState::Failed => write!(f, "failed"),
        }
    }
}

/// What will complete an outstanding load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolver {
    /// Served synchronously from the chart cache
    Cache,
    /// Direct HTTP response
    Http,
    /// Server-push ready/error event
    PushEvent,
}

/// Origin of a pair switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SwitchSource {
    #[default]
    Manual,
    Swap,
    Confirm,
}

impl fmt::Display for SwitchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchSource::Manual => write!(f, "manual"),
            SwitchSource::Swap => write!(f, "swap"),
            SwitchSource::Confirm => write!(f, "confirm"),
        }
    }
}

/// Currency selector side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Buy currency selector
    From,
    /// Sell currency selector
    To,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::From => write!(f, "from"),
            Side::To => write!(f, "to"),
        }
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "from" | "buy" => Ok(Side::From),
            "to" | "sell" => Ok(Side::To),
            other => Err(format!("unknown selector side: {}", other)),
        }
    }
}

/// Direction of the latest rate movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    /// Unchanged within rounding
    Same,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_periods() {
        assert!(Period(30).is_standard());
        assert!(!Period(14).is_standard());
        assert_eq!(Period::default(), Period(7));
    }

    #[test]
    fn test_load_state_terminal() {
        assert!(!LoadState::Idle.is_terminal());
        assert!(!LoadState::Loading.is_terminal());
        assert!(LoadState::Succeeded.is_terminal());
        assert!(LoadState::Failed.is_terminal());
    }

    #[test]
    fn test_side_from_str() {
        assert_eq!("from".parse::<Side>(), Ok(Side::From));
        assert_eq!("SELL".parse::<Side>(), Ok(Side::To));
        assert!("left".parse::<Side>().is_err());
    }

    #[test]
    fn test_trend_serde() {
        let trend: Trend = serde_json::from_str("\"down\"").unwrap();
        assert_eq!(trend, Trend::Down);
        let trend: Trend = serde_json::from_str("\"same\"").unwrap();
        assert_eq!(trend, Trend::Same);
    }
}
