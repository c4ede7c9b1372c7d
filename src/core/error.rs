//! Error taxonomy for the dashboard core.
//!
//! Nothing here is fatal: every failure leaves the affected channel in a
//! terminal, re-triggerable state.

use thiserror::Error;

use super::constant::Period;

/// Rejection of a user operation. Committed state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwitchError {
    #[error("system busy: a chart or rate load is still in flight")]
    SystemBusy,
    #[error("no pending currency changes to confirm")]
    NoPendingChanges,
    #[error("a swap is already in progress")]
    SwapInProgress,
    #[error("chart for period {0} is still loading")]
    PeriodLoading(Period),
    #[error("invalid currency pair: {0}")]
    InvalidPair(String),
}

/// Failure recorded on a single load channel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("too many live queries, retry in {remaining_ms}ms")]
    CooldownActive { remaining_ms: i64 },
    #[error("rate load failed: {0}")]
    RateLoadFailed(String),
    #[error("chart load failed: {0}")]
    ChartLoadFailed(String),
    #[error("chart load timed out after {timeout_ms}ms")]
    ChartLoadTimedOut { timeout_ms: u64 },
}

impl LoadError {
    /// Chart failures, the timeout included
    pub fn is_chart_failure(&self) -> bool {
        matches!(
            self,
            LoadError::ChartLoadFailed(_) | LoadError::ChartLoadTimedOut { .. }
        )
    }
}

/// Backend transport failure.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server responded with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_chart_failure() {
        assert!(LoadError::ChartLoadTimedOut { timeout_ms: 45_000 }.is_chart_failure());
        assert!(LoadError::ChartLoadFailed("x".into()).is_chart_failure());
        assert!(!LoadError::RateLoadFailed("x".into()).is_chart_failure());
        assert!(!LoadError::CooldownActive { remaining_ms: 1 }.is_chart_failure());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            LoadError::CooldownActive { remaining_ms: 20_000 }.to_string(),
            "too many live queries, retry in 20000ms"
        );
        assert_eq!(
            SwitchError::PeriodLoading(Period(30)).to_string(),
            "chart for period 30 is still loading"
        );
    }
}
