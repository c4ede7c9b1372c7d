//! Render collaborator of the orchestrator.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::{CacheEntry, CacheKey, CurrencyPair, LatestRate, LoadError, Period};

/// State of one period button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodButton {
    pub period: Period,
    /// Chart cached for the committed pair
    pub cached: bool,
    /// A load for this period is outstanding
    pub loading: bool,
    /// Currently selected period
    pub active: bool,
    pub enabled: bool,
}

/// Everything the orchestrator shows to the user.
///
/// All methods default to no-ops so implementations only handle what they display.
pub trait DashboardView: Send {
    fn render_chart(&mut self, _entry: &CacheEntry) {}

    fn show_chart_error(&mut self, _key: &CacheKey, _error: &LoadError) {}

    fn show_cooldown(&mut self, _remaining_ms: i64) {}

    fn show_rate(&mut self, _pair: &CurrencyPair, _rate: &LatestRate) {}

    fn show_rate_error(&mut self, _pair: &CurrencyPair, _error: &LoadError) {}

    fn show_progress(&mut self, _pair: &CurrencyPair, _progress: f64, _message: &str) {}

    fn hide_progress(&mut self) {}

    /// Enable or disable pair switching controls
    fn set_interactive(&mut self, _interactive: bool) {}

    fn set_confirm_visible(&mut self, _visible: bool) {}

    /// Values shown in the from/to selectors, pending values included
    fn update_selectors(&mut self, _from: &str, _to: &str) {}

    fn update_period_buttons(&mut self, _buttons: &[PeriodButton]) {}

    fn notify_auto_update(&mut self, _message: &str) {}

    fn set_feed_connected(&mut self, _connected: bool) {}
}

/// View that writes everything to the log
#[derive(Debug, Default)]
pub struct LogView {
    interactive: Option<bool>,
}

impl LogView {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DashboardView for LogView {
    fn render_chart(&mut self, entry: &CacheEntry) {
        let stats = &entry.statistics;
        info!(
            key = %entry.key,
            chart = %entry.chart_reference,
            max = stats.max_rate,
            min = stats.min_rate,
            avg = stats.avg_rate,
            points = stats.data_points,
            range = %stats.date_range,
            "chart"
        );
    }

    fn show_chart_error(&mut self, key: &CacheKey, error: &LoadError) {
        warn!(key = %key, error = %error, "chart unavailable");
    }

    fn show_cooldown(&mut self, remaining_ms: i64) {
        warn!(remaining_secs = (remaining_ms + 999) / 1000, "please wait before switching again");
    }

    fn show_rate(&mut self, pair: &CurrencyPair, rate: &LatestRate) {
        info!(
            pair = %pair,
            rate = rate.rate,
            date = %rate.date,
            trend = ?rate.trend,
            trend_value = rate.trend_value,
            "latest rate"
        );
    }

    fn show_rate_error(&mut self, pair: &CurrencyPair, error: &LoadError) {
        warn!(pair = %pair, error = %error, "rate unavailable");
    }

    fn show_progress(&mut self, pair: &CurrencyPair, progress: f64, message: &str) {
        info!(pair = %pair, progress, "{}", message);
    }

    fn set_interactive(&mut self, interactive: bool) {
        if self.interactive != Some(interactive) {
            self.interactive = Some(interactive);
            debug!(interactive, "controls");
        }
    }

    fn set_confirm_visible(&mut self, visible: bool) {
        if visible {
            info!("selection changed, confirm to apply");
        }
    }

    fn update_selectors(&mut self, from: &str, to: &str) {
        debug!(from, to, "selectors");
    }

    fn notify_auto_update(&mut self, message: &str) {
        info!("data updated: {}", message);
    }

    fn set_feed_connected(&mut self, connected: bool) {
        if connected {
            info!("live updates connected");
        } else {
            warn!("live updates disconnected");
        }
    }
}
