//! Currency pair orchestrator.
//!
//! `CurrencyManager` owns the committed pair, the cache and the two load
//! sessions. Every mutation happens on `&mut self`, so the manager is driven
//! from a single task: user commands, push events, HTTP completions and the
//! chart deadline are all serialized through `run`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use super::command::Command;
use super::view::{DashboardView, PeriodButton};
use crate::api::{DashboardBackend, PushEvent};
use crate::cache::CacheStore;
use crate::core::{
    ApiError, CacheEntry, CacheKey, ChartStatistics, Channel, Clock, CurrencyPair, LatestRate,
    LoadError, LoadState, Period, Resolver, Settings, Side, SwitchError, SwitchSource, TriggerAck,
    DEFAULT_FROM_CURRENCY, DEFAULT_TO_CURRENCY, MAX_PAIRS, STANDARD_PERIODS,
};
use crate::selection::{
    CooldownGate, PairHistory, PendingSelection, SelectionStore, FROM_CURRENCY_KEY,
    MAX_HISTORY_ITEMS, SERVER_INSTANCE_KEY, TO_CURRENCY_KEY,
};
use crate::session::LoadSession;

/// Upper bound of `chart.timeout_ms`, one day
const MAX_CHART_TIMEOUT_MS: i64 = 86_400_000;
/// Upper bound of `chart.default_period`
const MAX_PERIOD_DAYS: i64 = 3_650;

/// Typed manager configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerConfig {
    pub max_pairs: usize,
    pub cooldown_window_ms: i64,
    /// How long a live chart load waits for its push event
    pub chart_timeout: Duration,
    pub default_period: Period,
    pub default_pair: CurrencyPair,
    pub swap_debounce_ms: i64,
    pub history_max_items: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_pairs: MAX_PAIRS,
            cooldown_window_ms: 30_000,
            chart_timeout: Duration::from_millis(45_000),
            default_period: Period::default(),
            default_pair: CurrencyPair::new(DEFAULT_FROM_CURRENCY, DEFAULT_TO_CURRENCY),
            swap_debounce_ms: 100,
            history_max_items: MAX_HISTORY_ITEMS,
        }
    }
}

impl ManagerConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        let defaults = Self::default();
        let int = |key: &str| settings.get_int(key);

        Self {
            max_pairs: int("cache.max_pairs")
                .map(|v| v.max(1) as usize)
                .unwrap_or(defaults.max_pairs),
            cooldown_window_ms: int("cooldown.window_ms")
                .map(|v| v.max(0))
                .unwrap_or(defaults.cooldown_window_ms),
            chart_timeout: int("chart.timeout_ms")
                .map(|v| Duration::from_millis(v.clamp(0, MAX_CHART_TIMEOUT_MS) as u64))
                .unwrap_or(defaults.chart_timeout),
            default_period: int("chart.default_period")
                .map(|v| Period(v.clamp(1, MAX_PERIOD_DAYS) as u32))
                .unwrap_or(defaults.default_period),
            default_pair: CurrencyPair::new(
                settings
                    .get_string("currency.default_from")
                    .unwrap_or(defaults.default_pair.buy),
                settings
                    .get_string("currency.default_to")
                    .unwrap_or(defaults.default_pair.sell),
            ),
            swap_debounce_ms: int("swap.debounce_ms")
                .map(|v| v.max(0))
                .unwrap_or(defaults.swap_debounce_ms),
            history_max_items: int("history.max_items")
                .map(|v| v.max(1) as usize)
                .unwrap_or(defaults.history_max_items),
        }
    }
}

/// How the chart channel was served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartDispatch {
    /// Rendered from cache, no network and no cooldown
    CacheHit,
    /// Backend triggered, waiting for the push event
    LiveQuery,
    /// Cache miss inside the cooldown window; the chart channel failed
    CooldownBlocked { remaining_ms: i64 },
}

/// Result of an accepted switch request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SwitchOutcome {
    /// Target equals the committed pair
    Unchanged,
    Switched {
        pair: CurrencyPair,
        source: SwitchSource,
        chart: ChartDispatch,
    },
}

/// Result of a preload request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PreloadOutcome {
    AlreadyComplete,
    /// Every missing period is already requested
    InProgress,
    Requested(Vec<Period>),
}

/// Point-in-time view of the manager state
#[derive(Debug, Clone, Serialize)]
pub struct ManagerSnapshot {
    pub committed: CurrencyPair,
    pub period: Period,
    pub pending_from: Option<String>,
    pub pending_to: Option<String>,
    pub chart_state: LoadState,
    pub rate_state: LoadState,
    pub chart_error: Option<String>,
    pub rate_error: Option<String>,
    pub busy: bool,
    pub cooldown_remaining_ms: i64,
    pub latest_rate: Option<LatestRate>,
    /// Cached pairs, most recently used first
    pub cached_pairs: Vec<CurrencyPair>,
    pub period_buttons: Vec<PeriodButton>,
    pub history: Vec<CurrencyPair>,
}

/// Result of a spawned backend call
enum Completion {
    Rate {
        session: Uuid,
        pair: CurrencyPair,
        result: Result<LatestRate, ApiError>,
    },
    Trigger {
        pair: CurrencyPair,
        periods: Vec<Period>,
        /// Chart session waiting on this trigger, none for preloads
        session: Option<Uuid>,
        result: Result<TriggerAck, ApiError>,
    },
}

/// The orchestrator
pub struct CurrencyManager {
    config: ManagerConfig,
    committed: CurrencyPair,
    period: Period,
    pending: PendingSelection,
    cache: CacheStore,
    cooldown: CooldownGate,
    chart: LoadSession<CacheKey>,
    rate: LoadSession<CurrencyPair>,
    /// Requested charts not yet delivered, with the time they are given up on
    outstanding: HashMap<CacheKey, Instant>,
    /// Key and chart reference currently on screen
    displayed: Option<(CacheKey, String)>,
    latest_rate: Option<LatestRate>,
    swap_guard_until: Option<i64>,
    history: PairHistory,
    backend: Arc<dyn DashboardBackend>,
    store: Arc<dyn SelectionStore>,
    view: Box<dyn DashboardView>,
    clock: Arc<dyn Clock>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl CurrencyManager {
    /// Create the manager, restoring the committed pair from `store`
    pub fn new(
        config: ManagerConfig,
        backend: Arc<dyn DashboardBackend>,
        store: Arc<dyn SelectionStore>,
        view: Box<dyn DashboardView>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let committed = CurrencyPair::new(
            store
                .get(FROM_CURRENCY_KEY)
                .filter(|code| !code.trim().is_empty())
                .unwrap_or_else(|| config.default_pair.buy.clone()),
            store
                .get(TO_CURRENCY_KEY)
                .filter(|code| !code.trim().is_empty())
                .unwrap_or_else(|| config.default_pair.sell.clone()),
        );
        let history = PairHistory::load(Arc::clone(&store), config.history_max_items);
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        let manager = Self {
            committed,
            period: config.default_period,
            pending: PendingSelection::new(),
            cache: CacheStore::new(config.max_pairs),
            cooldown: CooldownGate::new(config.cooldown_window_ms),
            chart: LoadSession::new(Channel::Chart),
            rate: LoadSession::new(Channel::Rate),
            outstanding: HashMap::new(),
            displayed: None,
            latest_rate: None,
            swap_guard_until: None,
            history,
            backend,
            store,
            view,
            clock,
            completion_tx,
            completion_rx,
            in_flight: 0,
            config,
        };
        manager.persist_selection();
        manager
    }

    /// Reset the selection if it was stored for another backend instance.
    ///
    /// Returns true when the committed pair was reset to the defaults.
    pub fn reconcile_server_instance(&mut self, server_instance_id: &str) -> bool {
        let stored = self.store.get(SERVER_INSTANCE_KEY);
        if stored.as_deref() == Some(server_instance_id) {
            return false;
        }

        info!(
            stored = ?stored,
            current = server_instance_id,
            "backend instance changed, resetting selection"
        );
        self.store.set(SERVER_INSTANCE_KEY, server_instance_id);
        self.committed = self.config.default_pair.clone();
        self.pending.clear();
        self.persist_selection();
        self.refresh_selectors();
        true
    }

    /// Initial load of both channels for the committed pair
    pub fn start(&mut self) -> ChartDispatch {
        info!(pair = %self.committed, period = %self.period, "initial load");
        self.load_rate();
        let dispatch = self.load_chart(false);
        self.refresh_selectors();
        self.refresh_controls();
        dispatch
    }

    /// Commit `pair` and load both channels for it
    pub fn switch_pair(
        &mut self,
        pair: CurrencyPair,
        source: SwitchSource,
    ) -> Result<SwitchOutcome, SwitchError> {
        if !pair.is_valid() {
            return Err(SwitchError::InvalidPair(pair.to_string()));
        }
        if self.is_busy() {
            warn!(target = %pair, current = %self.committed, "switch rejected: system busy");
            return Err(SwitchError::SystemBusy);
        }
        if pair == self.committed {
            debug!(pair = %pair, "switch to committed pair ignored");
            return Ok(SwitchOutcome::Unchanged);
        }

        info!(from = %self.committed, to = %pair, source = %source, "currency pair switched");
        self.committed = pair.clone();
        self.persist_selection();
        self.history.add(&pair);

        self.load_rate();
        let chart = self.load_chart(true);

        self.refresh_selectors();
        self.refresh_controls();
        Ok(SwitchOutcome::Switched {
            pair,
            source,
            chart,
        })
    }

    /// Exchange buy and sell, discarding pending choices
    pub fn swap(&mut self) -> Result<SwitchOutcome, SwitchError> {
        let now = self.clock.now_ms();
        if self.swap_guard_until.is_some_and(|until| now < until) {
            debug!("swap ignored: previous swap still settling");
            return Err(SwitchError::SwapInProgress);
        }
        self.swap_guard_until = Some(now.saturating_add(self.config.swap_debounce_ms));

        if self.pending.requires_confirmation() {
            self.pending.clear();
            self.view.set_confirm_visible(false);
        }
        let target = self.committed.swapped();
        let result = self.switch_pair(target, SwitchSource::Swap);
        self.refresh_selectors();
        result
    }

    /// Record a tentative choice for one side
    pub fn set_pending(&mut self, side: Side, code: &str) -> Result<(), SwitchError> {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            return Err(SwitchError::InvalidPair(format!("empty {side} currency")));
        }
        self.pending.set_pending(side, code);
        self.view.set_confirm_visible(true);
        self.refresh_selectors();
        Ok(())
    }

    /// Discard pending choices, selectors revert to the committed pair
    pub fn cancel_pending(&mut self) {
        self.pending.clear();
        self.view.set_confirm_visible(false);
        self.refresh_selectors();
    }

    /// Apply pending choices through a committed switch
    pub fn confirm(&mut self) -> Result<SwitchOutcome, SwitchError> {
        if !self.pending.requires_confirmation() {
            return Err(SwitchError::NoPendingChanges);
        }

        let target = self.pending.resolve(&self.committed);
        self.pending.clear();
        self.view.set_confirm_visible(false);
        let result = self.switch_pair(target, SwitchSource::Confirm);
        self.refresh_selectors();
        result
    }

    /// Show `period` for the committed pair
    pub fn select_period(&mut self, period: Period) -> Result<ChartDispatch, SwitchError> {
        let key = CacheKey::new(self.committed.clone(), period);
        if self.cache.get_key(&key).is_none() && self.outstanding.contains_key(&key) {
            return Err(SwitchError::PeriodLoading(period));
        }

        debug!(period = %period, "period selected");
        self.period = period;
        // Live loads for a pair with nothing cached count against the cooldown
        let use_cooldown = !self.cache.contains_pair(&self.committed);
        let dispatch = self.load_chart(use_cooldown);
        self.refresh_controls();
        Ok(dispatch)
    }

    /// Request every standard period not yet cached for the committed pair
    pub fn preload_all_periods(&mut self) -> PreloadOutcome {
        let pair = self.committed.clone();
        if self.cache.has_complete(&pair, &STANDARD_PERIODS) {
            return PreloadOutcome::AlreadyComplete;
        }

        let missing: Vec<Period> = self
            .cache
            .missing_periods(&pair, &STANDARD_PERIODS)
            .into_iter()
            .filter(|period| !self.outstanding.contains_key(&CacheKey::new(pair.clone(), *period)))
            .collect();
        if missing.is_empty() {
            return PreloadOutcome::InProgress;
        }

        info!(pair = %pair, periods = ?missing, "preloading periods");
        let deadline = Instant::now() + self.config.chart_timeout;
        self.request_charts(pair, missing.clone(), None, deadline);
        self.refresh_controls();
        PreloadOutcome::Requested(missing)
    }

    /// Apply an event from the push feed
    pub fn handle_push_event(&mut self, event: PushEvent) {
        match event {
            PushEvent::ChartReady {
                pair,
                period,
                chart_url,
                stats,
                ..
            } => self.on_chart_ready(CacheKey::new(pair, period), chart_url, stats),
            PushEvent::ChartError {
                pair,
                period,
                message,
            } => self.on_chart_error(&pair, period, message),
            PushEvent::Progress {
                pair,
                progress,
                message,
            } => {
                if pair == self.committed {
                    self.view.show_progress(&pair, progress, &message);
                    if progress >= 100.0 {
                        self.view.hide_progress();
                    }
                }
            }
            PushEvent::RateUpdated { message, .. } => {
                self.view.notify_auto_update(&message);
                if !self.rate.is_loading() {
                    self.load_rate();
                }
                if let Some(entry) = self.cache.get(&self.committed, self.period).cloned() {
                    self.render(entry);
                }
            }
            PushEvent::Heartbeat => trace!("heartbeat"),
            PushEvent::Connected => debug!("event stream greeting received"),
            PushEvent::FeedConnected => self.view.set_feed_connected(true),
            PushEvent::FeedDisconnected => self.view.set_feed_connected(false),
        }
        self.refresh_controls();
    }

    fn handle_completion(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match completion {
            Completion::Rate {
                session,
                pair,
                result,
            } => {
                if !self.rate.is_current(session) {
                    debug!(pair = %pair, "discarding stale rate response");
                    return;
                }
                match result {
                    Ok(rate) => {
                        if self.rate.resolve() {
                            self.view.show_rate(&pair, &rate);
                            self.latest_rate = Some(rate);
                        }
                    }
                    Err(e) => {
                        let error = LoadError::RateLoadFailed(e.to_string());
                        if self.rate.reject(error.clone()) {
                            warn!(pair = %pair, error = %e, "rate load failed");
                            self.view.show_rate_error(&pair, &error);
                        }
                    }
                }
            }
            Completion::Trigger {
                pair,
                periods,
                session,
                result,
            } => match result {
                Ok(ack) if ack.accepted => {
                    debug!(
                        pair = %pair,
                        skipped = ack.skipped,
                        message = %ack.message,
                        "chart generation acknowledged"
                    );
                }
                Ok(ack) => {
                    let message = if ack.message.is_empty() {
                        "chart generation rejected".to_string()
                    } else {
                        ack.message
                    };
                    self.fail_chart_request(&pair, &periods, session, message);
                }
                Err(e) => self.fail_chart_request(&pair, &periods, session, e.to_string()),
            },
        }
        self.refresh_controls();
    }

    /// Fail loads whose deadline has passed
    pub fn expire_overdue(&mut self, now: Instant) {
        let mut changed = false;

        if self.chart.is_overdue(now) {
            let timeout_ms = self.config.chart_timeout.as_millis() as u64;
            let error = LoadError::ChartLoadTimedOut { timeout_ms };
            if let Some(key) = self.chart.key().cloned() {
                warn!(key = %key, timeout_ms, "chart load timed out");
                self.chart.reject(error.clone());
                self.outstanding.remove(&key);
                self.view.show_chart_error(&key, &error);
                changed = true;
            }
        }

        let before = self.outstanding.len();
        self.outstanding.retain(|_, deadline| *deadline > now);
        if self.outstanding.len() != before {
            debug!(expired = before - self.outstanding.len(), "outstanding chart requests expired");
            changed = true;
        }

        if changed {
            self.refresh_controls();
        }
    }

    /// Earliest deadline among outstanding loads
    pub fn next_deadline(&self) -> Option<Instant> {
        let chart = self.chart.deadline().filter(|_| self.chart.is_loading());
        self.outstanding.values().copied().chain(chart).min()
    }

    /// Wait until every spawned backend call has been applied
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.completion_rx.recv().await {
                Some(completion) => self.handle_completion(completion),
                None => break,
            }
        }
    }

    /// Event loop. Returns when the command channel closes.
    pub async fn run(
        mut self,
        mut feed_rx: mpsc::UnboundedReceiver<PushEvent>,
        mut command_rx: mpsc::UnboundedReceiver<Command>,
    ) {
        let mut feed_open = true;

        loop {
            let deadline = self.next_deadline();

            tokio::select! {
                command = command_rx.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                event = feed_rx.recv(), if feed_open => match event {
                    Some(event) => self.handle_push_event(event),
                    None => {
                        warn!("push feed closed");
                        feed_open = false;
                    }
                },
                Some(completion) = self.completion_rx.recv() => self.handle_completion(completion),
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.expire_overdue(Instant::now());
                }
            }
        }
        info!("currency manager stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::SwitchPair { pair, reply } => {
                let _ = reply.send(self.switch_pair(pair, SwitchSource::Manual));
            }
            Command::Swap { reply } => {
                let _ = reply.send(self.swap());
            }
            Command::SetPending { side, code, reply } => {
                let _ = reply.send(self.set_pending(side, &code));
            }
            Command::CancelPending { reply } => {
                self.cancel_pending();
                let _ = reply.send(());
            }
            Command::Confirm { reply } => {
                let _ = reply.send(self.confirm());
            }
            Command::SelectPeriod { period, reply } => {
                let _ = reply.send(self.select_period(period));
            }
            Command::Preload { reply } => {
                let _ = reply.send(self.preload_all_periods());
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    /// Either channel is loading
    pub fn is_busy(&self) -> bool {
        self.chart.is_loading() || self.rate.is_loading()
    }

    pub fn channel_state(&self, channel: Channel) -> LoadState {
        match channel {
            Channel::Chart => self.chart.state(),
            Channel::Rate => self.rate.state(),
        }
    }

    pub fn channel_error(&self, channel: Channel) -> Option<&LoadError> {
        match channel {
            Channel::Chart => self.chart.error(),
            Channel::Rate => self.rate.error(),
        }
    }

    pub fn committed(&self) -> &CurrencyPair {
        &self.committed
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn pending(&self) -> &PendingSelection {
        &self.pending
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn cooldown(&self) -> &CooldownGate {
        &self.cooldown
    }

    pub fn history(&self) -> Vec<CurrencyPair> {
        self.history.pairs()
    }

    /// Chart reference currently on screen
    pub fn displayed(&self) -> Option<(&CacheKey, &str)> {
        self.displayed
            .as_ref()
            .map(|(key, reference)| (key, reference.as_str()))
    }

    pub fn is_outstanding(&self, key: &CacheKey) -> bool {
        self.outstanding.contains_key(key)
    }

    /// Period buttons for the committed pair
    pub fn period_buttons(&self) -> Vec<PeriodButton> {
        let mut periods = STANDARD_PERIODS.to_vec();
        if !periods.contains(&self.period) {
            periods.push(self.period);
        }

        periods
            .into_iter()
            .map(|period| {
                let key = CacheKey::new(self.committed.clone(), period);
                let cached = self.cache.get_key(&key).is_some();
                let loading = self.outstanding.contains_key(&key);
                PeriodButton {
                    period,
                    cached,
                    loading,
                    active: period == self.period,
                    enabled: cached || !loading,
                }
            })
            .collect()
    }

    pub fn snapshot(&self) -> ManagerSnapshot {
        ManagerSnapshot {
            committed: self.committed.clone(),
            period: self.period,
            pending_from: self.pending.pending(Side::From).map(str::to_string),
            pending_to: self.pending.pending(Side::To).map(str::to_string),
            chart_state: self.chart.state(),
            rate_state: self.rate.state(),
            chart_error: self.chart.error().map(ToString::to_string),
            rate_error: self.rate.error().map(ToString::to_string),
            busy: self.is_busy(),
            cooldown_remaining_ms: self.cooldown.remaining_ms(self.clock.now_ms()),
            latest_rate: self.latest_rate.clone(),
            cached_pairs: self.cache.usage_order(),
            period_buttons: self.period_buttons(),
            history: self.history.pairs(),
        }
    }

    fn current_key(&self) -> CacheKey {
        CacheKey::new(self.committed.clone(), self.period)
    }

    fn load_rate(&mut self) {
        let pair = self.committed.clone();
        let session = self.rate.begin(pair.clone(), Resolver::Http);

        let backend = Arc::clone(&self.backend);
        let tx = self.completion_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let result = backend.latest_rate(&pair).await;
            let _ = tx.send(Completion::Rate {
                session,
                pair,
                result,
            });
        });
    }

    /// Serve the committed key from cache or trigger the backend
    fn load_chart(&mut self, use_cooldown: bool) -> ChartDispatch {
        let key = self.current_key();

        if let Some(entry) = self.cache.get_key(&key).cloned() {
            self.cache.touch(&key.pair);
            self.chart.begin(key, Resolver::Cache);
            self.chart.resolve();
            self.render(entry);
            return ChartDispatch::CacheHit;
        }

        if use_cooldown {
            let now = self.clock.now_ms();
            if self.cooldown.is_blocked(now) {
                let remaining_ms = self.cooldown.remaining_ms(now);
                warn!(key = %key, remaining_ms, "live query blocked by cooldown");
                self.chart.begin(key, Resolver::Http);
                self.chart.reject(LoadError::CooldownActive { remaining_ms });
                self.view.show_cooldown(remaining_ms);
                return ChartDispatch::CooldownBlocked { remaining_ms };
            }
            self.cooldown.record_switch(now);
        }

        let session = self.chart.begin(key.clone(), Resolver::Http);
        let deadline = Instant::now() + self.config.chart_timeout;
        self.chart.await_until(Resolver::PushEvent, deadline);

        // The backend generates every standard period in one go
        let mut periods = self.cache.missing_periods(&key.pair, &STANDARD_PERIODS);
        if !periods.contains(&key.period) {
            periods.push(key.period);
        }
        self.request_charts(key.pair, periods, Some(session), deadline);
        ChartDispatch::LiveQuery
    }

    fn request_charts(
        &mut self,
        pair: CurrencyPair,
        periods: Vec<Period>,
        session: Option<Uuid>,
        deadline: Instant,
    ) {
        for period in &periods {
            self.outstanding
                .insert(CacheKey::new(pair.clone(), *period), deadline);
        }

        let backend = Arc::clone(&self.backend);
        let tx = self.completion_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let result = backend.trigger_chart(&pair).await;
            let _ = tx.send(Completion::Trigger {
                pair,
                periods,
                session,
                result,
            });
        });
    }

    fn fail_chart_request(
        &mut self,
        pair: &CurrencyPair,
        periods: &[Period],
        session: Option<Uuid>,
        message: String,
    ) {
        warn!(pair = %pair, periods = ?periods, message = %message, "chart request failed");
        for period in periods {
            self.outstanding.remove(&CacheKey::new(pair.clone(), *period));
        }

        if let Some(session) = session {
            let error = LoadError::ChartLoadFailed(message);
            if self.chart.reject_session(session, error.clone()) {
                if let Some(key) = self.chart.key().cloned() {
                    self.view.show_chart_error(&key, &error);
                }
            }
        }
    }

    fn on_chart_ready(&mut self, key: CacheKey, chart_url: String, stats: ChartStatistics) {
        let fetched_at =
            DateTime::<Utc>::from_timestamp_millis(self.clock.now_ms()).unwrap_or_else(Utc::now);
        let entry = CacheEntry::new(key.clone(), chart_url, stats, fetched_at);

        self.outstanding.remove(&key);
        if let Some(evicted) = self.cache.put(entry.clone()) {
            debug!(pair = %evicted, "evicted least recently used pair");
        }

        if key != self.current_key() {
            debug!(key = %key, "chart cached for a pair or period no longer shown");
            return;
        }

        if self.chart.is_loading_for(&key) {
            self.chart.resolve();
            self.render(entry);
        } else if self.displayed.as_ref() != Some(&(key.clone(), entry.chart_reference.clone())) {
            self.chart.begin(key, Resolver::PushEvent);
            self.chart.resolve();
            self.render(entry);
        } else {
            trace!(key = %key, "duplicate chart delivery");
        }
    }

    fn on_chart_error(&mut self, pair: &CurrencyPair, period: Option<Period>, message: String) {
        warn!(pair = %pair, period = ?period, message = %message, "chart generation failed");

        match period {
            Some(period) => {
                self.outstanding.remove(&CacheKey::new(pair.clone(), period));
            }
            None => self.outstanding.retain(|key, _| &key.pair != pair),
        }

        let affected = self
            .chart
            .key()
            .filter(|key| &key.pair == pair && period.map_or(true, |p| p == key.period))
            .cloned();
        if let Some(key) = affected {
            let error = LoadError::ChartLoadFailed(message);
            if self.chart.reject(error.clone()) {
                self.view.show_chart_error(&key, &error);
            }
        }
    }

    fn render(&mut self, entry: CacheEntry) {
        self.view.render_chart(&entry);
        self.view.hide_progress();
        self.displayed = Some((entry.key, entry.chart_reference));
    }

    fn persist_selection(&self) {
        self.store.set(FROM_CURRENCY_KEY, &self.committed.buy);
        self.store.set(TO_CURRENCY_KEY, &self.committed.sell);
    }

    fn refresh_selectors(&mut self) {
        let from = self
            .pending
            .display_value(Side::From, &self.committed)
            .to_string();
        let to = self
            .pending
            .display_value(Side::To, &self.committed)
            .to_string();
        self.view.update_selectors(&from, &to);
    }

    fn refresh_controls(&mut self) {
        let busy = self.is_busy();
        self.view.set_interactive(!busy);
        let buttons = self.period_buttons();
        self.view.update_period_buttons(&buttons);
    }
}
