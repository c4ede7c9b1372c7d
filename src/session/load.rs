//! Per-channel load tracking.
//!
//! A session moves `Idle -> Loading -> {Succeeded, Failed}` and completes at
//! most once per begin: whichever source (HTTP response, push event, cache,
//! deadline) arrives first settles it, later arrivals are no-ops.

use std::fmt;

use tokio::time::Instant;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::core::{Channel, LoadError, LoadState, Resolver};

/// Outstanding or settled load on one channel.
#[derive(Debug, Clone)]
pub struct LoadSession<K> {
    channel: Channel,
    id: Option<Uuid>,
    key: Option<K>,
    state: LoadState,
    resolver: Option<Resolver>,
    deadline: Option<Instant>,
    error: Option<LoadError>,
}

impl<K> LoadSession<K>
where
    K: Clone + PartialEq + fmt::Display,
{
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            id: None,
            key: None,
            state: LoadState::Idle,
            resolver: None,
            deadline: None,
            error: None,
        }
    }

    /// Start a load for `key`. Returns the id of the new session.
    ///
    /// A terminal session for a different key passes through `Idle` first;
    /// the same key re-enters `Loading` from any state.
    pub fn begin(&mut self, key: K, resolver: Resolver) -> Uuid {
        if self.state.is_terminal() && self.key.as_ref() != Some(&key) {
            trace!(channel = %self.channel, "session reset to idle for new key");
            self.state = LoadState::Idle;
        }

        let id = Uuid::new_v4();
        debug!(channel = %self.channel, key = %key, ?resolver, session = %id, "load started");
        self.id = Some(id);
        self.key = Some(key);
        self.state = LoadState::Loading;
        self.resolver = Some(resolver);
        self.deadline = None;
        self.error = None;
        id
    }

    /// Hand the outstanding load to another resolver, failing at `deadline`
    pub fn await_until(&mut self, resolver: Resolver, deadline: Instant) {
        if self.state == LoadState::Loading {
            self.resolver = Some(resolver);
            self.deadline = Some(deadline);
        }
    }

    /// Settle as succeeded. False if the session was not loading.
    pub fn resolve(&mut self) -> bool {
        if self.state != LoadState::Loading {
            return false;
        }
        self.state = LoadState::Succeeded;
        self.deadline = None;
        debug!(channel = %self.channel, session = ?self.id, "load succeeded");
        true
    }

    /// Settle as failed. False if the session was not loading.
    pub fn reject(&mut self, error: LoadError) -> bool {
        if self.state != LoadState::Loading {
            return false;
        }
        debug!(channel = %self.channel, session = ?self.id, error = %error, "load failed");
        self.state = LoadState::Failed;
        self.deadline = None;
        self.error = Some(error);
        true
    }

    /// Resolve only if `id` is still the current session
    pub fn resolve_session(&mut self, id: Uuid) -> bool {
        self.is_current(id) && self.resolve()
    }

    /// Reject only if `id` is still the current session
    pub fn reject_session(&mut self, id: Uuid, error: LoadError) -> bool {
        self.is_current(id) && self.reject(error)
    }

    pub fn is_current(&self, id: Uuid) -> bool {
        self.id == Some(id)
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn is_loading_for(&self, key: &K) -> bool {
        self.is_loading() && self.key.as_ref() == Some(key)
    }

    /// Loading past its deadline
    pub fn is_overdue(&self, now: Instant) -> bool {
        self.is_loading() && self.deadline.is_some_and(|deadline| deadline <= now)
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn resolver(&self) -> Option<Resolver> {
        self.resolver
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn error(&self) -> Option<&LoadError> {
        self.error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_settles_exactly_once() {
        let mut session: LoadSession<String> = LoadSession::new(Channel::Rate);
        assert_eq!(session.state(), LoadState::Idle);

        session.begin("TWD-HKD".to_string(), Resolver::Http);
        assert!(session.is_loading());
        assert!(session.resolve());
        assert!(!session.resolve());
        assert!(!session.reject(LoadError::RateLoadFailed("late".into())));
        assert_eq!(session.state(), LoadState::Succeeded);
        assert!(session.error().is_none());
    }

    #[test]
    fn test_stale_session_ids_are_ignored() {
        let mut session: LoadSession<String> = LoadSession::new(Channel::Rate);
        let first = session.begin("A-B".to_string(), Resolver::Http);
        let second = session.begin("A-B".to_string(), Resolver::Http);

        assert!(!session.resolve_session(first));
        assert!(session.is_loading());
        assert!(session.reject_session(second, LoadError::RateLoadFailed("down".into())));
        assert_eq!(session.state(), LoadState::Failed);
    }

    #[test]
    fn test_same_key_reenters_loading_from_terminal() {
        let mut session: LoadSession<String> = LoadSession::new(Channel::Chart);
        session.begin("A_B_7".to_string(), Resolver::Cache);
        session.reject(LoadError::ChartLoadFailed("x".into()));

        session.begin("A_B_7".to_string(), Resolver::PushEvent);
        assert!(session.is_loading_for(&"A_B_7".to_string()));
        assert!(!session.is_loading_for(&"A_B_30".to_string()));
        assert!(session.error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline() {
        let mut session: LoadSession<String> = LoadSession::new(Channel::Chart);
        session.begin("A_B_7".to_string(), Resolver::Http);
        session.await_until(Resolver::PushEvent, Instant::now() + Duration::from_secs(45));
        assert_eq!(session.resolver(), Some(Resolver::PushEvent));
        assert!(!session.is_overdue(Instant::now()));

        tokio::time::advance(Duration::from_secs(45)).await;
        assert!(session.is_overdue(Instant::now()));

        session.reject(LoadError::ChartLoadTimedOut { timeout_ms: 45_000 });
        assert!(!session.is_overdue(Instant::now()));
        assert!(session.deadline().is_none());
    }
}
