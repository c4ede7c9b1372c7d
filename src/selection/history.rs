//! Most-recently-used list of committed currency pairs.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tracing::warn;

use super::storage::{SelectionStore, HISTORY_KEY};
use crate::core::CurrencyPair;

/// Default number of remembered pairs
pub const MAX_HISTORY_ITEMS: usize = 20;

/// Recently committed pairs, newest first, persisted in the selection store.
pub struct PairHistory {
    pairs: LruCache<CurrencyPair, ()>,
    store: Arc<dyn SelectionStore>,
}

impl PairHistory {
    /// Load the history from the store; malformed data starts an empty history
    pub fn load(store: Arc<dyn SelectionStore>, max_items: usize) -> Self {
        let capacity = NonZeroUsize::new(max_items).unwrap_or(NonZeroUsize::MIN);
        let mut pairs = LruCache::new(capacity);

        if let Some(raw) = store.get(HISTORY_KEY) {
            match serde_json::from_str::<Vec<CurrencyPair>>(&raw) {
                Ok(saved) => {
                    // Stored newest first; replay oldest first so the newest ends up most recent
                    for pair in saved.into_iter().rev() {
                        pairs.put(pair, ());
                    }
                }
                Err(e) => warn!(error = %e, "discarding unreadable pair history"),
            }
        }

        Self { pairs, store }
    }

    /// Move `pair` to the front, trimming the oldest beyond capacity
    pub fn add(&mut self, pair: &CurrencyPair) {
        if !pair.is_valid() {
            return;
        }
        self.pairs.put(pair.clone(), ());
        self.save();
    }

    /// Pairs, newest first
    pub fn pairs(&self) -> Vec<CurrencyPair> {
        self.pairs.iter().map(|(pair, _)| pair.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn save(&self) {
        match serde_json::to_string(&self.pairs()) {
            Ok(json) => self.store.set(HISTORY_KEY, &json),
            Err(e) => warn!(error = %e, "failed to serialize pair history"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::storage::MemorySelectionStore;

    #[test]
    fn test_newest_first_without_duplicates() {
        let store: Arc<dyn SelectionStore> = Arc::new(MemorySelectionStore::new());
        let mut history = PairHistory::load(store, MAX_HISTORY_ITEMS);

        history.add(&CurrencyPair::new("TWD", "HKD"));
        history.add(&CurrencyPair::new("USD", "EUR"));
        history.add(&CurrencyPair::new("TWD", "HKD"));

        assert_eq!(
            history.pairs(),
            vec![CurrencyPair::new("TWD", "HKD"), CurrencyPair::new("USD", "EUR")]
        );
    }

    #[test]
    fn test_limit_and_persistence() {
        let store: Arc<dyn SelectionStore> = Arc::new(MemorySelectionStore::new());
        let mut history = PairHistory::load(store.clone(), 2);
        history.add(&CurrencyPair::new("A", "B"));
        history.add(&CurrencyPair::new("C", "D"));
        history.add(&CurrencyPair::new("E", "F"));
        assert_eq!(history.len(), 2);

        let raw = store.get(HISTORY_KEY).unwrap();
        assert!(raw.contains("\"buy_currency\":\"E\""));

        let reloaded = PairHistory::load(store, 2);
        assert_eq!(
            reloaded.pairs(),
            vec![CurrencyPair::new("E", "F"), CurrencyPair::new("C", "D")]
        );
    }

    #[test]
    fn test_ignores_blank_pairs_and_bad_json() {
        let store: Arc<dyn SelectionStore> = Arc::new(MemorySelectionStore::new());
        store.set(HISTORY_KEY, "{oops");
        let mut history = PairHistory::load(store, 5);
        assert!(history.is_empty());
        history.add(&CurrencyPair::new("", "HKD"));
        assert!(history.is_empty());
    }
}
