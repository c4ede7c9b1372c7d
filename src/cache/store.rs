//! Pair-level LRU store of chart payloads.
//!
//! Entries are grouped by currency pair; every pair holds one entry per
//! period. Recency is tracked per pair, and eviction drops the least
//! recently used pair together with all of its periods.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use lru::LruCache;
use tracing::debug;

use crate::core::{CacheEntry, CacheKey, CurrencyPair, Period, MAX_PAIRS};

/// Bounded chart cache keyed by (pair, period).
pub struct CacheStore {
    pairs: LruCache<CurrencyPair, HashMap<Period, CacheEntry>>,
}

impl CacheStore {
    /// Create a store holding at most `max_pairs` distinct pairs
    pub fn new(max_pairs: usize) -> Self {
        let capacity = NonZeroUsize::new(max_pairs).unwrap_or(NonZeroUsize::MIN);
        Self {
            pairs: LruCache::new(capacity),
        }
    }

    /// Look up an entry without changing usage order
    pub fn get(&self, pair: &CurrencyPair, period: Period) -> Option<&CacheEntry> {
        self.pairs.peek(pair)?.get(&period)
    }

    /// Look up an entry by cache key without changing usage order
    pub fn get_key(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.get(&key.pair, key.period)
    }

    /// Insert or replace an entry and mark its pair most recently used.
    ///
    /// Capacity is only checked when a new pair is added. Returns the
    /// evicted pair, if any.
    pub fn put(&mut self, entry: CacheEntry) -> Option<CurrencyPair> {
        let key = entry.key.clone();
        let pair = key.pair.clone();

        if let Some(periods) = self.pairs.get_mut(&pair) {
            periods.insert(key.period, entry);
            debug!(key = %key, "cache entry stored");
            return None;
        }

        let mut periods = HashMap::new();
        periods.insert(key.period, entry);
        debug!(key = %key, "cache entry stored for new pair");
        match self.pairs.push(pair.clone(), periods) {
            Some((evicted, dropped)) if evicted != pair => {
                debug!(
                    pair = %evicted,
                    periods = dropped.len(),
                    "evicted least recently used pair"
                );
                Some(evicted)
            }
            _ => None,
        }
    }

    /// Mark a pair most recently used. Returns false if the pair is not cached.
    pub fn touch(&mut self, pair: &CurrencyPair) -> bool {
        if self.pairs.contains(pair) {
            self.pairs.promote(pair);
            true
        } else {
            false
        }
    }

    /// Whether every given period is cached for the pair
    pub fn has_complete(&self, pair: &CurrencyPair, periods: &[Period]) -> bool {
        periods.iter().all(|period| self.get(pair, *period).is_some())
    }

    /// Periods from `periods` that have no entry for the pair
    pub fn missing_periods(&self, pair: &CurrencyPair, periods: &[Period]) -> Vec<Period> {
        periods
            .iter()
            .copied()
            .filter(|period| self.get(pair, *period).is_none())
            .collect()
    }

    /// Cached periods of a pair, ascending
    pub fn periods(&self, pair: &CurrencyPair) -> Vec<Period> {
        let mut periods: Vec<Period> = self
            .pairs
            .peek(pair)
            .map(|entries| entries.keys().copied().collect())
            .unwrap_or_default();
        periods.sort();
        periods
    }

    /// Pairs ordered most recently used first
    pub fn usage_order(&self) -> Vec<CurrencyPair> {
        self.pairs.iter().map(|(pair, _)| pair.clone()).collect()
    }

    pub fn contains_pair(&self, pair: &CurrencyPair) -> bool {
        self.pairs.contains(pair)
    }

    /// Number of distinct pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.pairs.cap().get()
    }

    /// Drop every entry and the usage order
    pub fn clear(&mut self) {
        self.pairs.clear();
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(MAX_PAIRS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ChartStatistics;
    use chrono::Utc;

    fn entry(buy: &str, sell: &str, period: u32, reference: &str) -> CacheEntry {
        CacheEntry::new(
            CacheKey::new(CurrencyPair::new(buy, sell), Period(period)),
            reference,
            ChartStatistics {
                max_rate: 1.2,
                min_rate: 1.0,
                avg_rate: 1.1,
                data_points: period,
                date_range: "2025-01-01 至 2025-01-07".to_string(),
            },
            Utc::now(),
        )
    }

    fn pair(buy: &str, sell: &str) -> CurrencyPair {
        CurrencyPair::new(buy, sell)
    }

    #[test]
    fn test_evicts_least_recently_used_pair() {
        let mut store = CacheStore::new(5);
        let pairs = [
            ("USD", "EUR"),
            ("GBP", "JPY"),
            ("AUD", "CAD"),
            ("CHF", "NOK"),
            ("SEK", "PLN"),
        ];
        for (buy, sell) in pairs {
            assert_eq!(store.put(entry(buy, sell, 7, "chart.png")), None);
        }

        let evicted = store.put(entry("NZD", "ISK", 7, "chart.png"));
        assert_eq!(evicted, Some(pair("USD", "EUR")));
        assert_eq!(store.len(), 5);
        assert!(!store.contains_pair(&pair("USD", "EUR")));
        for (buy, sell) in pairs.into_iter().skip(1).chain([("NZD", "ISK")]) {
            assert!(store.contains_pair(&pair(buy, sell)));
        }
    }

    #[test]
    fn test_eviction_removes_every_period_of_the_pair() {
        let mut store = CacheStore::new(2);
        for period in [7, 30, 90, 180] {
            store.put(entry("USD", "EUR", period, "a.png"));
        }
        store.put(entry("GBP", "JPY", 7, "b.png"));
        store.put(entry("AUD", "CAD", 7, "c.png"));

        for period in [7, 30, 90, 180] {
            assert!(store.get(&pair("USD", "EUR"), Period(period)).is_none());
        }
        assert!(store.periods(&pair("USD", "EUR")).is_empty());
    }

    #[test]
    fn test_update_existing_pair_at_capacity_does_not_evict() {
        let mut store = CacheStore::new(2);
        store.put(entry("USD", "EUR", 7, "a.png"));
        store.put(entry("GBP", "JPY", 7, "b.png"));

        assert_eq!(store.put(entry("USD", "EUR", 30, "a30.png")), None);
        assert_eq!(store.len(), 2);
        assert_eq!(store.usage_order(), vec![pair("USD", "EUR"), pair("GBP", "JPY")]);
    }

    #[test]
    fn test_get_does_not_touch_but_touch_does() {
        let mut store = CacheStore::new(2);
        store.put(entry("USD", "EUR", 7, "a.png"));
        store.put(entry("GBP", "JPY", 7, "b.png"));

        assert!(store.get(&pair("USD", "EUR"), Period(7)).is_some());
        assert_eq!(store.put(entry("AUD", "CAD", 7, "c.png")), Some(pair("USD", "EUR")));

        assert!(store.touch(&pair("GBP", "JPY")));
        assert_eq!(store.put(entry("CHF", "NOK", 7, "d.png")), Some(pair("AUD", "CAD")));
        assert!(!store.touch(&pair("USD", "EUR")));
    }

    #[test]
    fn test_usage_order_is_permutation_of_pairs() {
        let mut store = CacheStore::new(3);
        let pairs = [
            ("USD", "EUR"),
            ("GBP", "JPY"),
            ("USD", "EUR"),
            ("AUD", "CAD"),
            ("CHF", "NOK"),
            ("GBP", "JPY"),
        ];
        for (i, (buy, sell)) in pairs.iter().enumerate() {
            store.put(entry(buy, sell, 7 + i as u32, "x.png"));
            let order = store.usage_order();
            assert!(order.len() <= 3);
            assert_eq!(order.len(), store.len());
            assert!(order.iter().all(|p| store.contains_pair(p)));
            assert_eq!(order[0], pair(buy, sell));
        }
    }

    #[test]
    fn test_last_write_wins() {
        let mut store = CacheStore::default();
        store.put(entry("TWD", "HKD", 7, "old.png"));
        store.put(entry("TWD", "HKD", 7, "new.png"));
        let cached = store.get(&pair("TWD", "HKD"), Period(7)).unwrap();
        assert_eq!(cached.chart_reference, "new.png");
    }

    #[test]
    fn test_has_complete_and_missing_periods() {
        let mut store = CacheStore::default();
        let all = [Period(7), Period(30), Period(90), Period(180)];
        store.put(entry("TWD", "HKD", 7, "7.png"));
        store.put(entry("TWD", "HKD", 30, "30.png"));

        assert!(!store.has_complete(&pair("TWD", "HKD"), &all));
        assert!(store.has_complete(&pair("TWD", "HKD"), &all[..2]));
        assert_eq!(store.missing_periods(&pair("TWD", "HKD"), &all), vec![Period(90), Period(180)]);
        assert!(!store.has_complete(&pair("HKD", "TWD"), &all[..1]));
    }

    #[test]
    fn test_clear() {
        let mut store = CacheStore::default();
        store.put(entry("TWD", "HKD", 7, "7.png"));
        store.clear();
        assert!(store.is_empty());
        assert!(store.usage_order().is_empty());
        assert_eq!(store.capacity(), MAX_PAIRS);
    }

    #[test]
    fn test_zero_capacity_holds_one_pair() {
        let mut store = CacheStore::new(0);
        store.put(entry("TWD", "HKD", 7, "7.png"));
        assert_eq!(store.put(entry("USD", "EUR", 7, "7.png")), Some(pair("TWD", "HKD")));
        assert_eq!(store.len(), 1);
    }
}
