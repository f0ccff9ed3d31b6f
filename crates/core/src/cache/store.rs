//! In-memory response cache with TTL expiry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::clock::{Clock, SystemClock};
use super::key::CacheKey;
use crate::config::AppConfig;

/// A cached upstream payload. Never mutated after creation.
#[derive(Debug)]
pub struct CacheEntry {
    pub payload: Value,
    pub stored_at: Instant,
}

/// Snapshot of cache size and settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub ttl_secs: u64,
    pub sweep_interval_secs: u64,
    pub max_entries: Option<usize>,
}

/// Process-local response cache shared by every request handler.
///
/// `get` treats stale entries as misses but leaves them in place; they are
/// physically removed by [`ResponseCache::sweep`]. An entry can therefore
/// linger for up to `ttl + sweep_interval`.
pub struct ResponseCache {
    entries: RwLock<HashMap<CacheKey, Arc<CacheEntry>>>,
    ttl: Duration,
    sweep_interval: Duration,
    max_entries: Option<usize>,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    /// Create an empty cache using the system clock.
    pub fn new(ttl: Duration, sweep_interval: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            sweep_interval,
            max_entries: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Create a cache from the `cache_*` settings.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.cache_ttl(), config.cache_sweep_interval()).with_max_entries(config.cache_max_entries)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Cap the entry count enforced at the end of each sweep.
    pub fn with_max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// Return the payload for `key` if it is younger than the TTL.
    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        let entry = self.entries.read().get(key).cloned()?;
        let age = self.clock.now().saturating_duration_since(entry.stored_at);
        if age < self.ttl { Some(entry.payload.clone()) } else { None }
    }

    /// Store `payload` under `key`, replacing any previous entry.
    pub fn put(&self, key: CacheKey, payload: Value) {
        let entry = Arc::new(CacheEntry { payload, stored_at: self.clock.now() });
        self.entries.write().insert(key, entry);
    }

    /// Remove entries older than the TTL, then enforce `max_entries`.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();

        entries.retain(|_, entry| now.saturating_duration_since(entry.stored_at) <= self.ttl);

        if let Some(max) = self.max_entries
            && entries.len() > max
        {
            let mut by_age: Vec<(CacheKey, Instant)> =
                entries.iter().map(|(key, entry)| (key.clone(), entry.stored_at)).collect();
            by_age.sort_by_key(|(_, stored_at)| *stored_at);

            let excess = entries.len() - max;
            for (key, _) in by_age.into_iter().take(excess) {
                entries.remove(&key);
            }
        }

        before - entries.len()
    }

    /// Drop every entry. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write();
        let count = entries.len();
        entries.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            ttl_secs: self.ttl.as_secs(),
            sweep_interval_secs: self.sweep_interval.as_secs(),
            max_entries: self.max_entries,
        }
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.len())
            .field("ttl", &self.ttl)
            .field("sweep_interval", &self.sweep_interval)
            .field("max_entries", &self.max_entries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use serde_json::json;

    const TTL: Duration = Duration::from_secs(300);
    const SWEEP: Duration = Duration::from_secs(600);

    fn cache_with_clock() -> (ResponseCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = ResponseCache::new(TTL, SWEEP).with_clock(clock.clone());
        (cache, clock)
    }

    fn key(query: &str) -> CacheKey {
        CacheKey::new("kakao-search", [("query", query)])
    }

    #[test]
    fn test_put_then_get_within_ttl() {
        let (cache, clock) = cache_with_clock();
        let payload = json!({ "documents": [{ "address_name": "서울 강남구 역삼동" }] });

        cache.put(key("역삼"), payload.clone());
        assert_eq!(cache.get(&key("역삼")), Some(payload.clone()));

        clock.advance(Duration::from_secs(299));
        assert_eq!(cache.get(&key("역삼")), Some(payload));
    }

    #[test]
    fn test_get_after_ttl_is_miss_but_entry_remains() {
        let (cache, clock) = cache_with_clock();
        cache.put(key("역삼"), json!({ "documents": [] }));

        clock.advance(TTL);
        assert_eq!(cache.get(&key("역삼")), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_missing() {
        let (cache, _) = cache_with_clock();
        assert!(cache.get(&key("nothing")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_overwrites_and_refreshes_timestamp() {
        let (cache, clock) = cache_with_clock();
        cache.put(key("강남"), json!({ "old": 1 }));

        clock.advance(Duration::from_secs(200));
        cache.put(key("강남"), json!({ "new": 2 }));

        clock.advance(Duration::from_secs(200));
        assert_eq!(cache.get(&key("강남")), Some(json!({ "new": 2 })));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let (cache, clock) = cache_with_clock();
        cache.put(key("old"), json!(1));

        clock.advance(Duration::from_secs(200));
        cache.put(key("fresh"), json!(2));

        clock.advance(Duration::from_secs(101));
        assert_eq!(cache.sweep(), 1);
        assert!(cache.get(&key("old")).is_none());
        assert_eq!(cache.get(&key("fresh")), Some(json!(2)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_sweep_on_empty_cache() {
        let (cache, _) = cache_with_clock();
        assert_eq!(cache.sweep(), 0);
    }

    #[test]
    fn test_sweep_enforces_max_entries_oldest_first() {
        let clock = Arc::new(ManualClock::new());
        let cache = ResponseCache::new(TTL, SWEEP).with_clock(clock.clone()).with_max_entries(Some(2));

        for query in ["a", "b", "c"] {
            cache.put(key(query), json!(query));
            clock.advance(Duration::from_secs(1));
        }

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.sweep(), 1);
        assert!(cache.get(&key("a")).is_none());
        assert!(cache.get(&key("b")).is_some());
        assert!(cache.get(&key("c")).is_some());
    }

    #[test]
    fn test_clear() {
        let (cache, _) = cache_with_clock();
        cache.put(key("a"), json!(1));
        cache.put(key("b"), json!(2));
        assert_eq!(cache.clear(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_stats_and_from_config() {
        let config = AppConfig { cache_max_entries: Some(500), ..Default::default() };
        let cache = ResponseCache::from_config(&config);
        cache.put(key("a"), json!(1));

        let stats = cache.stats();
        assert_eq!(stats, CacheStats { entries: 1, ttl_secs: 300, sweep_interval_secs: 600, max_entries: Some(500) });
    }
}
