//! # Resolution Cache
//!
//! Memory-resident map from a composite documentation key to its resolved URL.
//! Entries expire after a fixed TTL and are evicted lazily when touched; there is no
//! background sweep and no size bound (the key space is small).

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::clock::Clock;

pub const DEFAULT_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    stored_at: DateTime<Utc>,
}

pub struct ResolutionCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ResolutionCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            clock,
        }
    }

    /// Returns the cached value, evicting it first if it outlived the TTL.
    pub fn get(&mut self, key: &str) -> Option<String> {
        if self.evict_if_expired(key) {
            return None;
        }
        self.entries.get(key).map(|e| e.value.clone())
    }

    pub fn put(&mut self, key: &str, value: String) {
        self.evict_if_expired(key);
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                stored_at: self.clock.now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn evict_if_expired(&mut self, key: &str) -> bool {
        let now = self.clock.now();
        let expired = self
            .entries
            .get(key)
            .is_some_and(|e| now - e.stored_at > self.ttl);
        if expired {
            if let Some(old) = self.entries.remove(key) {
                tracing::debug!("Evicted {} -> {} from cache because of age", key, old.value);
            }
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::ManualClock;

    fn cache() -> (ResolutionCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = ResolutionCache::new(Duration::days(DEFAULT_TTL_DAYS), clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_hit_within_ttl() {
        let (mut cache, clock) = cache();
        cache.put("p1|", "https://docs/a".into());
        clock.advance(Duration::seconds(7 * 86400));
        assert_eq!(cache.get("p1|").as_deref(), Some("https://docs/a"));
    }

    #[test]
    fn test_expired_entry_is_evicted() {
        let (mut cache, clock) = cache();
        cache.put("p1|", "https://docs/a".into());
        clock.advance(Duration::seconds(7 * 86400 + 1));
        assert_eq!(cache.get("p1|"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_expiry_ignores_value_content() {
        let (mut cache, clock) = cache();
        cache.put("empty|", String::new());
        cache.put("long|", "x".repeat(4096));
        assert_eq!(cache.get("empty|").as_deref(), Some(""));
        clock.advance(Duration::days(8));
        assert_eq!(cache.get("empty|"), None);
        assert_eq!(cache.get("long|"), None);
    }

    #[test]
    fn test_put_refreshes_timestamp() {
        let (mut cache, clock) = cache();
        cache.put("p1|s", "old".into());
        clock.advance(Duration::days(6));
        cache.put("p1|s", "new".into());
        clock.advance(Duration::days(6));
        assert_eq!(cache.get("p1|s").as_deref(), Some("new"));
    }

    #[test]
    fn test_miss_on_unknown_key() {
        let (mut cache, _clock) = cache();
        assert_eq!(cache.get("nope|"), None);
    }
}
