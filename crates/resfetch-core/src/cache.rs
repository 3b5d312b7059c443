//! Last-good-value response cache.
//!
//! One entry per request key, overwritten on every successful fetch and read
//! back as a fallback once retries are exhausted. Entries are never evicted;
//! the cache lives as long as the process (or the owning `Arc`).

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

/// A stored value and when it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub stored_at: Instant,
}

impl<V> CacheEntry<V> {
    /// Time since the value was stored.
    pub fn age(&self) -> Duration {
        self.stored_at.elapsed()
    }
}

/// Shared key -> last successful value map.
///
/// Stores are last-write-wins; readers see whichever store finished last.
#[derive(Debug)]
pub struct ResponseCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> Default for ResponseCache<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> ResponseCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn store(&self, key: K, value: V) {
        let entry = CacheEntry {
            value,
            stored_at: Instant::now(),
        };
        self.write().insert(key, entry);
    }

    /// Last stored value for `key`, if any.
    pub fn fallback(&self, key: &K) -> Option<V> {
        self.read().get(key).map(|e| e.value.clone())
    }

    /// Last stored entry (value plus timestamp) for `key`.
    pub fn entry(&self, key: &K) -> Option<CacheEntry<V>> {
        self.read().get(key).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panic while holding the lock cannot leave the map half-updated
    // (insert is the only mutation), so poisoned guards are used as-is.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn fallback_returns_last_stored_value() {
        let cache = ResponseCache::new();
        assert_eq!(cache.fallback(&"paris"), None);

        cache.store("paris", 18);
        assert_eq!(cache.fallback(&"paris"), Some(18));

        cache.store("paris", 21);
        assert_eq!(cache.fallback(&"paris"), Some(21));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn fallback_does_not_remove_entry() {
        let cache = ResponseCache::new();
        cache.store("k".to_string(), "v".to_string());
        assert_eq!(cache.fallback(&"k".to_string()).as_deref(), Some("v"));
        assert_eq!(cache.fallback(&"k".to_string()).as_deref(), Some("v"));
        assert!(cache.contains(&"k".to_string()));
    }

    #[test]
    fn entry_records_store_time() {
        let cache = ResponseCache::new();
        let before = Instant::now();
        cache.store(1u32, "a");
        let entry = cache.entry(&1).expect("entry");
        assert_eq!(entry.value, "a");
        assert!(entry.stored_at >= before);
        assert!(entry.age() < Duration::from_secs(60));
    }

    #[test]
    fn concurrent_stores_leave_one_value_per_key() {
        let cache = Arc::new(ResponseCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for round in 0..100 {
                        cache.store(i % 2, i * 1000 + round);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.len(), 2);
        assert!(cache.fallback(&0).is_some());
        assert!(cache.fallback(&1).is_some());
    }
}
