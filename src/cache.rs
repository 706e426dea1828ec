use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

struct StoredEntry<V> {
    value: V,
    /// Insertion order, used to pick the eviction victim
    seq: u64,
    expires_at: Instant,
}

struct Entries<K, V> {
    map: HashMap<K, StoredEntry<V>>,
    next_seq: u64,
}

/// In-process lookup cache with a size bound and per-entry TTL.
///
/// Shared between requests behind an `Arc`. Concurrent writers for the same
/// key only duplicate upstream work; the last insert wins.
pub struct LookupCache<K, V> {
    entries: RwLock<Entries<K, V>>,
    max_entries: usize,
    default_ttl: Duration,
}

impl<K, V> LookupCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(Entries {
                map: HashMap::new(),
                next_seq: 0,
            }),
            max_entries: max_entries.max(1),
            default_ttl,
        }
    }

    /// Stores a value with the cache's default TTL.
    pub async fn put(&self, key: K, value: V) {
        self.put_with_ttl(key, value, self.default_ttl).await;
    }

    /// Stores a value with a time-to-live (TTL).
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub async fn put_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        if !entries.map.contains_key(&key) && entries.map.len() >= self.max_entries {
            entries.map.retain(|_, entry| entry.expires_at > now);
            if entries.map.len() >= self.max_entries {
                let oldest = entries
                    .map
                    .iter()
                    .min_by_key(|(_, entry)| entry.seq)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    tracing::debug!("Evicting {:?}", oldest);
                    entries.map.remove(&oldest);
                }
            }
        }

        let seq = entries.next_seq;
        entries.next_seq += 1;

        let expires_at = now
            .checked_add(ttl)
            .unwrap_or_else(|| now + Duration::from_secs(u64::from(u32::MAX)));
        entries.map.insert(
            key,
            StoredEntry {
                value,
                seq,
                expires_at,
            },
        );
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get(&self, key: &K) -> Option<V> {
        let expired = {
            let entries = self.entries.read().await;
            match entries.map.get(key) {
                Some(entry) if Instant::now() < entry.expires_at => {
                    tracing::debug!("Key found and still fresh");
                    return Some(entry.value.clone());
                }
                Some(_) => true,
                None => false,
            }
        };

        if expired {
            tracing::debug!("Key found but expired");
            self.remove_if_expired(key).await;
        } else {
            tracing::debug!("Key not found");
        }
        None
    }

    /// Drops `key` only if it is still expired under the write lock, so a
    /// fresh insert racing with `get` survives.
    async fn remove_if_expired(&self, key: &K) {
        let mut entries = self.entries.write().await;
        if entries
            .map
            .get(key)
            .is_some_and(|entry| Instant::now() >= entry.expires_at)
        {
            entries.map.remove(key);
        }
    }

    /// Manually removes a key from the cache.
    pub async fn remove(&self, key: &K) {
        self.entries.write().await.map.remove(key);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = LookupCache::new(10, Duration::from_secs(60));
        cache.put("delhi".to_string(), Some((28.61, 77.21))).await;

        assert_eq!(cache.get(&"delhi".to_string()).await, Some(Some((28.61, 77.21))));
        assert_eq!(cache.get(&"agra".to_string()).await, None);
    }

    #[tokio::test]
    async fn test_negative_results_are_cached() {
        let cache: LookupCache<String, Option<u32>> =
            LookupCache::new(10, Duration::from_secs(60));
        cache.put("nowhere".to_string(), None).await;

        assert_eq!(cache.get(&"nowhere".to_string()).await, Some(None));
    }

    #[tokio::test]
    async fn test_expired_entries_are_dropped() {
        let cache = LookupCache::new(10, Duration::from_secs(60));
        cache.put_with_ttl(1, "stale", Duration::ZERO).await;

        assert_eq!(cache.get(&1).await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_expiry_cleanup_keeps_fresh_reinsert() {
        let cache = LookupCache::new(10, Duration::from_secs(60));
        cache.put_with_ttl(1, "stale", Duration::ZERO).await;
        // Fresh insert lands between the expired read and the cleanup
        cache.put(1, "fresh").await;
        cache.remove_if_expired(&1).await;

        assert_eq!(cache.get(&1).await, Some("fresh"));

        cache.put_with_ttl(2, "stale", Duration::ZERO).await;
        cache.remove_if_expired(&2).await;
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_oldest_entry_evicted_when_full() {
        let cache = LookupCache::new(2, Duration::from_secs(60));
        cache.put(1, "a").await;
        cache.put(2, "b").await;
        cache.put(3, "c").await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get(&1).await, None);
        assert_eq!(cache.get(&2).await, Some("b"));
        assert_eq!(cache.get(&3).await, Some("c"));
    }

    #[tokio::test]
    async fn test_expired_entries_purged_before_eviction() {
        let cache = LookupCache::new(2, Duration::from_secs(60));
        cache.put(1, "keep").await;
        cache.put_with_ttl(2, "gone", Duration::ZERO).await;
        cache.put(3, "new").await;

        assert_eq!(cache.get(&1).await, Some("keep"));
        assert_eq!(cache.get(&3).await, Some("new"));
    }

    #[tokio::test]
    async fn test_overwrite_does_not_evict() {
        let cache = LookupCache::new(2, Duration::from_secs(60));
        cache.put(1, "a").await;
        cache.put(2, "b").await;
        cache.put(2, "b2").await;

        assert_eq!(cache.get(&1).await, Some("a"));
        assert_eq!(cache.get(&2).await, Some("b2"));
    }
}
