//! In-memory tier implementations.
//!
//! Useful for embedding the facade without external services and as fakes
//! in tests: both tiers count their calls in [`TierStats`], so tests can
//! assert which tiers a lookup actually touched.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use oauth2_store_core::{StoreResult, TierError};

use crate::traits::{DurableStore, SharedCache, TierStats};

/// In-memory durable store.
///
/// Keys are kept sorted, so `list_keys` is deterministic.
#[derive(Debug, Default)]
pub struct InMemoryDurableStore {
    entries: RwLock<BTreeMap<String, String>>,
    stats: RwLock<TierStats>,
}

impl InMemoryDurableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value without touching the call counters.
    pub fn insert_raw(&self, key: impl Into<String>, raw: impl Into<String>) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.into(), raw.into());
        }
    }

    /// Peek at a raw value without touching the call counters.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the call counters.
    pub fn stats(&self) -> TierStats {
        self.stats.read().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn reset_stats(&self) {
        if let Ok(mut stats) = self.stats.write() {
            *stats = TierStats::default();
        }
    }

    fn record(&self, f: impl FnOnce(&mut TierStats)) {
        if let Ok(mut stats) = self.stats.write() {
            f(&mut stats);
        }
    }
}

impl DurableStore for InMemoryDurableStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = {
            let entries = self.entries.read().map_err(|_| TierError::LockPoisoned)?;
            entries.get(key).cloned()
        };
        self.record(|s| {
            s.gets += 1;
            if value.is_some() {
                s.hits += 1;
            } else {
                s.misses += 1;
            }
        });
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| TierError::LockPoisoned)?;
        entries.insert(key.to_string(), value.to_string());
        drop(entries);
        self.record(|s| s.writes += 1);
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| TierError::LockPoisoned)?;
        entries.remove(key);
        drop(entries);
        self.record(|s| s.deletes += 1);
        Ok(())
    }

    fn list_keys(&self) -> StoreResult<Vec<String>> {
        let keys = {
            let entries = self.entries.read().map_err(|_| TierError::LockPoisoned)?;
            entries.keys().cloned().collect()
        };
        self.record(|s| s.lists += 1);
        Ok(keys)
    }
}

/// In-memory shared cache with per-entry expiry.
///
/// Expired entries are dropped lazily on the next `get`.
#[derive(Debug, Default)]
pub struct InMemorySharedCache {
    entries: RwLock<HashMap<String, (String, DateTime<Utc>)>>,
    stats: RwLock<TierStats>,
}

impl InMemorySharedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Peek at a live raw value without touching the call counters.
    pub fn peek(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().ok()?;
        entries
            .get(key)
            .filter(|(_, expires_at)| *expires_at > Utc::now())
            .map(|(raw, _)| raw.clone())
    }

    /// Expiry time of a cached key.
    pub fn expires_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.entries.read().ok()?.get(key).map(|(_, at)| *at)
    }

    /// Drop every entry, as if all TTLs lapsed at once.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Utc::now();
        self.entries
            .read()
            .map(|e| e.values().filter(|(_, at)| *at > now).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the call counters.
    pub fn stats(&self) -> TierStats {
        self.stats.read().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn reset_stats(&self) {
        if let Ok(mut stats) = self.stats.write() {
            *stats = TierStats::default();
        }
    }

    fn record(&self, f: impl FnOnce(&mut TierStats)) {
        if let Ok(mut stats) = self.stats.write() {
            f(&mut stats);
        }
    }
}

impl SharedCache for InMemorySharedCache {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let now = Utc::now();
        let value = {
            let mut entries = self.entries.write().map_err(|_| TierError::LockPoisoned)?;
            match entries.get(key) {
                Some((raw, expires_at)) if *expires_at > now => Some(raw.clone()),
                Some(_) => {
                    entries.remove(key);
                    None
                }
                None => None,
            }
        };
        self.record(|s| {
            s.gets += 1;
            if value.is_some() {
                s.hits += 1;
            } else {
                s.misses += 1;
            }
        });
        Ok(value)
    }

    fn put(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| TierError::shared("put", format!("invalid ttl: {e}")))?;
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| TierError::shared("put", "ttl overflows the clock"))?;

        let mut entries = self.entries.write().map_err(|_| TierError::LockPoisoned)?;
        entries.insert(key.to_string(), (value.to_string(), expires_at));
        drop(entries);
        self.record(|s| s.writes += 1);
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| TierError::LockPoisoned)?;
        entries.remove(key);
        drop(entries);
        self.record(|s| s.deletes += 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durable_set_get_delete() {
        let store = InMemoryDurableStore::new();
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap(), Some("1".to_string()));
        assert_eq!(store.get("b").unwrap(), None);

        store.delete("a").unwrap();
        store.delete("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);

        let stats = store.stats();
        assert_eq!(stats.gets, 3);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.deletes, 2);
    }

    #[test]
    fn test_durable_list_keys_sorted() {
        let store = InMemoryDurableStore::new();
        store.set("b", "2").unwrap();
        store.set("a", "1").unwrap();
        assert_eq!(store.list_keys().unwrap(), vec!["a", "b"]);
        assert_eq!(store.stats().lists, 1);
    }

    #[test]
    fn test_durable_seed_and_peek_do_not_count() {
        let store = InMemoryDurableStore::new();
        store.insert_raw("k", "\"v\"");
        assert_eq!(store.peek("k"), Some("\"v\"".to_string()));
        assert_eq!(store.stats().calls(), 0);
    }

    #[test]
    fn test_shared_put_get_remove() {
        let cache = InMemorySharedCache::new();
        cache.put("a", "1", Duration::from_secs(60)).unwrap();
        assert_eq!(cache.get("a").unwrap(), Some("1".to_string()));

        cache.remove("a").unwrap();
        cache.remove("a").unwrap();
        assert_eq!(cache.get("a").unwrap(), None);
        assert_eq!(cache.stats().deletes, 2);
    }

    #[test]
    fn test_shared_entry_expires() {
        let cache = InMemorySharedCache::new();
        cache.put("a", "1", Duration::ZERO).unwrap();
        assert_eq!(cache.get("a").unwrap(), None);
        assert!(cache.expires_at("a").is_none(), "expired entry is dropped on read");
    }

    #[test]
    fn test_shared_expiry_tracks_ttl() {
        let cache = InMemorySharedCache::new();
        let before = Utc::now();
        cache.put("a", "1", Duration::from_secs(21_600)).unwrap();
        let expires_at = cache.expires_at("a").unwrap();
        let delta = expires_at.signed_duration_since(before);
        assert!(delta >= chrono::Duration::seconds(21_600));
        assert!(delta < chrono::Duration::seconds(21_610));
    }

    #[test]
    fn test_shared_clear() {
        let cache = InMemorySharedCache::new();
        cache.put("a", "1", Duration::from_secs(60)).unwrap();
        cache.put("b", "2", Duration::from_secs(60)).unwrap();
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
