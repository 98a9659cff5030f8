//! Storage tier traits.
//!
//! The facade depends on its slow tiers only through these traits, so hosts
//! can plug in whatever backs them (LMDB, a properties service, Redis) and
//! tests can substitute in-memory fakes.

use std::time::Duration;

use oauth2_store_core::StoreResult;

/// Slow, authoritative key-value store that persists across restarts.
///
/// Calls are synchronous and assumed strongly consistent per key.
pub trait DurableStore: Send + Sync {
    /// Get the raw string stored under `key`.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete `key`. Deleting an absent key is not an error.
    fn delete(&self, key: &str) -> StoreResult<()>;

    /// List every key in the store, across all namespaces.
    ///
    /// Only `reset` and service enumeration use this.
    fn list_keys(&self) -> StoreResult<Vec<String>>;
}

/// Fast, TTL-bounded cache shared by concurrent executions.
///
/// Not authoritative and not enumerable: entries vanish on their own when
/// the TTL lapses.
pub trait SharedCache: Send + Sync {
    /// Get the raw string cached under `key`, if still live.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Cache `value` under `key` for `ttl`.
    fn put(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()>;

    /// Drop `key` from the cache. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// Call counters kept by the bundled tier implementations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierStats {
    /// Number of `get` calls.
    pub gets: u64,
    /// `get` calls that returned a value.
    pub hits: u64,
    /// `get` calls that returned nothing.
    pub misses: u64,
    /// Number of `set`/`put` calls.
    pub writes: u64,
    /// Number of `delete`/`remove` calls.
    pub deletes: u64,
    /// Number of `list_keys` calls.
    pub lists: u64,
}

impl TierStats {
    /// Total number of calls of any kind.
    pub fn calls(&self) -> u64 {
        self.gets + self.writes + self.deletes + self.lists
    }

    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        if self.gets == 0 {
            0.0
        } else {
            self.hits as f64 / self.gets as f64
        }
    }
}
