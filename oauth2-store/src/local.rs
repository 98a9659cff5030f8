//! Process-local tier.
//!
//! Holds decoded [`CacheEntry`] values for the lifetime of the owning
//! facade. Entries never expire; they are replaced by writes and
//! read-throughs and dropped by removals.

use std::collections::HashMap;
use std::sync::RwLock;

use oauth2_store_core::{CacheEntry, StoreResult, TierError};

/// Process-local map from prefixed key to decoded entry.
#[derive(Debug, Default)]
pub struct LocalCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl LocalCache {
    /// Empty tier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry held for `key`, if any; `NotFound` entries are returned as such.
    pub fn get(&self, key: &str) -> StoreResult<Option<CacheEntry>> {
        let entries = self.entries.read().map_err(|_| TierError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    /// Record `entry` for `key`, replacing whatever was there.
    pub fn insert(&self, key: &str, entry: CacheEntry) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| TierError::LockPoisoned)?;
        entries.insert(key.to_string(), entry);
        Ok(())
    }

    /// Drop `key`. Absent keys are fine.
    pub fn remove(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| TierError::LockPoisoned)?;
        entries.remove(key);
        Ok(())
    }

    /// Keys currently held, positive and negative.
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        let entries = self.entries.read().map_err(|_| TierError::LockPoisoned)?;
        Ok(entries.keys().cloned().collect())
    }

    /// Drop every entry.
    pub fn clear(&self) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| TierError::LockPoisoned)?;
        entries.clear();
        Ok(())
    }

    /// Number of entries, positive and negative.
    pub fn len(&self) -> StoreResult<usize> {
        let entries = self.entries.read().map_err(|_| TierError::LockPoisoned)?;
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}
