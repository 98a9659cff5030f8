//! Layered storage facade.
//!
//! Composes the process-local tier, an optional shared cache and an optional
//! durable store into one get/set/remove/reset API over namespaced keys.
//!
//! # Read path
//!
//! Reads walk the tiers from fastest to slowest and stop at the first hit:
//!
//! 1. process-local tier (skipped by [`LayeredStorage::get_value_skip_local`])
//! 2. shared cache; a hit is copied into the local tier
//! 3. durable store; a hit is written through to the shared cache and the
//!    local tier
//! 4. miss everywhere: a [`CacheEntry::NotFound`] is recorded locally and in
//!    the shared cache, never in the durable store
//!
//! # Consistency
//!
//! Writes go durable, then shared, then local, unconditionally and without a
//! transaction. A failing tier leaves the tiers before it written. Another
//! process may keep reading an older shared-cache entry until its TTL
//! lapses; skipping the local tier does not bypass the shared cache.

use std::sync::Arc;

use oauth2_store_core::{
    decode_durable, encode_durable, to_json_value, CacheEntry, Namespace, StorageConfig,
    StoreResult,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::local::LocalCache;
use crate::traits::{DurableStore, SharedCache};

/// Namespaced storage layered over durable, shared and process-local tiers.
///
/// # Example
///
/// ```ignore
/// let storage = LayeredStorage::new(StorageConfig::for_service("drive"))?
///     .with_durable_store(durable)
///     .with_shared_cache(cache);
///
/// storage.set_value("code_verifier", &verifier)?;
/// let verifier: Option<String> = storage.get_value("code_verifier")?;
/// ```
pub struct LayeredStorage {
    config: StorageConfig,
    namespace: Namespace,
    durable: Option<Arc<dyn DurableStore>>,
    shared: Option<Arc<dyn SharedCache>>,
    local: LocalCache,
}

impl LayeredStorage {
    /// Create a storage with no slow tiers attached.
    ///
    /// Fails if the config does not validate.
    pub fn new(config: StorageConfig) -> StoreResult<Self> {
        config.validate()?;
        Ok(Self {
            namespace: config.namespace(),
            config,
            durable: None,
            shared: None,
            local: LocalCache::new(),
        })
    }

    /// Storage for a named OAuth2 service, rooted at `oauth2.<service_name>`.
    pub fn for_service(service_name: &str) -> StoreResult<Self> {
        Self::new(StorageConfig::for_service(service_name))
    }

    /// Attach the durable store.
    pub fn with_durable_store(mut self, durable: Arc<dyn DurableStore>) -> Self {
        self.durable = Some(durable);
        self
    }

    /// Attach the shared cache.
    pub fn with_shared_cache(mut self, shared: Arc<dyn SharedCache>) -> Self {
        self.shared = Some(shared);
        self
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn prefix(&self) -> &str {
        self.namespace.prefix()
    }

    pub fn has_durable_store(&self) -> bool {
        self.durable.is_some()
    }

    pub fn has_shared_cache(&self) -> bool {
        self.shared.is_some()
    }

    /// Apply the namespace prefix to `key`; the empty key is the bare prefix.
    pub fn prefixed_key(&self, key: &str) -> String {
        self.namespace.key(key)
    }

    /// Get a stored value.
    ///
    /// Returns `Ok(None)` when the key is absent or holds JSON `null`.
    pub fn get_value<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        let prefixed_key = self.prefixed_key(key);
        self.lookup(&prefixed_key, false)?.into_typed(&prefixed_key)
    }

    /// Get a stored value, ignoring whatever the process-local tier holds.
    ///
    /// The shared cache is still consulted first, so this does not give
    /// read-after-write consistency against other processes.
    pub fn get_value_skip_local<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        let prefixed_key = self.prefixed_key(key);
        self.lookup(&prefixed_key, true)?.into_typed(&prefixed_key)
    }

    fn lookup(&self, prefixed_key: &str, skip_local: bool) -> StoreResult<CacheEntry> {
        if !skip_local {
            if let Some(entry) = self.local.get(prefixed_key)? {
                tracing::debug!(key = prefixed_key, tier = "local", found = entry.is_found(), "storage hit");
                return Ok(entry);
            }
        }

        if let Some(shared) = &self.shared {
            if let Some(raw) = shared.get(prefixed_key)? {
                let entry = CacheEntry::decode(prefixed_key, &raw).inspect_err(|e| {
                    tracing::warn!(key = prefixed_key, tier = "shared", error = %e, "corrupt cache entry");
                })?;
                tracing::debug!(key = prefixed_key, tier = "shared", found = entry.is_found(), "storage hit");
                self.local.insert(prefixed_key, entry.clone())?;
                return Ok(entry);
            }
        }

        if let Some(durable) = &self.durable {
            if let Some(raw) = durable.get(prefixed_key)? {
                let value = decode_durable(prefixed_key, &raw).inspect_err(|e| {
                    tracing::warn!(key = prefixed_key, tier = "durable", error = %e, "corrupt stored value");
                })?;
                tracing::debug!(key = prefixed_key, tier = "durable", "storage hit");
                let entry = CacheEntry::Found(value);
                if let Some(shared) = &self.shared {
                    shared.put(prefixed_key, &entry.encode(prefixed_key)?, self.config.cache_ttl)?;
                }
                self.local.insert(prefixed_key, entry.clone())?;
                return Ok(entry);
            }
        }

        tracing::debug!(key = prefixed_key, "storage miss, caching absence");
        self.local.insert(prefixed_key, CacheEntry::NotFound)?;
        if let Some(shared) = &self.shared {
            shared.put(
                prefixed_key,
                &CacheEntry::NotFound.encode(prefixed_key)?,
                self.config.cache_ttl,
            )?;
        }
        Ok(CacheEntry::NotFound)
    }

    /// Store a value in every configured tier.
    ///
    /// Storing `null` (for example `None::<String>`) is allowed and reads
    /// back as absent.
    pub fn set_value<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        let prefixed_key = self.prefixed_key(key);
        let value = to_json_value(&prefixed_key, value)?;

        if let Some(durable) = &self.durable {
            durable.set(&prefixed_key, &encode_durable(&prefixed_key, &value)?)?;
        }

        let entry = CacheEntry::Found(value);
        if let Some(shared) = &self.shared {
            shared.put(&prefixed_key, &entry.encode(&prefixed_key)?, self.config.cache_ttl)?;
        }

        tracing::debug!(key = %prefixed_key, "stored value");
        self.local.insert(&prefixed_key, entry)
    }

    /// Remove a stored value from every configured tier.
    ///
    /// Removing an absent key is a no-op.
    pub fn remove_value(&self, key: &str) -> StoreResult<()> {
        let prefixed_key = self.prefixed_key(key);
        self.remove_prefixed(&prefixed_key)
    }

    fn remove_prefixed(&self, prefixed_key: &str) -> StoreResult<()> {
        if let Some(durable) = &self.durable {
            durable.delete(prefixed_key)?;
        }
        if let Some(shared) = &self.shared {
            shared.remove(prefixed_key)?;
        }
        tracing::debug!(key = prefixed_key, "removed value");
        self.local.remove(prefixed_key)
    }

    /// Remove every key under this namespace; returns how many were removed.
    ///
    /// Keys are enumerated from the durable store when one is attached,
    /// otherwise from the process-local tier. The shared cache cannot be
    /// enumerated: without a durable store, entries that only live there
    /// (written by an earlier execution) survive until their TTL lapses.
    pub fn reset(&self) -> StoreResult<usize> {
        let (source, keys) = match &self.durable {
            Some(durable) => {
                let keys: Vec<String> = durable
                    .list_keys()?
                    .into_iter()
                    .filter(|key| self.namespace.owns(key))
                    .collect();
                ("durable", keys)
            }
            None => ("local", self.local.keys()?),
        };

        for key in &keys {
            self.remove_prefixed(key)?;
        }

        tracing::info!(
            prefix = self.prefix(),
            source,
            removed = keys.len(),
            "storage reset"
        );
        Ok(keys.len())
    }

    /// Forget everything held in the process-local tier.
    ///
    /// The next read of each key goes back to the shared cache or durable
    /// store, as it would in a fresh execution.
    pub fn clear_local(&self) -> StoreResult<()> {
        self.local.clear()
    }

    /// Number of entries, positive and negative, held in the local tier.
    pub fn local_len(&self) -> StoreResult<usize> {
        self.local.len()
    }
}

impl std::fmt::Debug for LayeredStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayeredStorage")
            .field("config", &self.config)
            .field("durable", &self.durable.is_some())
            .field("shared", &self.shared.is_some())
            .finish_non_exhaustive()
    }
}
