//! oauth2-store - Layered Storage for OAuth2 Client State
//!
//! Stores tokens, verifiers and flags under a per-service namespace, backed
//! by a durable store and accelerated by a shared TTL cache and a
//! process-local cache. See [`LayeredStorage`] for the tier rules.

pub mod layered;
pub mod lmdb;
pub mod local;
pub mod memory;
pub mod names;
pub mod traits;

pub use layered::LayeredStorage;
pub use lmdb::{LmdbDurableStore, LmdbStoreError};
pub use local::LocalCache;
pub use memory::{InMemoryDurableStore, InMemorySharedCache};
pub use names::service_names;
pub use traits::{DurableStore, SharedCache, TierStats};

pub use oauth2_store_core::{
    CacheEntry, CodecError, ConfigError, Namespace, StorageConfig, StoreError, StoreResult,
    TierError, DEFAULT_CACHE_TTL,
};
