//! oauth2-store Core - Shared Types
//!
//! Errors, configuration, namespaced keys and the cache-entry codec used by
//! every storage tier. No I/O lives here.

pub mod config;
pub mod entry;
pub mod error;
pub mod key;

pub use config::{StorageConfig, DEFAULT_CACHE_TTL};
pub use entry::{
    decode_durable, encode_durable, from_json_value, to_json_value, CacheEntry,
};
pub use error::{CodecError, ConfigError, StoreError, StoreResult, TierError};
pub use key::{service_name_of, Namespace, KEY_SEPARATOR, SERVICE_PREFIX};

/// JSON value type used for values in flight between tiers.
pub use serde_json::Value;
