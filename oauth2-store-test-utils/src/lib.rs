//! oauth2-store Test Utilities
//!
//! Centralized test infrastructure for the oauth2-store workspace:
//! - Proptest generators for keys, prefixes and JSON values
//! - Failure-injecting tiers for error propagation tests
//! - Fixtures wiring a facade to in-memory tiers

// Re-export the in-memory tiers from their source crate
pub use oauth2_store::{InMemoryDurableStore, InMemorySharedCache};

pub use oauth2_store::{
    CacheEntry, CodecError, DurableStore, LayeredStorage, SharedCache, StorageConfig, StoreError,
    StoreResult, TierError, TierStats,
};

use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::time::Duration;

// ============================================================================
// FAILURE INJECTION
// ============================================================================

/// Tier operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TierOp {
    Get,
    Write,
    Delete,
    List,
}

impl TierOp {
    fn name(self) -> &'static str {
        match self {
            TierOp::Get => "get",
            TierOp::Write => "write",
            TierOp::Delete => "delete",
            TierOp::List => "list_keys",
        }
    }
}

/// Durable store that delegates to an in-memory store but fails the
/// operations it is told to fail.
#[derive(Debug, Default)]
pub struct FailingDurableStore {
    inner: InMemoryDurableStore,
    failing: RwLock<HashSet<TierOp>>,
}

impl FailingDurableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `op` fail from now on.
    pub fn fail(&self, op: TierOp) {
        self.failing.write().unwrap().insert(op);
    }

    /// Let `op` succeed again.
    pub fn heal(&self, op: TierOp) {
        self.failing.write().unwrap().remove(&op);
    }

    /// The wrapped store, for seeding and inspection.
    pub fn inner(&self) -> &InMemoryDurableStore {
        &self.inner
    }

    fn check(&self, op: TierOp) -> StoreResult<()> {
        if self.failing.read().unwrap().contains(&op) {
            return Err(TierError::durable(op.name(), "injected failure").into());
        }
        Ok(())
    }
}

impl DurableStore for FailingDurableStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check(TierOp::Get)?;
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.check(TierOp::Write)?;
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.check(TierOp::Delete)?;
        self.inner.delete(key)
    }

    fn list_keys(&self) -> StoreResult<Vec<String>> {
        self.check(TierOp::List)?;
        self.inner.list_keys()
    }
}

/// Shared cache that delegates to an in-memory cache but fails the
/// operations it is told to fail.
#[derive(Debug, Default)]
pub struct FailingSharedCache {
    inner: InMemorySharedCache,
    failing: RwLock<HashSet<TierOp>>,
}

impl FailingSharedCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, op: TierOp) {
        self.failing.write().unwrap().insert(op);
    }

    pub fn heal(&self, op: TierOp) {
        self.failing.write().unwrap().remove(&op);
    }

    pub fn inner(&self) -> &InMemorySharedCache {
        &self.inner
    }

    fn check(&self, op: TierOp) -> StoreResult<()> {
        if self.failing.read().unwrap().contains(&op) {
            return Err(TierError::shared(op.name(), "injected failure").into());
        }
        Ok(())
    }
}

impl SharedCache for FailingSharedCache {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check(TierOp::Get)?;
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        self.check(TierOp::Write)?;
        self.inner.put(key, value, ttl)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.check(TierOp::Delete)?;
        self.inner.remove(key)
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

/// A facade wired to fresh in-memory tiers, with handles to the tiers.
pub struct LayeredFixture {
    pub storage: LayeredStorage,
    pub durable: Arc<InMemoryDurableStore>,
    pub shared: Arc<InMemorySharedCache>,
}

impl LayeredFixture {
    /// Fixture with every tier attached.
    pub fn new(prefix: &str) -> Self {
        let durable = Arc::new(InMemoryDurableStore::new());
        let shared = Arc::new(InMemorySharedCache::new());
        let storage = LayeredStorage::new(StorageConfig::new(prefix))
            .expect("fixture prefix must be valid")
            .with_durable_store(durable.clone())
            .with_shared_cache(shared.clone());
        Self {
            storage,
            durable,
            shared,
        }
    }

    /// A second facade over the same tiers, as another execution would see.
    pub fn fresh_execution(&self) -> LayeredStorage {
        LayeredStorage::new(self.storage.config().clone())
            .expect("fixture config is valid")
            .with_durable_store(self.durable.clone())
            .with_shared_cache(self.shared.clone())
    }

    /// Zero the call counters on both slow tiers.
    pub fn reset_stats(&self) {
        self.durable.reset_stats();
        self.shared.reset_stats();
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use proptest::prelude::*;
    use serde_json::{Map, Value};

    /// Generate a namespace prefix such as `oauth2.drive`.
    pub fn arb_prefix() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9]{0,7}(\\.[a-z][a-z0-9_]{0,7}){0,2}"
    }

    /// Generate a logical key, including the empty bare-prefix key.
    pub fn arb_key() -> impl Strategy<Value = String> {
        prop_oneof![
            1 => Just(String::new()),
            9 => "[a-z_][a-z0-9_.]{0,15}",
        ]
    }

    /// Generate a well-known OAuth2 storage key.
    pub fn arb_oauth_key() -> impl Strategy<Value = &'static str> {
        prop_oneof![
            Just("token"),
            Just("code_verifier"),
            Just("state"),
            Just("refresh_lock"),
            Just("id_token"),
        ]
    }

    fn arb_json_leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| Value::Number(n.into())),
            any::<u64>().prop_map(|n| Value::Number(n.into())),
            ".{0,24}".prop_map(Value::String),
            Just(Value::String("__NULL__".to_string())),
        ]
    }

    /// Generate an arbitrary JSON value, nested up to a few levels.
    pub fn arb_json_value() -> impl Strategy<Value = Value> {
        arb_json_leaf().prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-z_]{1,10}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
            ]
        })
    }

    /// Generate a JSON value that reads back as present (anything but `null`).
    pub fn arb_present_json_value() -> impl Strategy<Value = Value> {
        arb_json_value().prop_filter("non-null", |v| !v.is_null())
    }
}
