//! LMDB-backed durable store.
//!
//! Uses the heed crate (Rust bindings for LMDB) to persist raw values in a
//! memory-mapped file, so stored OAuth2 state survives process restarts.
//!
//! # Thread Safety
//!
//! LMDB provides ACID transactions. The store uses:
//! - Read transactions for `get` and `list_keys`
//! - One write transaction per `set` and `delete`

use std::path::Path;

use heed::types::Str;
use heed::{Database, Env, EnvOpenOptions};
use oauth2_store_core::{StoreError, StoreResult, TierError};

use crate::traits::DurableStore;

/// Error type for opening an LMDB store.
#[derive(Debug, thiserror::Error)]
pub enum LmdbStoreError {
    /// Failed to open or create the LMDB environment.
    #[error("Failed to open LMDB environment: {0}")]
    EnvOpen(String),

    /// Failed to open the database within the environment.
    #[error("Failed to open database: {0}")]
    DbOpen(String),

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LmdbStoreError> for StoreError {
    fn from(e: LmdbStoreError) -> Self {
        StoreError::Tier(TierError::durable("open", e.to_string()))
    }
}

/// Durable store persisted in an LMDB environment.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use oauth2_store::{LayeredStorage, LmdbDurableStore};
/// use oauth2_store_core::StorageConfig;
///
/// let durable = Arc::new(LmdbDurableStore::open("/var/lib/app/oauth2", 16)?);
/// let storage = LayeredStorage::new(StorageConfig::for_service("drive"))?
///     .with_durable_store(durable);
/// storage.set_value("token", &token)?;
/// ```
pub struct LmdbDurableStore {
    env: Env,
    db: Database<Str, Str>,
}

impl LmdbDurableStore {
    /// Open (or create) a store in `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Maximum size of the database in megabytes
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory cannot be created
    /// - LMDB environment cannot be opened
    /// - Database cannot be created
    pub fn open<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, LmdbStoreError> {
        std::fs::create_dir_all(&path)?;

        // SAFETY: the environment is opened once per directory by this process.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size_mb * 1024 * 1024)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbStoreError::EnvOpen(e.to_string()))?;

        let mut wtxn = env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let db: Database<Str, Str> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| LmdbStoreError::DbOpen(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        Ok(Self { env, db })
    }
}

fn durable_err(operation: &'static str) -> impl Fn(heed::Error) -> StoreError {
    move |e| TierError::durable(operation, e.to_string()).into()
}

impl DurableStore for LmdbDurableStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let rtxn = self.env.read_txn().map_err(durable_err("get"))?;
        let value = self
            .db
            .get(&rtxn, key)
            .map_err(durable_err("get"))?
            .map(str::to_string);
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut wtxn = self.env.write_txn().map_err(durable_err("set"))?;
        self.db
            .put(&mut wtxn, key, value)
            .map_err(durable_err("set"))?;
        wtxn.commit().map_err(durable_err("set"))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        let mut wtxn = self.env.write_txn().map_err(durable_err("delete"))?;
        let deleted = self
            .db
            .delete(&mut wtxn, key)
            .map_err(durable_err("delete"))?;
        wtxn.commit().map_err(durable_err("delete"))?;
        if !deleted {
            tracing::trace!(key, "durable delete of absent key");
        }
        Ok(())
    }

    fn list_keys(&self) -> StoreResult<Vec<String>> {
        let rtxn = self.env.read_txn().map_err(durable_err("list_keys"))?;
        let iter = self.db.iter(&rtxn).map_err(durable_err("list_keys"))?;

        let mut keys = Vec::new();
        for result in iter {
            let (key, _) = result.map_err(durable_err("list_keys"))?;
            keys.push(key.to_string());
        }
        Ok(keys)
    }
}
