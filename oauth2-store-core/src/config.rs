//! Configuration types

use crate::{ConfigError, Namespace, StoreResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default lifetime of shared-cache entries, positive and negative alike.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(21_600); // 6 hours

/// Configuration for one layered storage instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Namespace prefix owning every key this instance touches.
    pub prefix: String,
    /// TTL applied to every shared-cache write.
    pub cache_ttl: Duration,
}

impl StorageConfig {
    /// Create a config for the given prefix with the default TTL.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Config for the storage of a named OAuth2 service (`oauth2.<name>`).
    pub fn for_service(service_name: &str) -> Self {
        Self::new(Namespace::for_service(service_name).prefix())
    }

    /// Set the shared-cache TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Namespace derived from the configured prefix.
    pub fn namespace(&self) -> Namespace {
        Namespace::new(self.prefix.clone())
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - prefix is non-empty
    /// - prefix does not end with the key separator
    /// - cache_ttl is at least one second
    pub fn validate(&self) -> StoreResult<()> {
        if self.prefix.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "prefix".to_string(),
            }
            .into());
        }

        if self.prefix.ends_with(crate::KEY_SEPARATOR) {
            return Err(ConfigError::InvalidValue {
                field: "prefix".to_string(),
                value: self.prefix.clone(),
                reason: "must not end with the key separator".to_string(),
            }
            .into());
        }

        if self.cache_ttl.as_secs() == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache_ttl".to_string(),
                value: format!("{:?}", self.cache_ttl),
                reason: "must be at least one second".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
