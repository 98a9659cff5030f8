//! Error types for oauth2-store operations

use thiserror::Error;

/// Failures raised by an injected storage tier.
///
/// The facade never retries; whatever the tier reports is carried up to the
/// caller with the tier's own message preserved in `reason`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TierError {
    #[error("Durable store {operation} failed: {reason}")]
    Durable { operation: String, reason: String },

    #[error("Shared cache {operation} failed: {reason}")]
    Shared { operation: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

impl TierError {
    /// Durable-store failure for the named operation.
    pub fn durable(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Durable {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Shared-cache failure for the named operation.
    pub fn shared(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Shared {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

/// JSON encoding and decoding errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Failed to serialize value for {key}: {reason}")]
    Serialize { key: String, reason: String },

    #[error("Failed to deserialize value for {key}: {reason}")]
    Deserialize { key: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all oauth2-store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Tier error: {0}")]
    Tier(#[from] TierError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for oauth2-store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// TESTS
// =============================================================================
