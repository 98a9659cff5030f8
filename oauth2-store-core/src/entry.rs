//! Cache entries and the JSON codec shared by every tier.
//!
//! The durable tier stores the plain JSON text of a value. The process-local
//! tier and the shared cache store a [`CacheEntry`], which can also record
//! that a key is confirmed absent. On the wire an entry is encoded as
//! `{"found":<value>}` or `"not_found"`, so no legitimate value can be
//! mistaken for the negative marker.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{CodecError, StoreResult};

/// A cached lookup result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheEntry {
    /// The key holds this value.
    Found(Value),
    /// The key was looked up in every tier and does not exist.
    NotFound,
}

impl CacheEntry {
    /// Returns true for `Found`, including a stored JSON `null`.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Returns true for the negative marker.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Borrow the cached value.
    ///
    /// A stored JSON `null` and the negative marker both read as `None`:
    /// callers cannot tell "stored null" from "never stored".
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Found(Value::Null) | Self::NotFound => None,
            Self::Found(value) => Some(value),
        }
    }

    /// Consume the entry, collapsing `null` and `NotFound` to `None`.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Found(Value::Null) | Self::NotFound => None,
            Self::Found(value) => Some(value),
        }
    }

    /// Consume the entry and decode the value into `T`.
    pub fn into_typed<T: DeserializeOwned>(self, key: &str) -> StoreResult<Option<T>> {
        self.into_value()
            .map(|value| from_json_value(key, value))
            .transpose()
    }

    /// Encode the entry for the shared cache.
    pub fn encode(&self, key: &str) -> StoreResult<String> {
        serde_json::to_string(self).map_err(|e| {
            CodecError::Serialize {
                key: key.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Decode an entry read back from the shared cache.
    pub fn decode(key: &str, raw: &str) -> StoreResult<Self> {
        serde_json::from_str(raw).map_err(|e| {
            CodecError::Deserialize {
                key: key.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

impl From<Value> for CacheEntry {
    fn from(value: Value) -> Self {
        Self::Found(value)
    }
}

/// Serialize a caller value into JSON.
pub fn to_json_value<T: Serialize + ?Sized>(key: &str, value: &T) -> StoreResult<Value> {
    serde_json::to_value(value).map_err(|e| {
        CodecError::Serialize {
            key: key.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Decode a JSON value into the caller's type.
pub fn from_json_value<T: DeserializeOwned>(key: &str, value: Value) -> StoreResult<T> {
    serde_json::from_value(value).map_err(|e| {
        CodecError::Deserialize {
            key: key.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Render a value as the JSON text kept in the durable tier.
pub fn encode_durable(key: &str, value: &Value) -> StoreResult<String> {
    serde_json::to_string(value).map_err(|e| {
        CodecError::Serialize {
            key: key.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Parse JSON text read back from the durable tier.
pub fn decode_durable(key: &str, raw: &str) -> StoreResult<Value> {
    serde_json::from_str(raw).map_err(|e| {
        CodecError::Deserialize {
            key: key.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;
    use serde_json::json;

    #[test]
    fn test_wire_format() {
        let found = CacheEntry::Found(json!({"access_token": "abc"}));
        assert_eq!(found.encode("k").unwrap(), r#"{"found":{"access_token":"abc"}}"#);
        assert_eq!(CacheEntry::NotFound.encode("k").unwrap(), r#""not_found""#);
    }

    #[test]
    fn test_legacy_sentinel_string_is_a_value() {
        let entry = CacheEntry::Found(json!("__NULL__"));
        let decoded = CacheEntry::decode("k", &entry.encode("k").unwrap()).unwrap();
        assert_eq!(decoded.into_value(), Some(json!("__NULL__")));
    }

    #[test]
    fn test_null_collapses_to_absent() {
        assert_eq!(CacheEntry::Found(Value::Null).into_value(), None);
        assert_eq!(CacheEntry::NotFound.into_value(), None);
        assert!(CacheEntry::Found(Value::Null).is_found());
    }

    #[test]
    fn test_falsy_values_are_present() {
        for value in [json!(0), json!(false), json!(""), json!([]), json!({})] {
            let entry = CacheEntry::Found(value.clone());
            assert_eq!(entry.value(), Some(&value));
        }
    }

    #[test]
    fn test_decode_rejects_corrupt_json() {
        let err = CacheEntry::decode("oauth2.svc.token", "{not json").unwrap_err();
        match err {
            StoreError::Codec(CodecError::Deserialize { key, .. }) => {
                assert_eq!(key, "oauth2.svc.token");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_bare_value() {
        // Shared-cache entries are always tagged.
        assert!(CacheEntry::decode("k", r#""__NULL__""#).is_err());
    }

    #[test]
    fn test_into_typed_mismatch_is_error() {
        let entry = CacheEntry::Found(json!("not a number"));
        let result: StoreResult<Option<u64>> = entry.into_typed("k");
        assert!(matches!(result, Err(StoreError::Codec(CodecError::Deserialize { .. }))));
    }

    #[test]
    fn test_durable_codec() {
        let value = json!({"expires_in": 3600, "scope": "read"});
        let raw = encode_durable("k", &value).unwrap();
        assert_eq!(decode_durable("k", &raw).unwrap(), value);
        assert!(decode_durable("k", "").is_err());
    }

    #[test]
    fn test_to_json_value_rejects_non_string_map_keys() {
        let mut map = std::collections::HashMap::new();
        map.insert((1u8, 2u8), "x");
        assert!(matches!(
            to_json_value("k", &map),
            Err(StoreError::Codec(CodecError::Serialize { .. }))
        ));
    }
}
