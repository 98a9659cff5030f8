//! Namespaced key derivation.
//!
//! Every key an instance stores is rooted under its namespace prefix, so
//! several owners can share one durable store and one shared cache without
//! colliding. The bare prefix is itself a legal storage slot.

use serde::{Deserialize, Serialize};

/// Separator between the prefix and a logical key.
pub const KEY_SEPARATOR: char = '.';

/// Root segment of every OAuth2 service namespace.
pub const SERVICE_PREFIX: &str = "oauth2";

/// A namespace prefix owning a family of stored keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace {
    prefix: String,
}

impl Namespace {
    /// Create a namespace from a raw prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Namespace for a named OAuth2 service: `oauth2.<service_name>`.
    pub fn for_service(service_name: &str) -> Self {
        Self::new(format!("{SERVICE_PREFIX}{KEY_SEPARATOR}{service_name}"))
    }

    /// The raw prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Apply the prefix to a logical key.
    ///
    /// An empty key maps to the bare prefix.
    pub fn key(&self, key: &str) -> String {
        if key.is_empty() {
            self.prefix.clone()
        } else {
            format!("{}{}{}", self.prefix, KEY_SEPARATOR, key)
        }
    }

    /// Whether a fully prefixed key belongs to this namespace.
    ///
    /// True for the bare prefix and for anything under `prefix.`; a sibling
    /// such as `prefix2.x` is not owned.
    pub fn owns(&self, prefixed_key: &str) -> bool {
        match prefixed_key.strip_prefix(self.prefix.as_str()) {
            Some("") => true,
            Some(rest) => rest.starts_with(KEY_SEPARATOR),
            None => false,
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.prefix)
    }
}

/// Extract the service name from a stored key such as `oauth2.drive.token`.
///
/// Returns `None` for keys outside the `oauth2.` root or with an empty
/// second segment.
pub fn service_name_of(prefixed_key: &str) -> Option<&str> {
    let rest = prefixed_key
        .strip_prefix(SERVICE_PREFIX)?
        .strip_prefix(KEY_SEPARATOR)?;
    let name = rest.split(KEY_SEPARATOR).next()?;
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
