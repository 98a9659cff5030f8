//! Enumerate OAuth2 services that have state in a durable store.
//!
//! Useful when the same API is connected with several accounts, each under
//! its own `oauth2.<service>` namespace.

use oauth2_store_core::{service_name_of, StoreResult};

use crate::traits::DurableStore;

/// Distinct service names with keys in `store`, in first-seen order.
///
/// Returns an empty list when nothing is stored under `oauth2.`.
pub fn service_names<S: DurableStore + ?Sized>(store: &S) -> StoreResult<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    for key in store.list_keys()? {
        if let Some(name) = service_name_of(&key) {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}
