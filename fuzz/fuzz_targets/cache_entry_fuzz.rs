//! Fuzz test for shared-cache entry decoding
//!
//! Shared-cache contents come from outside the process, so decoding must
//! return `Ok` or `Err` for any input and never panic.
//!
//! Run with: cargo +nightly fuzz run cache_entry_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use oauth2_store_core::{decode_durable, CacheEntry};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(entry) = CacheEntry::decode("fuzz", input) {
            // Anything that decodes must survive a trip back through the cache.
            let encoded = entry.encode("fuzz").expect("decoded entry must re-encode");
            let again = CacheEntry::decode("fuzz", &encoded).expect("re-encoded entry must decode");
            assert_eq!(entry.is_found(), again.is_found());
        }

        let _ = decode_durable("fuzz", input);
    }
});
