//! Canonical JSON hashing.
//!
//! `serde_json::Map` is backed by a `BTreeMap` (the `preserve_order`
//! feature is not enabled on this crate's `serde_json` dependency), so
//! any `Value` we build already serializes with sorted object keys.
//! That gives us canonical JSON for free: `to_vec` is deterministic byte
//! output, which is what we feed into SHA-256.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Hash any serializable value as canonical JSON, returning a lowercase
/// hex digest.
pub fn canonical_sha256<T: Serialize>(value: &T) -> String {
    let bytes = serde_json::to_vec(value).expect("canonical hashing input must serialize");
    let digest = Sha256::digest(&bytes);
    hex_encode(&digest)
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

/// Hash an ordered list of already-hashed strings (used for sequence and
/// chain-pattern hashing, which hash a list as a single canonical value).
pub fn canonical_sha256_of_list<T: Serialize>(items: &[T]) -> String {
    canonical_sha256(&items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn same_logical_object_hashes_identically_regardless_of_key_order() {
        let a = json!({"b": 1, "a": 2});
        let b = json!({"a": 2, "b": 1});
        assert_eq!(canonical_sha256(&a), canonical_sha256(&b));
    }

    #[test]
    fn different_values_hash_differently() {
        let a = json!({"a": 1});
        let b = json!({"a": 2});
        assert_ne!(canonical_sha256(&a), canonical_sha256(&b));
    }

    #[test]
    fn hash_is_stable_hex() {
        let h = canonical_sha256(&json!({"x": 1}));
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
