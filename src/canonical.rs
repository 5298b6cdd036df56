//! Canonical serialization for deterministic hashing.
//!
//! ## Determinism Guarantees
//!
//! - Stable field order: Struct fields serialize in declaration order
//! - Stable Vec order: Vectors serialize in index order
//! - No HashMap allowed: Use BTreeMap for maps in hashed data

use serde::Serialize;
use sha2::{Digest, Sha256};
use xxhash_rust::xxh64::xxh64;

/// Serialize a value to canonical JSON bytes for hashing.
///
/// # Panics
///
/// Panics if the value cannot be represented as JSON (a map with
/// non-string keys). Every type hashed by this crate serializes cleanly.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("Canonical serialization failed")
}

/// Compute canonical hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    let bytes = to_canonical_bytes(value);
    xxh64(&bytes, 0)
}

/// Compute canonical hash and return as hex string.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}

/// SHA-256 digest of rendered bytes, hex encoded.
pub fn content_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct TestStruct {
        name: String,
        value: i32,
    }

    #[test]
    fn test_determinism() {
        let s = TestStruct {
            name: "test".to_string(),
            value: 42,
        };

        let h1 = canonical_hash(&s);
        let h2 = canonical_hash(&s);
        assert_eq!(h1, h2);
        assert_eq!(canonical_hash_hex(&s).len(), 16);
    }

    #[test]
    fn test_btreemap_insertion_order_irrelevant() {
        let mut a = BTreeMap::new();
        a.insert("x", 1);
        a.insert("y", 2);
        let mut b = BTreeMap::new();
        b.insert("y", 2);
        b.insert("x", 1);

        assert_eq!(canonical_hash_hex(&a), canonical_hash_hex(&b));
    }

    #[test]
    fn test_content_digest() {
        assert_eq!(
            content_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_ne!(content_digest(b"a"), content_digest(b"b"));
    }
}
