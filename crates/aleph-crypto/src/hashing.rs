//! SHA-256 unit hashing.
//!
//! The wire form mandates SHA-256 over a unit's canonical field
//! concatenation; this module provides a streaming hasher plus the
//! convenience helpers the poset crate uses to compute a unit's identity.

use sha2::{Digest, Sha256};

/// A 256-bit hash output.
pub type Hash = [u8; 32];

/// Stateful SHA-256 hasher, fed a unit's canonical fields in order.
pub struct UnitHasher {
    inner: Sha256,
}

impl UnitHasher {
    pub fn new() -> Self {
        UnitHasher {
            inner: Sha256::new(),
        }
    }

    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    pub fn finalize(self) -> Hash {
        self.inner.finalize().into()
    }
}

impl Default for UnitHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot hash of a single buffer.
pub fn sha256_hash(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// One-shot hash over several buffers concatenated in order, without
/// allocating the concatenation.
pub fn sha256_hash_many(inputs: &[&[u8]]) -> Hash {
    let mut hasher = UnitHasher::new();
    for input in inputs {
        hasher.update(input);
    }
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let h1 = sha256_hash(b"test");
        let h2 = sha256_hash(b"test");
        assert_eq!(h1, h2);
    }

    #[test]
    fn different_inputs_differ() {
        let h1 = sha256_hash(b"input1");
        let h2 = sha256_hash(b"input2");
        assert_ne!(h1, h2);
    }

    #[test]
    fn streaming_matches_one_shot() {
        let one_shot = sha256_hash(b"hello world");
        let mut hasher = UnitHasher::new();
        hasher.update(b"hello ").update(b"world");
        assert_eq!(one_shot, hasher.finalize());
    }

    #[test]
    fn many_matches_manual_concatenation() {
        let many = sha256_hash_many(&[b"foo", b"bar"]);
        let manual = sha256_hash(b"foobar");
        assert_eq!(many, manual);
    }
}
