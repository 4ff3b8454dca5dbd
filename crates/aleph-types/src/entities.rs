//! Core value types shared by the poset, consensus, sync, and node crates.
//!
//! ## Clusters
//!
//! - **Identity**: [`Hash`], [`Signature`], [`PublicKey`], [`ProcessId`], [`ProcessCount`]
//! - **Transactions**: [`Transaction`]
//! - **Committee**: [`CommitteeInfo`]

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use std::fmt;

/// A 32-byte content hash (SHA-256 over a unit's canonical fields, see the
/// wire form in the external interfaces section of the protocol spec).
pub type Hash = [u8; 32];

/// A 64-byte Ed25519 signature.
pub type Signature = [u8; 64];

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// Identity of a committee member, stable for the lifetime of a run.
///
/// Process ids are dense integers in `[0, N)` where `N` is the committee
/// size; they index directly into floor vectors and prime-unit tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProcessId(pub u16);

impl ProcessId {
    /// Returns the raw index usable to index a `Vec` of length `N`.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

impl From<u16> for ProcessId {
    fn from(value: u16) -> Self {
        ProcessId(value)
    }
}

/// Size of the committee, `N`. Fixed for the lifetime of a run (no dynamic
/// membership).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessCount(pub u16);

impl ProcessCount {
    /// Maximum tolerated Byzantine faults under `N >= 3f + 1`.
    pub fn max_faults(self) -> u16 {
        (self.0 - 1) / 3
    }

    /// The `2f + 1` supermajority threshold used throughout the protocol.
    pub fn supermajority(self) -> u16 {
        2 * self.max_faults() + 1
    }

    /// Number of committee members, as `usize`.
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// An opaque client transaction. The core only ever counts and orders these;
/// it never interprets the payload. Equality and hashing are by content.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transaction {
    #[serde_as(as = "Bytes")]
    payload: Vec<u8>,
}

impl Transaction {
    /// Wraps an opaque byte payload as a transaction.
    pub fn new(payload: Vec<u8>) -> Self {
        Transaction { payload }
    }

    /// Borrows the raw payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Length in bytes of the payload, used for `txs_per_unit` accounting.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Returns true when the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Static description of the committee a process is running within.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitteeInfo {
    /// This process's own id.
    pub own_id: ProcessId,
    /// Total committee size, `N`.
    pub size: ProcessCount,
    /// Threshold-coin parameter; `N/3 < threshold <= N`.
    pub threshold: u16,
    /// Public keys of every committee member, indexed by `ProcessId`.
    pub public_keys: Vec<PublicKey>,
}

impl CommitteeInfo {
    /// Looks up a member's public key.
    pub fn public_key(&self, id: ProcessId) -> Option<&PublicKey> {
        self.public_keys.get(id.index())
    }

    /// Iterates over all process ids `[0, N)`.
    pub fn all_ids(&self) -> impl Iterator<Item = ProcessId> {
        (0..self.size.0).map(ProcessId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supermajority_matches_two_f_plus_one() {
        // N = 4, f = 1 -> threshold 3.
        let n = ProcessCount(4);
        assert_eq!(n.max_faults(), 1);
        assert_eq!(n.supermajority(), 3);
    }

    #[test]
    fn transaction_equality_is_by_content() {
        let a = Transaction::new(vec![1, 2, 3]);
        let b = Transaction::new(vec![1, 2, 3]);
        let c = Transaction::new(vec![1, 2, 4]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
