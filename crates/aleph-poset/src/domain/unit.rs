//! The unit data model (data model section of the protocol specification).

use crate::domain::floor::Floor;
use aleph_types::{Hash, ProcessId, PublicKey, Signature, Transaction};
use serde::{Deserialize, Serialize};

/// A share of a threshold-coin toss, opaque to the poset itself. The
/// consensus crate interprets the bytes; the poset only stores and
/// transmits them as part of a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinSharePayload(pub Vec<u8>);

/// An unsigned, unhashed unit: everything a creator commits to before
/// signing. Mirrors the `PreUnit` step of assembling a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreUnit {
    pub creator_id: ProcessId,
    pub height: u64,
    /// Parent hashes; first parent (if any) is the creator's own
    /// predecessor.
    pub parents: Vec<Hash>,
    pub txs: Vec<Transaction>,
    pub coin_shares: Vec<CoinSharePayload>,
}

impl PreUnit {
    pub fn new_genesis(creator_id: ProcessId) -> Self {
        PreUnit {
            creator_id,
            height: 0,
            parents: Vec::new(),
            txs: Vec::new(),
            coin_shares: Vec::new(),
        }
    }

    pub fn new_child(
        creator_id: ProcessId,
        predecessor_height: u64,
        parents: Vec<Hash>,
        txs: Vec<Transaction>,
        coin_shares: Vec<CoinSharePayload>,
    ) -> Self {
        PreUnit {
            creator_id,
            height: predecessor_height + 1,
            parents,
            txs,
            coin_shares,
        }
    }

    /// Canonical byte encoding hashed (SHA-256) to produce the unit's
    /// identity, and signed to produce its signature. Field order: creator
    /// id, height, parent hashes in order, transaction count and bytes,
    /// coin-share payloads.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.creator_id.0.to_be_bytes());
        buf.extend_from_slice(&self.height.to_be_bytes());
        buf.extend_from_slice(&(self.parents.len() as u32).to_be_bytes());
        for p in &self.parents {
            buf.extend_from_slice(p);
        }
        buf.extend_from_slice(&(self.txs.len() as u32).to_be_bytes());
        for tx in &self.txs {
            buf.extend_from_slice(&(tx.len() as u32).to_be_bytes());
            buf.extend_from_slice(tx.payload());
        }
        buf.extend_from_slice(&(self.coin_shares.len() as u32).to_be_bytes());
        for share in &self.coin_shares {
            buf.extend_from_slice(&(share.0.len() as u32).to_be_bytes());
            buf.extend_from_slice(&share.0);
        }
        buf
    }

    pub fn hash(&self) -> Hash {
        aleph_crypto::sha256_hash(&self.canonical_bytes())
    }
}

/// A fully-formed, signed, hashed unit as admitted into the poset. `level`
/// and `floor` are not part of the signed content (they are a pure
/// function of the poset at insertion time, not carried on the wire) but
/// are recorded on the stored `Unit` once known, so a unit fetched back
/// out of the poset is self-describing. A freshly signed, not-yet-inserted
/// unit carries the placeholder values `level: 0`, `floor: Floor::new(0)`,
/// `prime: false`; `Poset::insert` overwrites them before storing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub pre: PreUnit,
    pub hash: Hash,
    pub signature: Signature,
    pub level: u64,
    pub floor: Floor,
    pub prime: bool,
}

impl Unit {
    pub fn creator(&self) -> ProcessId {
        self.pre.creator_id
    }

    pub fn height(&self) -> u64 {
        self.pre.height
    }

    pub fn parents(&self) -> &[Hash] {
        &self.pre.parents
    }

    pub fn predecessor(&self) -> Option<Hash> {
        self.pre.parents.first().copied()
    }

    pub fn is_genesis(&self) -> bool {
        self.pre.parents.is_empty()
    }

    pub fn floor_slot(&self, creator: ProcessId) -> &[Hash] {
        self.floor.slot(creator)
    }

    /// Verifies hash and signature against a known public key. Does not
    /// consult the poset (no parent-existence or compliance checks here).
    pub fn verify_self_consistent(&self, public_key: &PublicKey) -> bool {
        if self.hash != self.pre.hash() {
            return false;
        }
        aleph_crypto::Ed25519PublicKey::from_bytes(*public_key)
            .map(|pk| {
                let sig = aleph_crypto::Ed25519Signature::from_bytes(self.signature);
                pk.verify(&self.hash, &sig).is_ok()
            })
            .unwrap_or(false)
    }
}

/// Signs a `PreUnit`, producing the `Unit` to be inserted and gossiped.
pub fn sign_unit(pre: PreUnit, keypair: &aleph_crypto::Ed25519KeyPair) -> Unit {
    let hash = pre.hash();
    let signature = keypair.sign(&hash).as_bytes().to_owned();
    Unit {
        pre,
        hash,
        signature,
        level: 0,
        floor: Floor::new(0),
        prime: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(n: u8) -> Transaction {
        Transaction::new(vec![n; 4])
    }

    #[test]
    fn hash_changes_with_any_field() {
        let a = PreUnit::new_genesis(ProcessId(0));
        let mut b = a.clone();
        b.txs.push(tx(1));
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn sign_and_verify_round_trip() {
        let kp = aleph_crypto::Ed25519KeyPair::generate();
        let pre = PreUnit::new_genesis(ProcessId(0));
        let unit = sign_unit(pre, &kp);
        let pk = kp.public_key().as_bytes().to_owned();
        assert!(unit.verify_self_consistent(&pk));
    }

    #[test]
    fn tampered_unit_fails_verification() {
        let kp = aleph_crypto::Ed25519KeyPair::generate();
        let pre = PreUnit::new_genesis(ProcessId(0));
        let mut unit = sign_unit(pre, &kp);
        unit.pre.txs.push(tx(9));
        let pk = kp.public_key().as_bytes().to_owned();
        assert!(!unit.verify_self_consistent(&pk));
    }
}
